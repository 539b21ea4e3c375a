use std::collections::HashMap;

use crate::scanner::model::ElementDescriptor;

/// Lookup from step targets to locators, built once per execution.
///
/// Role keys are best-effort: when several descriptors share a role, the
/// last one in the list owns the key.
#[derive(Debug, Clone, Default)]
pub struct ElementIndex {
    by_id: HashMap<String, String>,
    by_role: HashMap<String, String>,
}

impl ElementIndex {
    pub fn from_descriptors(descriptors: &[ElementDescriptor]) -> Self {
        let mut index = Self::default();
        for d in descriptors {
            index.by_id.insert(d.id.clone(), d.locator.clone());
            index
                .by_role
                .insert(d.role.as_str().to_string(), d.locator.clone());
        }
        index
    }

    /// Id first, then role token, otherwise the target is taken to be a
    /// locator already and returned unchanged.
    pub fn resolve(&self, target: &str) -> String {
        self.by_id
            .get(target)
            .or_else(|| self.by_role.get(target))
            .cloned()
            .unwrap_or_else(|| target.to_string())
    }

    pub fn locator_for_id(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn locator_for_role(&self, role: &str) -> Option<&str> {
        self.by_role.get(role).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
