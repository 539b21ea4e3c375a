use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Descriptor — what discovery hands to the plan generator
// ============================================================================

/// One discovered interactive element.
///
/// Created fresh on every scan and never mutated afterwards. `id` is only
/// unique within the scan that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    pub id: String,
    pub locator: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    pub role: ElementRole,
    #[serde(default)]
    pub visible_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub origin_zone: OriginZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    Button,
    Link,
    TextInput,
    PasswordInput,
    EmailInput,
    Checkbox,
    Radio,
    Dropdown,
    Textarea,
    Toggle,
    MenuItem,
    Tab,
    Expandable,
    /// Clickable but not otherwise classifiable
    #[serde(rename = "interactive-generic")]
    InteractiveGeneric,
}

impl ElementRole {
    /// Token used in step targets and in the role index.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementRole::Button => "button",
            ElementRole::Link => "link",
            ElementRole::TextInput => "text_input",
            ElementRole::PasswordInput => "password_input",
            ElementRole::EmailInput => "email_input",
            ElementRole::Checkbox => "checkbox",
            ElementRole::Radio => "radio",
            ElementRole::Dropdown => "dropdown",
            ElementRole::Textarea => "textarea",
            ElementRole::Toggle => "toggle",
            ElementRole::MenuItem => "menu_item",
            ElementRole::Tab => "tab",
            ElementRole::Expandable => "expandable",
            ElementRole::InteractiveGeneric => "interactive-generic",
        }
    }
}

/// Integer viewport rectangle at scan time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginZone {
    #[default]
    MainDocument,
    ShadowRoot,
    SameOriginIframe,
}

// ============================================================================
// Raw collector output — what the in-page script returns
// ============================================================================

/// Whole-page result of one collector pass.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewport: Viewport,
    /// `document.body.innerText` of the top document
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct RawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Computed style values that matter for visibility.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawStyle {
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default = "default_opacity")]
    pub opacity: String,
    #[serde(default)]
    pub cursor: String,
    /// Computed cursor of the parent element, empty at the root
    #[serde(default, rename = "parentCursor")]
    pub parent_cursor: String,
}

impl Default for RawStyle {
    fn default() -> Self {
        Self {
            display: "block".into(),
            visibility: "visible".into(),
            opacity: default_opacity(),
            cursor: "auto".into(),
            parent_cursor: String::new(),
        }
    }
}

fn default_opacity() -> String { "1".into() }

/// One `tag:nth-of-type(n)` hop of a structural path, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathSegment {
    pub tag: String,
    /// Present only when same-tag siblings make the position ambiguous
    #[serde(default)]
    pub nth: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Shadow,
    Frame,
}

/// A boundary the node sits behind: the shadow host or the iframe element.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScopeHop {
    pub kind: ScopeKind,
    pub host: RawNode,
}

/// A candidate node as seen by the collector, before any filtering.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub tag: String,
    /// Whitelisted attributes, lowercase names
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rect: RawRect,
    #[serde(default)]
    pub style: RawStyle,
    #[serde(default)]
    pub path: Vec<PathSegment>,
    /// Shadow/frame hops from the top document down to this node
    #[serde(default)]
    pub scope: Vec<ScopeHop>,
    /// Found by the cursor:pointer sweep rather than the native selector list
    #[serde(default)]
    pub pointer_only: bool,
}

impl RawNode {
    pub fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            rect: RawRect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 30.0,
            },
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rect = RawRect {
            x,
            y,
            width,
            height,
        };
        self
    }

    pub fn with_style(mut self, style: RawStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_path(mut self, segments: &[(&str, Option<u32>)]) -> Self {
        self.path = segments
            .iter()
            .map(|(tag, nth)| PathSegment {
                tag: tag.to_string(),
                nth: *nth,
            })
            .collect();
        self
    }

    /// Mark as found by the pointer sweep, with the given own/parent cursors.
    pub fn swept(mut self, cursor: &str, parent_cursor: &str) -> Self {
        self.pointer_only = true;
        self.style.cursor = cursor.to_string();
        self.style.parent_cursor = parent_cursor.to_string();
        self
    }

    pub fn inside(mut self, kind: ScopeKind, host: RawNode) -> Self {
        self.scope.push(ScopeHop { kind, host });
        self
    }

    /// Non-empty, trimmed attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn input_type(&self) -> Option<String> {
        if self.tag != "input" {
            return None;
        }
        Some(
            self.attr("type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string()),
        )
    }

    pub fn aria_role(&self) -> Option<String> {
        self.attr("role").map(|r| r.to_ascii_lowercase())
    }

    /// Whitespace-collapsed visible text.
    pub fn clean_text(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn origin_zone(&self) -> OriginZone {
        match self.scope.last().map(|hop| hop.kind) {
            None => OriginZone::MainDocument,
            Some(ScopeKind::Shadow) => OriginZone::ShadowRoot,
            Some(ScopeKind::Frame) => OriginZone::SameOriginIframe,
        }
    }
}

/// Scanner output: descriptors plus the raw text the plan generator reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutput {
    pub url: String,
    pub title: String,
    pub elements: Vec<ElementDescriptor>,
    pub visible_text: String,
}
