use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProbeError;
use crate::scanner::model::ElementDescriptor;

/// One scripted instruction.
///
/// `action` stays a plain string so that a malformed step survives loading
/// and only fails the test it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub action: String,

    /// Descriptor id, role token, or raw locator
    #[serde(default)]
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<StepValue>,
}

impl Step {
    pub fn new(action: &str, target: &str) -> Self {
        Self {
            action: action.to_string(),
            target: target.to_string(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<StepValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn parsed_action(&self) -> Result<StepAction, ProbeError> {
        self.action.parse()
    }

    pub fn text_value(&self) -> String {
        self.value.as_ref().map(StepValue::as_text).unwrap_or_default()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.target.is_empty() {
            write!(f, "{}", self.action)
        } else {
            write!(f, "{} '{}'", self.action, self.target)
        }
    }
}

/// Step payload: text to type, option to select, key to press, or a delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Number(serde_json::Number),
    Text(String),
}

impl StepValue {
    pub fn as_text(&self) -> String {
        match self {
            StepValue::Number(n) => n.to_string(),
            StepValue::Text(s) => s.clone(),
        }
    }

    /// Milliseconds, for `wait` steps. Text is parsed leniently.
    pub fn as_millis(&self) -> Option<u64> {
        match self {
            StepValue::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)),
            StepValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64),
        }
    }
}

impl From<&str> for StepValue {
    fn from(value: &str) -> Self {
        StepValue::Text(value.to_string())
    }
}

impl From<String> for StepValue {
    fn from(value: String) -> Self {
        StepValue::Text(value)
    }
}

impl From<u64> for StepValue {
    fn from(value: u64) -> Self {
        StepValue::Number(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Type,
    Click,
    Select,
    Check,
    Uncheck,
    Wait,
    Hover,
    Press,
    Clear,
}

impl StepAction {
    /// Whether the action acts on an element (and so needs locating).
    pub fn needs_target(&self) -> bool {
        !matches!(self, StepAction::Wait)
    }
}

impl FromStr for StepAction {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "type" | "fill" => Ok(StepAction::Type),
            "click" => Ok(StepAction::Click),
            "select" => Ok(StepAction::Select),
            "check" => Ok(StepAction::Check),
            "uncheck" => Ok(StepAction::Uncheck),
            "wait" => Ok(StepAction::Wait),
            "hover" => Ok(StepAction::Hover),
            "press" => Ok(StepAction::Press),
            "clear" => Ok(StepAction::Clear),
            _ => Err(ProbeError::UnknownAction(s.to_string())),
        }
    }
}

/// A named step sequence, executed as one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub steps: Vec<Step>,
}

/// A persisted test run: the page, what discovery found on it, and the
/// tests the plan generator wrote against those descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRunRecord {
    pub url: String,

    #[serde(default, alias = "pageData", alias = "page_data")]
    pub elements: Vec<ElementDescriptor>,

    pub tests: Vec<TestCase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
}

/// Outcome of one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub name: String,
    pub status: TestStatus,

    /// Opaque artifact references, in capture order
    pub screenshots: Vec<String>,

    /// Present iff `status` is `Fail`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The steps exactly as received
    pub steps: Vec<Step>,

    pub steps_run: usize,

    #[serde(default)]
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Pass
    }
}
