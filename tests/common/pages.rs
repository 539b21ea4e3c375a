use serde_json::Value;

use element_discovery::exec::index::ElementIndex;
use element_discovery::scanner::model::{ElementDescriptor, RawNode, RawSnapshot, Viewport};
use element_discovery::scanner::scanner::{ScanConfig, process_snapshot};

use super::fake_driver::FakeDriver;

pub const LOGIN_URL: &str = "https://app.example.com/login";

pub const EMAIL_LOCATOR: &str = r#"input[type="email"]"#;
pub const PASSWORD_LOCATOR: &str = r#"input[type="password"]"#;
pub const SUBMIT_LOCATOR: &str = r#"button:text-is("Sign in")"#;

pub fn snapshot(url: &str, text: &str, nodes: Vec<RawNode>) -> RawSnapshot {
    RawSnapshot {
        url: url.to_string(),
        title: "Sign in".to_string(),
        viewport: Viewport::default(),
        text: text.to_string(),
        nodes,
    }
}

/// Email field, password field, submit button.
pub fn login_nodes() -> Vec<RawNode> {
    vec![
        RawNode::element("input")
            .with_attr("type", "email")
            .with_attr("placeholder", "Email")
            .with_rect(40.0, 120.0, 320.0, 36.0)
            .with_path(&[("html", None), ("body", None), ("form", None), ("input", Some(1))]),
        RawNode::element("input")
            .with_attr("type", "password")
            .with_rect(40.0, 170.0, 320.0, 36.0)
            .with_path(&[("html", None), ("body", None), ("form", None), ("input", Some(2))]),
        RawNode::element("button")
            .with_attr("type", "submit")
            .with_text("Sign in")
            .with_rect(40.0, 220.0, 120.0, 40.0)
            .with_path(&[("html", None), ("body", None), ("form", None), ("button", None)]),
    ]
}

pub fn login_snapshot() -> RawSnapshot {
    snapshot(LOGIN_URL, "Welcome back\nSign in", login_nodes())
}

pub fn to_value(snapshot: &RawSnapshot) -> Value {
    serde_json::to_value(snapshot).expect("snapshot serializes")
}

/// A fake browser showing the login page: the collector returns its nodes
/// and each synthesized locator matches one live node.
pub fn login_page_driver() -> FakeDriver {
    FakeDriver::new()
        .with_snapshot(to_value(&login_snapshot()))
        .with_live(EMAIL_LOCATOR)
        .with_live(PASSWORD_LOCATOR)
        .with_live(SUBMIT_LOCATOR)
}

/// What discovery reports for the login page: e0 email, e1 password, e2 submit.
pub fn login_descriptors() -> Vec<ElementDescriptor> {
    process_snapshot(login_snapshot(), &ScanConfig::default()).elements
}

pub fn login_index() -> ElementIndex {
    ElementIndex::from_descriptors(&login_descriptors())
}
