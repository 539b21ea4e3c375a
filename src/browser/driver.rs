use serde_json::Value;

use crate::error::ProbeError;

/// Per-call options for driver actions that target an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActOptions {
    /// Bypass actionability checks (occlusion, stability, enabled state)
    pub force: bool,
    pub timeout_ms: u64,
}

impl ActOptions {
    pub fn bounded(timeout_ms: u64) -> Self {
        Self {
            force: false,
            timeout_ms,
        }
    }

    pub fn forced(timeout_ms: u64) -> Self {
        Self {
            force: true,
            timeout_ms,
        }
    }
}

/// The browser primitives the engine needs.
///
/// One implementation talks to the Playwright bridge (`BrowserSession`);
/// tests supply scripted doubles. Every call may block for network, paint or
/// script latency, and each is bounded by its own timeout.
pub trait PageDriver {
    /// Open a fresh, isolated browsing context with a single page.
    fn new_context(&mut self) -> Result<(), ProbeError>;

    /// Close the current browsing context (cookies, storage and page go with it).
    fn close_context(&mut self) -> Result<(), ProbeError>;

    fn goto(&mut self, url: &str, timeout_ms: u64) -> Result<(), ProbeError>;

    fn wait_for_network_idle(&mut self, timeout_ms: u64) -> Result<(), ProbeError>;

    /// Poll a JS expression until it is truthy.
    fn wait_for_function(&mut self, expression: &str, timeout_ms: u64) -> Result<(), ProbeError>;

    /// Evaluate a script in the page. Function-shaped scripts receive `arg`.
    fn evaluate(&mut self, script: &str, arg: Value) -> Result<Value, ProbeError>;

    fn add_style(&mut self, css: &str) -> Result<(), ProbeError>;

    /// Wall-clock pause on the page side.
    fn pause(&mut self, ms: u64) -> Result<(), ProbeError>;

    /// Number of live nodes a locator currently matches.
    fn count(&mut self, locator: &str) -> Result<usize, ProbeError>;

    fn scroll_into_view(&mut self, locator: &str, timeout_ms: u64) -> Result<(), ProbeError>;

    fn wait_visible(&mut self, locator: &str, timeout_ms: u64) -> Result<(), ProbeError>;

    fn fill(&mut self, locator: &str, value: &str, opts: ActOptions) -> Result<(), ProbeError>;

    fn click(&mut self, locator: &str, opts: ActOptions) -> Result<(), ProbeError>;

    /// Raw keyboard input into whatever currently has focus.
    fn type_keys(&mut self, text: &str) -> Result<(), ProbeError>;

    fn select_option(&mut self, locator: &str, value: &str, timeout_ms: u64) -> Result<(), ProbeError>;

    fn set_checked(&mut self, locator: &str, checked: bool, timeout_ms: u64) -> Result<(), ProbeError>;

    fn hover(&mut self, locator: &str, timeout_ms: u64) -> Result<(), ProbeError>;

    fn press(&mut self, locator: &str, key: &str, timeout_ms: u64) -> Result<(), ProbeError>;

    fn clear(&mut self, locator: &str, timeout_ms: u64) -> Result<(), ProbeError>;

    /// Capture the current viewport as PNG bytes.
    fn screenshot(&mut self) -> Result<Vec<u8>, ProbeError>;

    fn current_url(&mut self) -> Result<String, ProbeError>;

    /// Tear down the browser process. Must tolerate repeated calls.
    fn shutdown(&mut self) -> Result<(), ProbeError>;
}
