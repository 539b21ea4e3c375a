use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use element_discovery::browser::driver::{ActOptions, PageDriver};
use element_discovery::error::ProbeError;
use element_discovery::scanner::scanner::COLLECT_SCRIPT;

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Everything the fake saw and everything it was told to do.
#[derive(Debug, Default)]
pub struct FakeState {
    /// One line per driver call, e.g. `click button.submit` or `force_fill #q`
    pub calls: Vec<String>,

    /// Locator -> live node count; anything absent counts 0
    pub live: HashMap<String, usize>,

    /// (op, locator) pairs that fail with a timeout; locator "*" matches any
    pub failing: Vec<(String, String)>,

    /// Collector output returned for the scan script
    pub snapshot: Option<Value>,

    pub goto_error: Option<String>,
    pub context_error: Option<String>,
    pub screenshot_fails: bool,

    pub contexts_opened: usize,
    pub contexts_closed: usize,
    pub shutdowns: usize,
}

impl FakeState {
    /// Calls whose op (first word) is `op`.
    pub fn calls_to(&self, op: &str) -> Vec<String> {
        self.calls
            .iter()
            .filter(|c| c.split_whitespace().next() == Some(op))
            .cloned()
            .collect()
    }

    /// Element actions only: no counts, waits, screenshots or lifecycle.
    pub fn actions(&self) -> Vec<String> {
        const PASSIVE: &[&str] = &[
            "count",
            "scroll_into_view",
            "wait_visible",
            "screenshot",
            "new_context",
            "close_context",
            "goto",
            "wait_network_idle",
            "wait_function",
            "evaluate",
            "add_style",
            "pause",
            "shutdown",
        ];
        self.calls
            .iter()
            .filter(|c| {
                let op = c.split_whitespace().next().unwrap_or_default();
                !PASSIVE.contains(&op)
            })
            .cloned()
            .collect()
    }
}

/// Scripted `PageDriver` double. Clones share state, so a test can keep a
/// handle after moving the driver into a coordinator.
#[derive(Clone, Default)]
pub struct FakeDriver {
    state: Rc<RefCell<FakeState>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::cell::Ref<'_, FakeState> {
        self.state.borrow()
    }

    pub fn with_live(self, locator: &str) -> Self {
        self.with_live_count(locator, 1)
    }

    pub fn with_live_count(self, locator: &str, count: usize) -> Self {
        self.state.borrow_mut().live.insert(locator.to_string(), count);
        self
    }

    pub fn failing(self, op: &str, locator: &str) -> Self {
        self.state
            .borrow_mut()
            .failing
            .push((op.to_string(), locator.to_string()));
        self
    }

    pub fn with_snapshot(self, snapshot: Value) -> Self {
        self.state.borrow_mut().snapshot = Some(snapshot);
        self
    }

    pub fn failing_goto(self, reason: &str) -> Self {
        self.state.borrow_mut().goto_error = Some(reason.to_string());
        self
    }

    pub fn failing_contexts(self, reason: &str) -> Self {
        self.state.borrow_mut().context_error = Some(reason.to_string());
        self
    }

    pub fn failing_screenshots(self) -> Self {
        self.state.borrow_mut().screenshot_fails = true;
        self
    }

    fn record(&self, op: &str, detail: &str) -> Result<(), ProbeError> {
        let mut state = self.state.borrow_mut();
        let line = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{} {}", op, detail)
        };
        state.calls.push(line);

        let fails = state
            .failing
            .iter()
            .any(|(o, l)| o == op && (l == "*" || l == detail));
        if fails {
            return Err(ProbeError::ActionTimeout {
                command: op.to_string(),
                locator: detail.to_string(),
                detail: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn act(&self, op: &str, locator: &str, opts: ActOptions) -> Result<(), ProbeError> {
        if opts.force {
            self.record(&format!("force_{}", op), locator)
        } else {
            self.record(op, locator)
        }
    }
}

impl PageDriver for FakeDriver {
    fn new_context(&mut self) -> Result<(), ProbeError> {
        self.record("new_context", "")?;
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.context_error.clone() {
            return Err(ProbeError::SessionProtocol {
                command: "new_context".into(),
                error: reason,
            });
        }
        state.contexts_opened += 1;
        Ok(())
    }

    fn close_context(&mut self) -> Result<(), ProbeError> {
        self.record("close_context", "")?;
        self.state.borrow_mut().contexts_closed += 1;
        Ok(())
    }

    fn goto(&mut self, url: &str, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("goto", url)?;
        match self.state.borrow().goto_error.clone() {
            Some(reason) => Err(ProbeError::NavigationFailure {
                url: url.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn wait_for_network_idle(&mut self, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("wait_network_idle", "")
    }

    fn wait_for_function(&mut self, _expression: &str, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("wait_function", "")
    }

    fn evaluate(&mut self, script: &str, _arg: Value) -> Result<Value, ProbeError> {
        if script == COLLECT_SCRIPT {
            self.record("evaluate", "collect")?;
            return Ok(self.state.borrow().snapshot.clone().unwrap_or(Value::Null));
        }
        self.record("evaluate", "")?;
        Ok(Value::Null)
    }

    fn add_style(&mut self, _css: &str) -> Result<(), ProbeError> {
        self.record("add_style", "")
    }

    fn pause(&mut self, ms: u64) -> Result<(), ProbeError> {
        self.record("pause", &ms.to_string())
    }

    fn count(&mut self, locator: &str) -> Result<usize, ProbeError> {
        self.record("count", locator)?;
        Ok(self.state.borrow().live.get(locator).copied().unwrap_or(0))
    }

    fn scroll_into_view(&mut self, locator: &str, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("scroll_into_view", locator)
    }

    fn wait_visible(&mut self, locator: &str, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("wait_visible", locator)
    }

    fn fill(&mut self, locator: &str, _value: &str, opts: ActOptions) -> Result<(), ProbeError> {
        self.act("fill", locator, opts)
    }

    fn click(&mut self, locator: &str, opts: ActOptions) -> Result<(), ProbeError> {
        self.act("click", locator, opts)
    }

    fn type_keys(&mut self, text: &str) -> Result<(), ProbeError> {
        self.record("type_keys", text)
    }

    fn select_option(&mut self, locator: &str, _value: &str, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("select_option", locator)
    }

    fn set_checked(&mut self, locator: &str, checked: bool, _timeout_ms: u64) -> Result<(), ProbeError> {
        let op = if checked { "check" } else { "uncheck" };
        self.record(op, locator)
    }

    fn hover(&mut self, locator: &str, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("hover", locator)
    }

    fn press(&mut self, locator: &str, key: &str, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("press", &format!("{} {}", locator, key))
    }

    fn clear(&mut self, locator: &str, _timeout_ms: u64) -> Result<(), ProbeError> {
        self.record("clear", locator)
    }

    fn screenshot(&mut self) -> Result<Vec<u8>, ProbeError> {
        self.record("screenshot", "")?;
        if self.state.borrow().screenshot_fails {
            return Err(ProbeError::SessionProtocol {
                command: "screenshot".into(),
                error: "page crashed".into(),
            });
        }
        Ok(FAKE_PNG.to_vec())
    }

    fn current_url(&mut self) -> Result<String, ProbeError> {
        self.record("current_url", "")?;
        Ok(String::new())
    }

    fn shutdown(&mut self) -> Result<(), ProbeError> {
        self.record("shutdown", "")?;
        self.state.borrow_mut().shutdowns += 1;
        Ok(())
    }
}
