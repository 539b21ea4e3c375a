use std::time::Instant;

use crate::exec::model::{ExecutionResult, TestCase, TestStatus};

/// Tracks the progress and artifacts of a running test.
#[derive(Debug, Clone)]
pub struct TestContext {
    /// Current step index (0-based)
    pub current_step: usize,

    /// Steps that have been started, including a failing one
    pub steps_run: usize,

    /// Screenshot references captured so far, in order
    pub screenshots: Vec<String>,

    started: Instant,
}

impl TestContext {
    pub fn new() -> Self {
        TestContext {
            current_step: 0,
            steps_run: 0,
            screenshots: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Enter step `index`.
    pub fn begin_step(&mut self, index: usize) {
        self.current_step = index;
        self.steps_run = index + 1;
    }

    /// Keep a screenshot reference if the capture succeeded.
    pub fn record_screenshot(&mut self, reference: Option<String>) {
        if let Some(r) = reference {
            self.screenshots.push(r);
        }
    }

    pub fn finish(self, test: &TestCase, error: Option<String>) -> ExecutionResult {
        let status = if error.is_some() {
            TestStatus::Fail
        } else {
            TestStatus::Pass
        };
        ExecutionResult {
            name: test.name.clone(),
            status,
            screenshots: self.screenshots,
            error,
            steps: test.steps.clone(),
            steps_run: self.steps_run,
            duration_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
