use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::artifacts::store::{ArtifactStore, slug};
use crate::browser::driver::{ActOptions, PageDriver};
use crate::error::ProbeError;
use crate::exec::context::TestContext;
use crate::exec::index::ElementIndex;
use crate::exec::ladder::{Rung, climb};
use crate::exec::model::{ExecutionResult, Step, StepAction, TestCase};
use crate::scanner::locator::quote;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Bound on a single click/fill/select/... call
    #[serde(default = "default_act")]
    pub act_timeout_ms: u64,

    /// Bound on the first, plain fill attempt of a `type` step
    #[serde(default = "default_fill")]
    pub fill_timeout_ms: u64,

    #[serde(default = "default_visible")]
    pub visible_timeout_ms: u64,

    /// Pause between the focusing click and the forced fill
    #[serde(default = "default_focus_pause")]
    pub focus_pause_ms: u64,

    /// Delay for `wait` steps without a value
    #[serde(default = "default_wait")]
    pub default_wait_ms: u64,

    /// Key for `press` steps without a value
    #[serde(default = "default_key")]
    pub default_press_key: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            act_timeout_ms: default_act(),
            fill_timeout_ms: default_fill(),
            visible_timeout_ms: default_visible(),
            focus_pause_ms: default_focus_pause(),
            default_wait_ms: default_wait(),
            default_press_key: default_key(),
        }
    }
}

fn default_act() -> u64 { 5000 }
fn default_fill() -> u64 { 3000 }
fn default_visible() -> u64 { 5000 }
fn default_focus_pause() -> u64 { 100 }
fn default_wait() -> u64 { 1000 }
fn default_key() -> String { "Enter".to_string() }

/// Where a step was when it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Locating,
    VisibleWait,
    Acting,
    Done,
    Failed,
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepPhase::Locating => "locating",
            StepPhase::VisibleWait => "visible-wait",
            StepPhase::Acting => "acting",
            StepPhase::Done => "done",
            StepPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A step that ended in `Failed`, with the phase it failed in.
#[derive(Debug)]
pub struct StepFailure {
    pub index: usize,
    pub step: String,
    pub phase: StepPhase,
    pub error: ProbeError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step {} ({}) failed while {}: {}",
            self.index, self.step, self.phase, self.error
        )
    }
}

/// Drives one browser action per step, with fallbacks.
#[derive(Debug, Clone, Default)]
pub struct ActionExecutor {
    pub config: ExecutorConfig,
}

impl ActionExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Run a test's steps in order against an already-loaded page.
    ///
    /// Captures one `before` screenshot, then exactly one of `after` (all
    /// steps passed) or `error` (first failing step; the rest are skipped).
    /// `ordinal` is the test's position in the run and keeps screenshot keys
    /// apart when test names collide.
    pub fn run_test(
        &self,
        driver: &mut dyn PageDriver,
        index: &ElementIndex,
        test: &TestCase,
        ordinal: usize,
        artifacts: &dyn ArtifactStore,
        run_id: &str,
    ) -> ExecutionResult {
        let mut ctx = TestContext::new();
        info!(test = %test.name, ordinal, steps = test.steps.len(), "test started");
        let dir = shot_dir(run_id, ordinal, &test.name);

        ctx.record_screenshot(capture(driver, artifacts, &dir, "before"));

        for (i, step) in test.steps.iter().enumerate() {
            ctx.begin_step(i);
            if let Err(failure) = self.execute_step(driver, index, i, step) {
                warn!(test = %test.name, "{}", failure);
                ctx.record_screenshot(capture(driver, artifacts, &dir, "error"));
                return ctx.finish(test, Some(failure.to_string()));
            }
        }

        ctx.record_screenshot(capture(driver, artifacts, &dir, "after"));
        info!(test = %test.name, "test passed");
        ctx.finish(test, None)
    }

    /// Fail a test that never got to its first step (e.g. navigation broke),
    /// keeping the one-before, one-terminal screenshot contract.
    pub fn abort_test(
        &self,
        driver: &mut dyn PageDriver,
        test: &TestCase,
        ordinal: usize,
        artifacts: &dyn ArtifactStore,
        run_id: &str,
        error: &ProbeError,
    ) -> ExecutionResult {
        warn!(test = %test.name, error = %error, "test aborted before its first step");
        let dir = shot_dir(run_id, ordinal, &test.name);
        let mut ctx = TestContext::new();
        ctx.record_screenshot(capture(driver, artifacts, &dir, "before"));
        ctx.record_screenshot(capture(driver, artifacts, &dir, "error"));
        ctx.finish(test, Some(error.to_string()))
    }

    /// Locating → visible-wait → acting for one step.
    pub fn execute_step(
        &self,
        driver: &mut dyn PageDriver,
        index: &ElementIndex,
        step_index: usize,
        step: &Step,
    ) -> Result<(), StepFailure> {
        let fail = |phase: StepPhase, error: ProbeError| StepFailure {
            index: step_index,
            step: step.to_string(),
            phase,
            error,
        };

        let action = step
            .parsed_action()
            .map_err(|e| fail(StepPhase::Acting, e))?;

        if !action.needs_target() {
            debug!(step = step_index, phase = %StepPhase::Acting, "{}", step);
            self.act(driver, action, "", step)
                .map_err(|e| fail(StepPhase::Acting, e))?;
            debug!(step = step_index, phase = %StepPhase::Done, "{}", step);
            return Ok(());
        }

        debug!(step = step_index, phase = %StepPhase::Locating, "{}", step);
        let resolved = index.resolve(&step.target);
        let locator = self
            .locate(driver, &step.target, &resolved)
            .map_err(|e| fail(StepPhase::Locating, e))?;

        debug!(step = step_index, phase = %StepPhase::VisibleWait, locator = %locator);
        self.await_visible(driver, &locator);

        debug!(step = step_index, phase = %StepPhase::Acting, locator = %locator);
        self.act(driver, action, &locator, step)
            .map_err(|e| fail(StepPhase::Acting, e))?;

        debug!(step = step_index, phase = %StepPhase::Done, locator = %locator);
        Ok(())
    }

    /// First candidate locator that matches a live node.
    pub fn locate(
        &self,
        driver: &mut dyn PageDriver,
        target: &str,
        resolved: &str,
    ) -> Result<String, ProbeError> {
        let mut candidates = vec![resolved.to_string()];
        for alt in fallback_candidates(target) {
            if !candidates.contains(&alt) {
                candidates.push(alt);
            }
        }

        for candidate in candidates.iter().filter(|c| !c.trim().is_empty()) {
            match driver.count(candidate) {
                Ok(n) if n > 0 => {
                    if candidate != resolved {
                        info!(target = %target, locator = %candidate, "located via fallback candidate");
                    }
                    return Ok(candidate.clone());
                }
                Ok(_) => debug!(locator = %candidate, "no live node"),
                Err(e) => debug!(locator = %candidate, error = %e, "candidate rejected"),
            }
        }

        Err(ProbeError::ElementNotFound {
            target: target.to_string(),
            locator: resolved.to_string(),
        })
    }

    /// Visibility is advisory: a timeout is logged and the step proceeds.
    fn await_visible(&self, driver: &mut dyn PageDriver, locator: &str) {
        let timeout = self.config.visible_timeout_ms;
        if let Err(e) = driver.scroll_into_view(locator, timeout) {
            debug!(locator = %locator, error = %e, "scroll into view failed");
        }
        if let Err(e) = driver.wait_visible(locator, timeout) {
            warn!(locator = %locator, error = %e, "element not reported visible; acting anyway");
        }
    }

    fn act(
        &self,
        driver: &mut dyn PageDriver,
        action: StepAction,
        locator: &str,
        step: &Step,
    ) -> Result<(), ProbeError> {
        let act_timeout = self.config.act_timeout_ms;
        match action {
            StepAction::Type => {
                let value = step.text_value();
                let rung = climb(driver, &self.type_ladder(locator, &value))?;
                debug!(locator = %locator, rung, "typed");
                Ok(())
            }
            StepAction::Click => {
                let rung = climb(driver, &self.click_ladder(locator))?;
                debug!(locator = %locator, rung, "clicked");
                Ok(())
            }
            StepAction::Select => driver.select_option(locator, &step.text_value(), act_timeout),
            StepAction::Check => driver.set_checked(locator, true, act_timeout),
            StepAction::Uncheck => driver.set_checked(locator, false, act_timeout),
            StepAction::Hover => driver.hover(locator, act_timeout),
            StepAction::Press => {
                let key = step
                    .value
                    .as_ref()
                    .map(|v| v.as_text())
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| self.config.default_press_key.clone());
                driver.press(locator, &key, act_timeout)
            }
            StepAction::Clear => driver.clear(locator, act_timeout),
            StepAction::Wait => {
                let ms = step
                    .value
                    .as_ref()
                    .and_then(|v| v.as_millis())
                    .unwrap_or(self.config.default_wait_ms);
                driver.pause(ms)
            }
        }
    }

    /// fill → forced click + pause + forced fill → forced click + keyboard.
    pub fn type_ladder<'a>(&'a self, locator: &'a str, value: &'a str) -> Vec<Rung<'a>> {
        let cfg = &self.config;
        vec![
            Rung::new("fill", move |d| {
                d.fill(locator, value, ActOptions::bounded(cfg.fill_timeout_ms))
            }),
            Rung::new("focus-then-fill", move |d| {
                d.click(locator, ActOptions::forced(cfg.act_timeout_ms))?;
                d.pause(cfg.focus_pause_ms)?;
                d.fill(locator, value, ActOptions::forced(cfg.act_timeout_ms))
            }),
            Rung::new("keyboard", move |d| {
                d.click(locator, ActOptions::forced(cfg.act_timeout_ms))?;
                d.type_keys(value)
            }),
        ]
    }

    /// click → forced click.
    pub fn click_ladder<'a>(&'a self, locator: &'a str) -> Vec<Rung<'a>> {
        let cfg = &self.config;
        vec![
            Rung::new("click", move |d| {
                d.click(locator, ActOptions::bounded(cfg.act_timeout_ms))
            }),
            Rung::new("force-click", move |d| {
                d.click(locator, ActOptions::forced(cfg.act_timeout_ms))
            }),
        ]
    }
}

/// Alternative locators derived from the raw step target, tried in order
/// after the resolved locator misses.
pub fn fallback_candidates(target: &str) -> Vec<String> {
    let target = target.trim();
    if target.is_empty() {
        return Vec::new();
    }
    let q = quote(target);
    vec![
        format!("[data-testid={}]", q),
        format!("button:has-text({})", q),
        format!("a:has-text({})", q),
        format!("[placeholder*={} i]", q),
    ]
}

/// Key prefix for one test's screenshots: `<run>/<ordinal>-<slug>`.
pub fn shot_dir(run_id: &str, ordinal: usize, test_name: &str) -> String {
    format!("{}/{:03}-{}", run_id, ordinal, slug(test_name))
}

/// Screenshot into the artifact store. A failed capture is logged and
/// yields no reference.
fn capture(
    driver: &mut dyn PageDriver,
    artifacts: &dyn ArtifactStore,
    dir: &str,
    label: &str,
) -> Option<String> {
    let key = format!("{}/{}", dir, label);
    let stored = driver
        .screenshot()
        .and_then(|png| artifacts.put_blob(&key, &png, "image/png"));
    match stored {
        Ok(reference) => Some(reference),
        Err(e) => {
            warn!(key = %key, error = %e, "screenshot capture failed");
            None
        }
    }
}
