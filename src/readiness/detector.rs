use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::driver::PageDriver;
use crate::error::ProbeError;
use crate::readiness::markers::{FREEZE_ANIMATIONS_CSS, content_ready_expression};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_network_idle")]
    pub network_idle_timeout_ms: u64,

    #[serde(default = "default_content")]
    pub content_timeout_ms: u64,

    /// Body markup size that counts as "rendered" on its own
    #[serde(default = "default_min_body")]
    pub min_body_bytes: usize,

    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// How far the synthetic scroll goes, in viewport heights
    #[serde(default = "default_scroll_viewports")]
    pub scroll_viewports: f64,

    #[serde(default = "default_scroll_pause")]
    pub scroll_pause_ms: u64,

    #[serde(default = "default_final_settle")]
    pub final_settle_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            network_idle_timeout_ms: default_network_idle(),
            content_timeout_ms: default_content(),
            min_body_bytes: default_min_body(),
            settle_ms: default_settle(),
            scroll_viewports: default_scroll_viewports(),
            scroll_pause_ms: default_scroll_pause(),
            final_settle_ms: default_final_settle(),
        }
    }
}

fn default_network_idle() -> u64 { 5000 }
fn default_content() -> u64 { 8000 }
fn default_min_body() -> usize { 500 }
fn default_settle() -> u64 { 500 }
fn default_scroll_viewports() -> f64 { 2.0 }
fn default_scroll_pause() -> u64 { 300 }
fn default_final_settle() -> u64 { 300 }

/// How one layer ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOutcome {
    pub layer: String,
    pub satisfied: bool,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub layers: Vec<LayerOutcome>,
}

impl ReadinessReport {
    /// True when every layer completed without timing out or failing.
    pub fn fully_settled(&self) -> bool {
        self.layers.iter().all(|l| l.satisfied)
    }
}

type Layer = (&'static str, fn(&ReadinessDetector, &mut dyn PageDriver) -> Result<(), ProbeError>);

/// Layered "stable enough" heuristic, run in order. Each layer is bounded
/// and a failing layer is logged and skipped.
const LAYERS: &[Layer] = &[
    ("network-idle", ReadinessDetector::network_idle),
    ("content", ReadinessDetector::content),
    ("settle", ReadinessDetector::settle_delay),
    ("lazy-scroll", ReadinessDetector::lazy_scroll),
    ("freeze-animations", ReadinessDetector::freeze_animations),
    ("final-settle", ReadinessDetector::final_settle),
];

/// Decides when a navigated page has rendered enough to scan or act on.
///
/// Never fails: if every layer times out the caller proceeds with whatever
/// has rendered.
#[derive(Debug, Clone, Default)]
pub struct ReadinessDetector {
    pub config: ReadinessConfig,
}

impl ReadinessDetector {
    pub fn new(config: ReadinessConfig) -> Self {
        Self { config }
    }

    pub fn settle(&self, driver: &mut dyn PageDriver) -> ReadinessReport {
        let mut report = ReadinessReport::default();

        for (name, layer) in LAYERS {
            let started = Instant::now();
            let result = layer(self, driver);
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let outcome = match result {
                Ok(()) => {
                    debug!(layer = name, elapsed_ms, "readiness layer satisfied");
                    LayerOutcome {
                        layer: name.to_string(),
                        satisfied: true,
                        elapsed_ms,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(layer = name, elapsed_ms, error = %e, "readiness layer gave up; continuing");
                    LayerOutcome {
                        layer: name.to_string(),
                        satisfied: false,
                        elapsed_ms,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.layers.push(outcome);
        }

        report
    }

    fn network_idle(&self, driver: &mut dyn PageDriver) -> Result<(), ProbeError> {
        driver.wait_for_network_idle(self.config.network_idle_timeout_ms)
    }

    fn content(&self, driver: &mut dyn PageDriver) -> Result<(), ProbeError> {
        let expression = content_ready_expression(self.config.min_body_bytes);
        driver.wait_for_function(&expression, self.config.content_timeout_ms)
    }

    fn settle_delay(&self, driver: &mut dyn PageDriver) -> Result<(), ProbeError> {
        driver.pause(self.config.settle_ms)
    }

    fn lazy_scroll(&self, driver: &mut dyn PageDriver) -> Result<(), ProbeError> {
        driver.evaluate(
            "(factor) => window.scrollBy(0, window.innerHeight * factor)",
            Value::from(self.config.scroll_viewports),
        )?;
        driver.pause(self.config.scroll_pause_ms)?;
        driver.evaluate("() => window.scrollTo(0, 0)", Value::Null)?;
        driver.pause(self.config.scroll_pause_ms)
    }

    fn freeze_animations(&self, driver: &mut dyn PageDriver) -> Result<(), ProbeError> {
        driver.add_style(FREEZE_ANIMATIONS_CSS)
    }

    fn final_settle(&self, driver: &mut dyn PageDriver) -> Result<(), ProbeError> {
        driver.pause(self.config.final_settle_ms)
    }
}
