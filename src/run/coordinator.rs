use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifacts::store::{ArtifactStore, short_digest};
use crate::browser::driver::PageDriver;
use crate::error::ProbeError;
use crate::exec::context::TestContext;
use crate::exec::executor::{ActionExecutor, ExecutorConfig};
use crate::exec::index::ElementIndex;
use crate::exec::model::{ExecutionResult, TestCase, TestRunRecord};
use crate::readiness::detector::{ReadinessConfig, ReadinessDetector, ReadinessReport};
use crate::run::guard::{BrowserGuard, ContextGuard};
use crate::scanner::model::ElementDescriptor;
use crate::scanner::scanner::{ScanConfig, scan};

/// Engine settings, one section per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub execution: ExecutorConfig,
    /// Bound on reaching DOM-content-loaded
    #[serde(default = "default_nav_timeout")]
    pub navigation_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            readiness: ReadinessConfig::default(),
            execution: ExecutorConfig::default(),
            navigation_timeout_ms: default_nav_timeout(),
        }
    }
}

fn default_nav_timeout() -> u64 { 30_000 }

/// What discovery hands to the plan generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    pub url: String,
    pub title: String,
    pub elements: Vec<ElementDescriptor>,
    pub visible_text: String,
    pub readiness: ReadinessReport,
}

/// Sequences readiness, scanning and execution over one browser.
///
/// The browser is acquired once and released exactly once, on `finish` or
/// on drop. Every discovery and every test gets its own browsing context.
pub struct RunCoordinator<'s, D: PageDriver> {
    browser: BrowserGuard<D>,
    artifacts: &'s dyn ArtifactStore,
    readiness: ReadinessDetector,
    executor: ActionExecutor,
    scan: ScanConfig,
    navigation_timeout_ms: u64,
}

impl<'s, D: PageDriver> RunCoordinator<'s, D> {
    pub fn new(driver: D, config: EngineConfig, artifacts: &'s dyn ArtifactStore) -> Self {
        Self {
            browser: BrowserGuard::new(driver),
            artifacts,
            readiness: ReadinessDetector::new(config.readiness),
            executor: ActionExecutor::new(config.execution),
            scan: config.scan,
            navigation_timeout_ms: config.navigation_timeout_ms,
        }
    }

    /// Navigate, settle and scan. Navigation failures and pages with no
    /// content at all are hard errors.
    pub fn discover(&mut self, url: &str) -> Result<DiscoveryResult, ProbeError> {
        info!(url = %url, "discovery started");
        let mut context = ContextGuard::open(&mut *self.browser)?;
        let driver = context.driver();

        navigate(driver, url, self.navigation_timeout_ms)?;
        let readiness = self.readiness.settle(driver);
        let output = scan(driver, &self.scan)?;

        if output.elements.is_empty() && output.visible_text.trim().is_empty() {
            return Err(ProbeError::EmptyPage(url.to_string()));
        }

        info!(url = %url, elements = output.elements.len(), "discovery finished");
        Ok(DiscoveryResult {
            url: if output.url.is_empty() { url.to_string() } else { output.url },
            title: output.title,
            elements: output.elements,
            visible_text: output.visible_text,
            readiness,
        })
    }

    /// Execute every test of a run record, one after another. A failing
    /// test never stops its siblings.
    pub fn execute(&mut self, record: &TestRunRecord) -> Vec<ExecutionResult> {
        let id = run_id(&record.url);
        self.execute_as(record, &id)
    }

    /// `execute` under a caller-chosen run id, which prefixes every
    /// screenshot key.
    pub fn execute_as(&mut self, record: &TestRunRecord, run_id: &str) -> Vec<ExecutionResult> {
        let index = ElementIndex::from_descriptors(&record.elements);
        info!(run_id = %run_id, tests = record.tests.len(), indexed = index.len(), "run started");

        let results: Vec<ExecutionResult> = record
            .tests
            .iter()
            .enumerate()
            .map(|(ordinal, test)| self.execute_one(&record.url, &index, test, ordinal, run_id))
            .collect();

        let passed = results.iter().filter(|r| r.passed()).count();
        info!(run_id = %run_id, passed, failed = results.len() - passed, "run finished");
        results
    }

    fn execute_one(
        &mut self,
        url: &str,
        index: &ElementIndex,
        test: &TestCase,
        ordinal: usize,
        run_id: &str,
    ) -> ExecutionResult {
        let mut context = match ContextGuard::open(&mut *self.browser) {
            Ok(c) => c,
            Err(e) => {
                // No page to photograph without a context
                warn!(test = %test.name, error = %e, "could not open a browsing context");
                return TestContext::new().finish(test, Some(e.to_string()));
            }
        };
        let driver = context.driver();

        if let Err(e) = navigate(driver, url, self.navigation_timeout_ms) {
            return self.executor.abort_test(driver, test, ordinal, self.artifacts, run_id, &e);
        }
        self.readiness.settle(driver);

        self.executor.run_test(driver, index, test, ordinal, self.artifacts, run_id)
    }

    /// Shut the browser down now instead of at drop.
    pub fn finish(mut self) -> Result<(), ProbeError> {
        self.browser.release()
    }
}

fn navigate(driver: &mut dyn PageDriver, url: &str, timeout_ms: u64) -> Result<(), ProbeError> {
    driver.goto(url, timeout_ms).map_err(|e| match e {
        nav @ ProbeError::NavigationFailure { .. } => nav,
        other => ProbeError::NavigationFailure {
            url: url.to_string(),
            reason: other.to_string(),
        },
    })
}

/// Short id for a run: digest of the URL and the start time.
pub fn run_id(url: &str) -> String {
    let now = Utc::now();
    let seed = format!("{}@{}", url, now.to_rfc3339());
    format!("{}-{}", now.format("%Y%m%dT%H%M%S"), short_digest(seed.as_bytes(), 8))
}
