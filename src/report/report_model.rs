use serde::{Deserialize, Serialize};

use crate::exec::model::ExecutionResult;

// ============================================================================
// Run report — aggregates the results of one run
// ============================================================================

/// Aggregated report for one executed run record.
///
/// Built from a `Vec<ExecutionResult>` via `from_results()`. Consumed by the
/// console and JUnit reporters, and persisted as the run's result document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Page the run was executed against
    pub url: String,

    pub total: usize,

    pub passed: usize,

    pub failed: usize,

    /// Total execution duration in milliseconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub results: Vec<ExecutionResult>,
}

impl RunReport {
    /// Build a report from a list of results, computing the counts.
    pub fn from_results(url: &str, results: Vec<ExecutionResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            url: url.to_string(),
            total,
            passed,
            failed: total - passed,
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
