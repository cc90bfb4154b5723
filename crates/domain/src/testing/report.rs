//! Aggregated results of one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::BaseUrl;
use crate::response::Outcome;

/// Result of one test case within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Test case name.
    pub name: String,
    /// What the request produced.
    pub outcome: Outcome,
    /// Whether the expectation held.
    pub passed: bool,
}

/// Ordered pass/fail results of one run, in registration order.
///
/// Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    run_id: Uuid,
    base_url: BaseUrl,
    started_at: DateTime<Utc>,
    duration_ms: u64,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Creates a finished report.
    #[must_use]
    pub const fn new(
        run_id: Uuid,
        base_url: BaseUrl,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        entries: Vec<ReportEntry>,
    ) -> Self {
        Self {
            run_id,
            base_url,
            started_at,
            duration_ms,
            entries,
        }
    }

    /// Identifier of the run that produced this report.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Service root the run targeted.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// When the run started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Total wall-clock time of the run in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Looks up an entry by test case name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Number of test cases run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Number of passing test cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|entry| entry.passed).count()
    }

    /// Number of failing test cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Check if every test case passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.entries.iter().all(|entry| entry.passed)
    }

    /// Get pass rate as percentage. An empty run counts as 100%.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.entries.is_empty() {
            100.0
        } else {
            (self.passed() as f64 / self.total() as f64) * 100.0
        }
    }
}
