//! Run reports
//!
//! Summary of a completed orchestration run: which pages were visited,
//! how many tests ran, and when.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-page slice of a run report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageReport {
    /// Effective URL of the page.
    pub url: String,

    /// Number of tests dispatched and completed on this page.
    pub tests_run: usize,
}

/// Summary of a full run, returned by the runner after the finish hooks
/// have fired. Pass/fail of individual tests is opaque to the core; this
/// only records orchestration progress.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the run phase started.
    pub started_at: DateTime<Utc>,

    /// Timestamp when the finish hooks fired.
    pub finished_at: DateTime<Utc>,

    /// Number of pages consumed from the worklist.
    pub pages_visited: usize,

    /// Total tests dispatched across all pages.
    pub tests_run: usize,

    /// Wall-clock duration of the run phase in milliseconds.
    pub duration_ms: u64,

    /// Per-page breakdown, in visit order.
    pub pages: Vec<PageReport>,
}

impl RunReport {
    pub(crate) fn new(started_at: DateTime<Utc>, pages: Vec<PageReport>) -> Self {
        let finished_at = Utc::now();
        let tests_run = pages.iter().map(|p| p.tests_run).sum();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        Self {
            started_at,
            finished_at,
            pages_visited: pages.len(),
            tests_run,
            duration_ms,
            pages,
        }
    }

    /// Whether the run visited no pages at all.
    pub fn is_empty(&self) -> bool {
        self.pages_visited == 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run finished at {}", self.finished_at)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for page in &self.pages {
            writeln!(f, "  {} ({} tests)", page.url, page.tests_run)?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        write!(
            f,
            "Pages: {} | Tests: {} | Duration: {}ms",
            self.pages_visited, self.tests_run, self.duration_ms
        )
    }
}
