use crate::catalog::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Counts for one imported batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchOutcome {
    Imported {
        category: Category,
        counts: BatchReport,
    },
    /// Batch never reached the importer (unresolved, empty, nothing parseable)
    Skipped { reason: String },
    /// Course or module could not be resolved; no lessons were written
    Failed { category: Option<Category>, error: String },
}

/// Result of one collection (or legacy category) batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_name: String,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Success,
    /// Some batches were skipped or failed, or some lessons could not be written
    PartialSuccess,
    /// Configuration or first-stage fetch failure; nothing was imported
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::PartialSuccess => write!(f, "partial success"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Aggregate outcome of a synchronization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub batches: Vec<BatchSummary>,
    pub dropped_assets: usize,
    pub fatal_error: Option<String>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            elapsed: Duration::ZERO,
            batches: Vec::new(),
            dropped_assets: 0,
            fatal_error: None,
        }
    }

    pub fn record(&mut self, batch_name: impl Into<String>, outcome: BatchOutcome) {
        self.batches.push(BatchSummary {
            batch_name: batch_name.into(),
            outcome,
        });
    }

    pub fn fail(&mut self, error: impl fmt::Display) {
        self.fatal_error = Some(error.to_string());
    }

    pub fn status(&self) -> RunStatus {
        if self.fatal_error.is_some() {
            return RunStatus::Failed;
        }

        let clean = self.dropped_assets == 0
            && self.batches.iter().all(|b| match &b.outcome {
                BatchOutcome::Imported { counts, .. } => !counts.has_failures(),
                _ => false,
            });

        if clean {
            RunStatus::Success
        } else {
            RunStatus::PartialSuccess
        }
    }

    /// Counts summed over every imported batch
    pub fn totals(&self) -> BatchReport {
        self.batches
            .iter()
            .filter_map(|b| match &b.outcome {
                BatchOutcome::Imported { counts, .. } => Some(*counts),
                _ => None,
            })
            .fold(BatchReport::default(), |acc, c| BatchReport {
                inserted: acc.inserted + c.inserted,
                skipped: acc.skipped + c.skipped,
                failed: acc.failed + c.failed,
                total: acc.total + c.total,
            })
    }

    pub fn summary(&self) -> String {
        let totals = self.totals();
        let skipped_batches = self
            .batches
            .iter()
            .filter(|b| matches!(b.outcome, BatchOutcome::Skipped { .. }))
            .count();
        let failed_batches = self
            .batches
            .iter()
            .filter(|b| matches!(b.outcome, BatchOutcome::Failed { .. }))
            .count();

        let mut text = format!(
            "Sync {} in {:.1}s:\n\
            - Batches: {} ({} skipped, {} failed)\n\
            - Lessons inserted: {}\n\
            - Lessons already present: {}\n\
            - Lessons failed: {}\n\
            - Assets dropped: {}",
            self.status(),
            self.elapsed.as_secs_f64(),
            self.batches.len(),
            skipped_batches,
            failed_batches,
            totals.inserted,
            totals.skipped,
            totals.failed,
            self.dropped_assets,
        );
        if let Some(error) = &self.fatal_error {
            text.push_str(&format!("\n- Fatal error: {}", error));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imported(failed: usize) -> BatchOutcome {
        BatchOutcome::Imported {
            category: Category::Mill,
            counts: BatchReport { inserted: 2, skipped: 1, failed, total: 3 + failed },
        }
    }

    #[test]
    fn test_status_transitions() {
        let mut report = RunReport::new(Utc::now());
        report.record("Mill basics", imported(0));
        assert_eq!(report.status(), RunStatus::Success);

        report.record("Misc", BatchOutcome::Skipped { reason: "unresolved".into() });
        assert_eq!(report.status(), RunStatus::PartialSuccess);

        report.fail("BUNNY_API_KEY missing");
        assert_eq!(report.status(), RunStatus::Failed);
    }

    #[test]
    fn test_lesson_failures_make_partial_success() {
        let mut report = RunReport::new(Utc::now());
        report.record("Mill basics", imported(1));
        assert_eq!(report.status(), RunStatus::PartialSuccess);
        assert_eq!(report.totals().failed, 1);
        assert!(report.summary().contains("Lessons failed: 1"));
    }
}
