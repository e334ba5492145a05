//! Batch run results

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An item a batch run could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchFailure {
    /// Identifier of the failed item, e.g. `student:7/class:3` or `teacher:4`
    pub id: String,
    pub reason: String,
}

/// What happened to a single item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Created,
    Skipped,
    Failed(BatchFailure),
}

impl ItemOutcome {
    pub fn failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        ItemOutcome::Failed(BatchFailure {
            id: id.into(),
            reason: reason.into(),
        })
    }
}

/// Summary of a generation or calculation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchResult {
    pub created: u32,
    pub skipped: u32,
    pub failed: Vec<BatchFailure>,
}

impl BatchResult {
    /// Fold one item outcome into the summary.
    pub fn record(mut self, outcome: ItemOutcome) -> Self {
        match outcome {
            ItemOutcome::Created => self.created += 1,
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed(failure) => self.failed.push(failure),
        }
        self
    }

    pub fn total(&self) -> usize {
        self.created as usize + self.skipped as usize + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl FromIterator<ItemOutcome> for BatchResult {
    fn from_iter<I: IntoIterator<Item = ItemOutcome>>(iter: I) -> Self {
        iter.into_iter().fold(BatchResult::default(), BatchResult::record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_outcomes() {
        let result: BatchResult = vec![
            ItemOutcome::Created,
            ItemOutcome::Skipped,
            ItemOutcome::Created,
            ItemOutcome::failed("student:1/class:2", "class 2 has no tuition"),
        ]
        .into_iter()
        .collect();

        assert_eq!(result.created, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].id, "student:1/class:2");
        assert_eq!(result.total(), 4);
        assert!(result.has_failures());
    }

    #[test]
    fn empty_batch_is_zeroed() {
        let result: BatchResult = std::iter::empty().collect();
        assert_eq!(result, BatchResult::default());
        assert!(!result.has_failures());
    }
}
