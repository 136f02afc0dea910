//! Batch job accounting

use serde::{Deserialize, Serialize};

/// Lifecycle of a bulk-upload run: `Created -> InProgress -> {Successful, Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Created,
    InProgress,
    Successful,
    Failed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Created => "CREATED",
            BatchStatus::InProgress => "IN_PROGRESS",
            BatchStatus::Successful => "SUCCESSFUL",
            BatchStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<BatchStatus> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Some(BatchStatus::Created),
            "IN_PROGRESS" => Some(BatchStatus::InProgress),
            "SUCCESSFUL" => Some(BatchStatus::Successful),
            "FAILED" => Some(BatchStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Successful | BatchStatus::Failed)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Success,
    /// Every message recorded against the row
    Failure(Vec<String>),
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Success)
    }
}

/// One bulk-upload run for one organisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub organization_id: String,
    pub batch_id: String,
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
    pub status: BatchStatus,
}

impl BatchJob {
    pub fn new(organization_id: impl Into<String>, batch_id: impl Into<String>) -> Self {
        BatchJob {
            organization_id: organization_id.into(),
            batch_id: batch_id.into(),
            total: 0,
            successful: 0,
            failed: 0,
            status: BatchStatus::Created,
        }
    }

    pub fn start(&mut self) {
        self.status = BatchStatus::InProgress;
    }

    /// Count one processed row
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.total += 1;
        if outcome.is_success() {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Settle the final status once every row is processed.
    ///
    /// Successful only when the result upload worked, at least one row was
    /// processed and every processed row succeeded.
    pub fn complete(&mut self, upload_succeeded: bool) {
        let all_rows_succeeded =
            self.failed == 0 && self.total == self.successful && self.total >= 1;
        self.status = if upload_succeeded && all_rows_succeeded {
            BatchStatus::Successful
        } else {
            BatchStatus::Failed
        };
    }

    /// Abort the run; counters keep whatever was reached
    pub fn fail(&mut self) {
        self.status = BatchStatus::Failed;
    }
}
