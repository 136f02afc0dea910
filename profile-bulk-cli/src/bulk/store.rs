//! Record stores used by the pipeline

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::{BatchJob, BatchStatus, WorkflowRequest};

/// Persistent approval requests
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Requests for `user_id` still awaiting approval, oldest first
    async fn find_pending(&self, user_id: &str) -> Result<Vec<WorkflowRequest>>;

    async fn find_by_id(&self, wf_id: &str) -> Result<Option<WorkflowRequest>>;

    /// Insert or replace by `wf_id`
    async fn upsert(&self, request: &WorkflowRequest) -> Result<()>;
}

/// Partial update of a batch-status record; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStatusUpdate {
    pub status: Option<BatchStatus>,
    pub total: Option<u32>,
    pub successful: Option<u32>,
    pub failed: Option<u32>,
}

impl BatchStatusUpdate {
    pub fn status(status: BatchStatus) -> Self {
        BatchStatusUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Every field taken from the job
    pub fn from_job(job: &BatchJob) -> Self {
        BatchStatusUpdate {
            status: Some(job.status),
            total: Some(job.total),
            successful: Some(job.successful),
            failed: Some(job.failed),
        }
    }

    /// Counters only
    pub fn counters(job: &BatchJob) -> Self {
        BatchStatusUpdate {
            status: None,
            ..Self::from_job(job)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatusRecord {
    pub organization_id: String,
    pub batch_id: String,
    pub status: Option<BatchStatus>,
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
    pub updated_on: DateTime<Utc>,
}

/// Batch progress keyed by (organization id, batch id)
#[async_trait]
pub trait BatchStatusStore: Send + Sync {
    async fn update_status(
        &self,
        organization_id: &str,
        batch_id: &str,
        update: &BatchStatusUpdate,
    ) -> Result<()>;

    async fn get_status(
        &self,
        organization_id: &str,
        batch_id: &str,
    ) -> Result<Option<BatchStatusRecord>>;
}
