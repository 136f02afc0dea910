//! New workflow request submission

use std::sync::Arc;

use super::error::RowError;
use super::profile::ProfileUpdater;
use super::store::WorkflowStore;
use super::types::{ChangeSet, RowSchema, UserIdentity, WorkflowRequest, WorkflowState};

pub struct RequestSubmitter {
    store: Arc<dyn WorkflowStore>,
    updater: Arc<ProfileUpdater>,
}

impl RequestSubmitter {
    pub fn new(store: Arc<dyn WorkflowStore>, updater: Arc<ProfileUpdater>) -> Self {
        Self { store, updater }
    }

    /// Persist one request proposing every remaining change, submit it for
    /// profile update and read back where it ended up.
    ///
    /// Returns the stored request; a REJECTED outcome is a row error.
    pub async fn submit(
        &self,
        identity: &UserIdentity,
        changes: &ChangeSet,
        schema: RowSchema,
    ) -> Result<WorkflowRequest, RowError> {
        let store_error = |e: anyhow::Error| RowError::Store(format!("{:#}", e));

        let request = WorkflowRequest::new_from_change_set(identity, changes, schema);
        self.store.upsert(&request).await.map_err(store_error)?;
        log::debug!(
            "Submitting workflow request {} with {} change(s) for user {}",
            request.wf_id,
            request.field_changes.len(),
            identity.user_id
        );

        self.updater.apply(&request).await.map_err(store_error)?;

        let stored = self
            .store
            .find_by_id(&request.wf_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                RowError::Store(format!("workflow request {} disappeared", request.wf_id))
            })?;

        if stored.state == WorkflowState::Rejected {
            return Err(RowError::SubmissionRejected);
        }
        Ok(stored)
    }
}
