//! Profile update side effect
//!
//! Settling a workflow request pushes its proposed values to the profile
//! service. The service's answer decides the request's terminal state, which
//! is persisted for the caller to read back.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::store::WorkflowStore;
use super::types::{WorkflowRequest, WorkflowState};
use crate::api::ProfileUpdateResponse;

#[async_trait]
pub trait ProfileClient: Send + Sync {
    /// Apply `profile_details` (`{category: {field: value}}`) to the user's profile
    async fn update_profile(
        &self,
        user_id: &str,
        profile_details: &JsonValue,
    ) -> Result<ProfileUpdateResponse>;
}

pub struct ProfileUpdater {
    client: Arc<dyn ProfileClient>,
    store: Arc<dyn WorkflowStore>,
}

impl ProfileUpdater {
    pub fn new(client: Arc<dyn ProfileClient>, store: Arc<dyn WorkflowStore>) -> Self {
        Self { client, store }
    }

    /// Push the request's values and persist it as APPROVED, or as REJECTED
    /// when the profile service refuses or cannot be reached.
    pub async fn apply(&self, request: &WorkflowRequest) -> Result<()> {
        let details = request.profile_details();
        let outcome = match self.client.update_profile(&request.user_id, &details).await {
            Ok(response) if response.is_ok() => WorkflowState::Approved,
            Ok(response) => {
                log::warn!(
                    "Profile update for workflow request {} rejected: {}",
                    request.wf_id,
                    response.error_message()
                );
                WorkflowState::Rejected
            }
            Err(e) => {
                log::error!(
                    "Profile update for workflow request {} failed: {:#}",
                    request.wf_id,
                    e
                );
                WorkflowState::Rejected
            }
        };

        let mut settled = WorkflowRequest::request_from_existing(request);
        settled.resolve(outcome);
        self.store.upsert(&settled).await
    }
}
