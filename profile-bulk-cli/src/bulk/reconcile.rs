//! Pending workflow reconciliation
//!
//! Before a row's proposals are submitted, every request of the same user
//! that is still awaiting approval is settled against them. A request is
//! only considered through the fields of its first change's target map, in
//! key order, that the row still proposes:
//!
//! - a field carrying the same value (ignoring case) APPROVES the request and
//!   pushes it to the profile service;
//! - a field carrying another value REJECTS it and nothing is pushed;
//! - the last field examined decides where the request ends up;
//! - requests sharing no field with the row stay pending.
//!
//! Every examined field is dropped from the change set at once, so a later
//! request waiting on the same field no longer sees it and stays pending.

use std::sync::Arc;

use super::error::RowError;
use super::profile::ProfileUpdater;
use super::store::WorkflowStore;
use super::types::{ChangeSet, Field, WorkflowRequest, WorkflowState};

/// What reconciliation did for one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Ids of requests approved by this row
    pub approved: Vec<String>,
    /// Ids of requests rejected by this row
    pub rejected: Vec<String>,
    /// Fields removed from the change set
    pub resolved_fields: Vec<Field>,
    /// An approved request was refused by the profile service
    pub update_failed: bool,
}

pub struct PendingReconciler {
    store: Arc<dyn WorkflowStore>,
    updater: Arc<ProfileUpdater>,
}

fn store_error(e: anyhow::Error) -> RowError {
    RowError::Store(format!("{:#}", e))
}

impl PendingReconciler {
    pub fn new(store: Arc<dyn WorkflowStore>, updater: Arc<ProfileUpdater>) -> Self {
        Self { store, updater }
    }

    pub async fn reconcile(
        &self,
        user_id: &str,
        changes: &mut ChangeSet,
    ) -> Result<Reconciliation, RowError> {
        let pending = self.store.find_pending(user_id).await.map_err(store_error)?;
        let mut outcome = Reconciliation::default();
        if pending.is_empty() {
            return Ok(outcome);
        }

        for request in &pending {
            let Some(targets) = request.pending_targets() else {
                continue;
            };
            let mut keys: Vec<&String> = targets.keys().collect();
            keys.sort();

            let mut decision = None;
            for key in keys {
                let Some(field) = Field::from_key(key) else {
                    continue;
                };
                let Some(value) = changes.get(field) else {
                    continue;
                };

                if value.matches_ignore_case(&targets[key]) {
                    if self.approve(request).await? {
                        outcome.update_failed = true;
                    }
                    decision = Some(WorkflowState::Approved);
                } else {
                    self.reject(request).await?;
                    decision = Some(WorkflowState::Rejected);
                }

                changes.remove_key(key);
                outcome.resolved_fields.push(field);
            }

            match decision {
                Some(WorkflowState::Approved) => outcome.approved.push(request.wf_id.clone()),
                Some(_) => outcome.rejected.push(request.wf_id.clone()),
                None => {}
            }
        }

        log::info!(
            "Reconciled {} pending request(s) for user {}: {} approved, {} rejected",
            pending.len(),
            user_id,
            outcome.approved.len(),
            outcome.rejected.len()
        );
        Ok(outcome)
    }

    /// Approve and push to the profile service. Returns true when the
    /// profile service refused the update.
    async fn approve(&self, request: &WorkflowRequest) -> Result<bool, RowError> {
        let mut approved = WorkflowRequest::request_from_existing(request);
        approved.resolve(WorkflowState::Approved);
        self.store.upsert(&approved).await.map_err(store_error)?;

        self.updater.apply(&approved).await.map_err(store_error)?;

        let settled = self
            .store
            .find_by_id(&approved.wf_id)
            .await
            .map_err(store_error)?;
        let refused = matches!(settled, Some(r) if r.state == WorkflowState::Rejected);
        if refused {
            log::warn!(
                "Pending request {} matched the upload but the profile update was rejected",
                approved.wf_id
            );
        }
        Ok(refused)
    }

    async fn reject(&self, request: &WorkflowRequest) -> Result<(), RowError> {
        let mut rejected = WorkflowRequest::request_from_existing(request);
        rejected.resolve(WorkflowState::Rejected);
        self.store.upsert(&rejected).await.map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::testing::{
        FakeProfileClient, MemoryWorkflowStore, pending_request, pending_request_for,
    };
    use crate::bulk::types::{FieldChange, FieldValue};
    use serde_json::{Map, json};

    struct Harness {
        store: Arc<MemoryWorkflowStore>,
        client: Arc<FakeProfileClient>,
        reconciler: PendingReconciler,
    }

    fn harness(client: FakeProfileClient) -> Harness {
        let store = Arc::new(MemoryWorkflowStore::new());
        let client = Arc::new(client);
        let updater = Arc::new(ProfileUpdater::new(client.clone(), store.clone()));
        Harness {
            reconciler: PendingReconciler::new(store.clone(), updater),
            store,
            client,
        }
    }

    fn proposals(values: &[(Field, &str)]) -> ChangeSet {
        values
            .iter()
            .map(|(f, v)| (*f, FieldValue::Text(v.to_string())))
            .collect()
    }

    async fn state_of(store: &MemoryWorkflowStore, wf_id: &str) -> WorkflowRequest {
        store.find_by_id(wf_id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_no_pending_requests_is_noop() {
        let h = harness(FakeProfileClient::accepting());
        let mut changes = proposals(&[(Field::Designation, "Clerk")]);
        let before = changes.clone();

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome, Reconciliation::default());
        assert_eq!(changes, before);
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_matching_value_approves_ignoring_case() {
        let h = harness(FakeProfileClient::accepting());
        let pending = pending_request("u-1", Field::Gender, "Female");
        h.store.upsert(&pending).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "FEMALE")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome.approved, vec![pending.wf_id.clone()]);
        assert_eq!(outcome.resolved_fields, vec![Field::Gender]);
        assert!(!outcome.update_failed);
        assert!(changes.is_empty());

        let stored = state_of(&h.store, &pending.wf_id).await;
        assert_eq!(stored.state, WorkflowState::Approved);
        assert!(!stored.in_workflow);
        assert_eq!(h.client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_different_value_rejects_without_update() {
        let h = harness(FakeProfileClient::accepting());
        let pending = pending_request("u-1", Field::Gender, "Female");
        h.store.upsert(&pending).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "Male"), (Field::Designation, "Clerk")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome.rejected, vec![pending.wf_id.clone()]);
        assert_eq!(changes.fields(), vec![Field::Designation]);
        assert_eq!(state_of(&h.store, &pending.wf_id).await.state, WorkflowState::Rejected);
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unrelated_request_stays_pending() {
        let h = harness(FakeProfileClient::accepting());
        let pending = pending_request("u-1", Field::Group, "Group A");
        h.store.upsert(&pending).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "Male")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome, Reconciliation::default());
        assert_eq!(changes.len(), 1);
        let stored = state_of(&h.store, &pending.wf_id).await;
        assert!(stored.in_workflow);
        assert_eq!(stored.state, WorkflowState::SendForApproval);
    }

    #[tokio::test]
    async fn test_only_first_change_is_considered() {
        let h = harness(FakeProfileClient::accepting());
        // first change is the designation, the gender change is not awaited
        let pending = pending_request_for("u-1", &[(Field::Designation, "Clerk"), (Field::Gender, "Female")]);
        h.store.upsert(&pending).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "Female")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome, Reconciliation::default());
        assert_eq!(changes.len(), 1);
    }

    #[tokio::test]
    async fn test_refused_profile_update_flags_row() {
        let h = harness(FakeProfileClient::rejecting());
        let pending = pending_request("u-1", Field::Gender, "Female");
        h.store.upsert(&pending).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "Female")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert!(outcome.update_failed);
        assert_eq!(outcome.approved, vec![pending.wf_id.clone()]);
        assert!(changes.is_empty());
        let stored = state_of(&h.store, &pending.wf_id).await;
        assert_eq!(stored.state, WorkflowState::Rejected);
        assert!(!stored.in_workflow);
    }

    #[tokio::test]
    async fn test_settled_field_hides_later_requests() {
        let h = harness(FakeProfileClient::accepting());
        let older = pending_request("u-1", Field::Gender, "Female");
        let newer = pending_request("u-1", Field::Gender, "Female");
        h.store.upsert(&older).await.unwrap();
        h.store.upsert(&newer).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "Female")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome.approved, vec![older.wf_id.clone()]);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.resolved_fields, vec![Field::Gender]);
        assert!(changes.is_empty());
        assert_eq!(h.client.calls().len(), 1);

        let stored = state_of(&h.store, &newer.wf_id).await;
        assert!(stored.in_workflow);
        assert_eq!(stored.state, WorkflowState::SendForApproval);
    }

    #[tokio::test]
    async fn test_rejection_also_hides_the_field() {
        let h = harness(FakeProfileClient::accepting());
        let older = pending_request("u-1", Field::Gender, "Male");
        let newer = pending_request("u-1", Field::Gender, "Female");
        h.store.upsert(&older).await.unwrap();
        h.store.upsert(&newer).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "Female")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome.rejected, vec![older.wf_id.clone()]);
        assert!(outcome.approved.is_empty());
        assert!(changes.is_empty());
        assert!(h.client.calls().is_empty());
        assert!(state_of(&h.store, &newer.wf_id).await.in_workflow);
    }

    fn two_field_request(gender: &str, designation: &str) -> WorkflowRequest {
        let mut pending = pending_request("u-1", Field::Gender, gender);
        let mut targets = Map::new();
        targets.insert("gender".into(), json!(gender));
        targets.insert("designation".into(), json!(designation));
        pending.field_changes = vec![FieldChange {
            category: crate::bulk::types::FieldCategory::Personal,
            from_value: Map::new(),
            to_value: targets,
        }];
        pending
    }

    #[tokio::test]
    async fn test_each_overlapping_field_decides_in_turn() {
        // designation is examined before gender; the matching gender wins
        let h = harness(FakeProfileClient::accepting());
        let pending = two_field_request("Female", "Clerk");
        h.store.upsert(&pending).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "Female"), (Field::Designation, "Typist")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome.approved, vec![pending.wf_id.clone()]);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.resolved_fields, vec![Field::Designation, Field::Gender]);
        assert!(changes.is_empty());
        assert_eq!(h.client.calls().len(), 1);
        assert_eq!(state_of(&h.store, &pending.wf_id).await.state, WorkflowState::Approved);
    }

    #[tokio::test]
    async fn test_last_differing_field_rejects() {
        let h = harness(FakeProfileClient::accepting());
        let pending = two_field_request("Female", "Clerk");
        h.store.upsert(&pending).await.unwrap();
        let mut changes = proposals(&[(Field::Gender, "Male"), (Field::Designation, "clerk")]);

        let outcome = h.reconciler.reconcile("u-1", &mut changes).await.unwrap();

        assert_eq!(outcome.rejected, vec![pending.wf_id.clone()]);
        assert!(outcome.approved.is_empty());
        // the matching designation still pushed the request once
        assert_eq!(h.client.calls().len(), 1);
        assert_eq!(state_of(&h.store, &pending.wf_id).await.state, WorkflowState::Rejected);
    }

    #[tokio::test]
    async fn test_closed_requests_are_not_selected_again() {
        let h = harness(FakeProfileClient::accepting());
        let pending = pending_request("u-1", Field::Gender, "Female");
        h.store.upsert(&pending).await.unwrap();

        let mut first = proposals(&[(Field::Gender, "Female")]);
        h.reconciler.reconcile("u-1", &mut first).await.unwrap();

        let mut second = proposals(&[(Field::Gender, "Male")]);
        let outcome = h.reconciler.reconcile("u-1", &mut second).await.unwrap();

        assert_eq!(outcome, Reconciliation::default());
        assert_eq!(second.len(), 1);
        assert_eq!(state_of(&h.store, &pending.wf_id).await.state, WorkflowState::Approved);
        assert_eq!(h.client.calls().len(), 1);
    }
}
