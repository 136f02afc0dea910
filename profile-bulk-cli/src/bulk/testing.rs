//! In-memory collaborators for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value as JsonValue, json};

use super::cache::EnumLookup;
use super::profile::ProfileClient;
use super::resolver::UserDirectory;
use super::store::{BatchStatusRecord, BatchStatusStore, BatchStatusUpdate, WorkflowStore};
use super::types::{
    ChangeSet, Field, FieldValue, IdentityField, RowSchema, UserIdentity, WorkflowRequest,
};
use crate::api::{ProfileUpdateResponse, SearchResponse};

pub fn identity(user_id: &str, organization_id: &str) -> UserIdentity {
    UserIdentity {
        user_id: user_id.to_string(),
        organization_id: organization_id.to_string(),
        department_name: "Revenue".to_string(),
    }
}

/// A waiting request proposing a single value
pub fn pending_request(user_id: &str, field: Field, value: &str) -> WorkflowRequest {
    pending_request_for(user_id, &[(field, value)])
}

pub fn pending_request_for(user_id: &str, values: &[(Field, &str)]) -> WorkflowRequest {
    let changes: ChangeSet = values
        .iter()
        .map(|(f, v)| (*f, FieldValue::Text(v.to_string())))
        .collect();
    WorkflowRequest::new_from_change_set(&identity(user_id, "org-1"), &changes, RowSchema::Standard)
}

pub struct FakeDirectory {
    users: Vec<(IdentityField, String, serde_json::Value)>,
    response_code: String,
    fail: bool,
    searches: Mutex<Vec<(IdentityField, String)>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            response_code: "OK".to_string(),
            fail: false,
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_user(
        mut self,
        field: IdentityField,
        value: &str,
        user_id: &str,
        organization_id: &str,
        department: &str,
    ) -> Self {
        self.users.push((
            field,
            value.to_string(),
            json!({ "userId": user_id, "rootOrgId": organization_id, "channel": department }),
        ));
        self
    }

    pub fn with_response_code(mut self, code: &str) -> Self {
        self.response_code = code.to_string();
        self
    }

    pub fn searches(&self) -> Vec<(IdentityField, String)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn search(&self, field: IdentityField, value: &str) -> Result<SearchResponse> {
        self.searches.lock().unwrap().push((field, value.to_string()));
        if self.fail {
            bail!("connection refused");
        }
        let content: Vec<JsonValue> = self
            .users
            .iter()
            .filter(|(f, v, _)| *f == field && v == value)
            .map(|(_, _, record)| record.clone())
            .collect();
        Ok(serde_json::from_value(json!({
            "responseCode": self.response_code,
            "result": { "response": { "count": content.len(), "content": content } }
        }))?)
    }
}

enum ProfileMode {
    Accept,
    Reject,
    Fail,
    /// Reject updates touching the given profile key
    RejectKey(String),
}

pub struct FakeProfileClient {
    mode: ProfileMode,
    calls: Mutex<Vec<(String, JsonValue)>>,
}

impl FakeProfileClient {
    fn with_mode(mode: ProfileMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting() -> Self {
        Self::with_mode(ProfileMode::Accept)
    }

    pub fn rejecting() -> Self {
        Self::with_mode(ProfileMode::Reject)
    }

    pub fn failing() -> Self {
        Self::with_mode(ProfileMode::Fail)
    }

    pub fn rejecting_key(key: &str) -> Self {
        Self::with_mode(ProfileMode::RejectKey(key.to_string()))
    }

    pub fn calls(&self) -> Vec<(String, JsonValue)> {
        self.calls.lock().unwrap().clone()
    }
}

fn touches_key(details: &JsonValue, key: &str) -> bool {
    details
        .as_object()
        .is_some_and(|sections| sections.values().any(|s| s.get(key).is_some()))
}

#[async_trait]
impl ProfileClient for FakeProfileClient {
    async fn update_profile(
        &self,
        user_id: &str,
        profile_details: &JsonValue,
    ) -> Result<ProfileUpdateResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((user_id.to_string(), profile_details.clone()));
        let rejected = ProfileUpdateResponse {
            response_code: "CLIENT_ERROR".to_string(),
            params: None,
        };
        match &self.mode {
            ProfileMode::Accept => Ok(ProfileUpdateResponse::accepted()),
            ProfileMode::Reject => Ok(rejected),
            ProfileMode::Fail => bail!("profile service unavailable"),
            ProfileMode::RejectKey(key) if touches_key(profile_details, key) => Ok(rejected),
            ProfileMode::RejectKey(_) => Ok(ProfileUpdateResponse::accepted()),
        }
    }
}

#[derive(Default)]
pub struct MemoryWorkflowStore {
    requests: Mutex<Vec<WorkflowRequest>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<WorkflowRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn find_pending(&self, user_id: &str) -> Result<Vec<WorkflowRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.in_workflow)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, wf_id: &str) -> Result<Option<WorkflowRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.wf_id == wf_id)
            .cloned())
    }

    async fn upsert(&self, request: &WorkflowRequest) -> Result<()> {
        let mut requests = self.requests.lock().unwrap();
        match requests.iter_mut().find(|r| r.wf_id == request.wf_id) {
            Some(existing) => *existing = request.clone(),
            None => requests.push(request.clone()),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBatchStatusStore {
    records: Mutex<HashMap<(String, String), BatchStatusRecord>>,
    updates: Mutex<Vec<BatchStatusUpdate>>,
}

impl MemoryBatchStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update received, in order
    pub fn updates(&self) -> Vec<BatchStatusUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchStatusStore for MemoryBatchStatusStore {
    async fn update_status(
        &self,
        organization_id: &str,
        batch_id: &str,
        update: &BatchStatusUpdate,
    ) -> Result<()> {
        self.updates.lock().unwrap().push(update.clone());
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry((organization_id.to_string(), batch_id.to_string()))
            .or_insert_with(|| BatchStatusRecord {
                organization_id: organization_id.to_string(),
                batch_id: batch_id.to_string(),
                status: None,
                total: 0,
                successful: 0,
                failed: 0,
                updated_on: Utc::now(),
            });
        record.status = update.status.or(record.status);
        record.total = update.total.unwrap_or(record.total);
        record.successful = update.successful.unwrap_or(record.successful);
        record.failed = update.failed.unwrap_or(record.failed);
        record.updated_on = Utc::now();
        Ok(())
    }

    async fn get_status(
        &self,
        organization_id: &str,
        batch_id: &str,
    ) -> Result<Option<BatchStatusRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(organization_id.to_string(), batch_id.to_string()))
            .cloned())
    }
}

/// Fixed enumeration sets
#[derive(Default)]
pub struct StaticEnums {
    values: HashMap<String, Arc<HashSet<String>>>,
}

impl StaticEnums {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: &str, values: &[&str]) -> Self {
        self.values.insert(
            category.to_string(),
            Arc::new(values.iter().map(|v| v.to_string()).collect()),
        );
        self
    }
}

#[async_trait]
impl EnumLookup for StaticEnums {
    async fn get(&self, category: &str) -> Arc<HashSet<String>> {
        self.values.get(category).cloned().unwrap_or_default()
    }
}
