//! Approval workflow requests
//!
//! A request proposes one or more field changes for a user. While it waits
//! for approval `in_workflow` is true and the state is `SendForApproval` or
//! `Pending`; resolving it clears the flag and moves it to `Approved` or
//! `Rejected`. Requests are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use super::change_set::ChangeSet;
use super::field::FieldCategory;
use super::identity::UserIdentity;
use super::schema::RowSchema;

/// Service name recorded on profile workflow requests
pub const PROFILE_SERVICE_NAME: &str = "profile";

/// Comment recorded on requests raised by a bulk upload
pub const BULK_UPDATE_COMMENT: &str = "bulk update";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    SendForApproval,
    Pending,
    Approved,
    Rejected,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::SendForApproval => "SEND_FOR_APPROVAL",
            WorkflowState::Pending => "PENDING",
            WorkflowState::Approved => "APPROVED",
            WorkflowState::Rejected => "REJECTED",
        }
    }

    /// Parse a stored state name (case-insensitive)
    pub fn parse(s: &str) -> Option<WorkflowState> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SEND_FOR_APPROVAL" => Some(WorkflowState::SendForApproval),
            "PENDING" => Some(WorkflowState::Pending),
            "APPROVED" => Some(WorkflowState::Approved),
            "REJECTED" => Some(WorkflowState::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Approved | WorkflowState::Rejected)
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One proposed change inside a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(rename = "fieldKey")]
    pub category: FieldCategory,
    #[serde(rename = "fromValue", default)]
    pub from_value: Map<String, JsonValue>,
    #[serde(rename = "toValue", default)]
    pub to_value: Map<String, JsonValue>,
}

/// A persisted approval proposal
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRequest {
    pub wf_id: String,
    pub application_id: String,
    pub user_id: String,
    pub root_org: String,
    pub dept_name: String,
    pub state: WorkflowState,
    pub in_workflow: bool,
    pub service_name: String,
    pub actor_user_id: String,
    pub comment: String,
    pub field_changes: Vec<FieldChange>,
    pub created_on: DateTime<Utc>,
    pub last_updated_on: DateTime<Utc>,
}

impl WorkflowRequest {
    /// Build a fresh request proposing every entry of `changes`, one
    /// `FieldChange` per field, classified by the row layout.
    pub fn new_from_change_set(
        identity: &UserIdentity,
        changes: &ChangeSet,
        schema: RowSchema,
    ) -> Self {
        let now = Utc::now();
        let field_changes = changes
            .iter()
            .map(|(field, value)| {
                let mut to_value = Map::new();
                to_value.insert(field.key().to_string(), value.to_json());
                FieldChange {
                    category: schema.classify(field.key()),
                    from_value: Map::new(),
                    to_value,
                }
            })
            .collect();

        WorkflowRequest {
            wf_id: Uuid::new_v4().to_string(),
            application_id: identity.user_id.clone(),
            user_id: identity.user_id.clone(),
            root_org: identity.organization_id.clone(),
            dept_name: identity.department_name.clone(),
            state: WorkflowState::SendForApproval,
            in_workflow: true,
            service_name: PROFILE_SERVICE_NAME.to_string(),
            actor_user_id: String::new(),
            comment: BULK_UPDATE_COMMENT.to_string(),
            field_changes,
            created_on: now,
            last_updated_on: now,
        }
    }

    /// Build the submission for an already persisted request, carrying its
    /// identifiers, state and proposed changes.
    pub fn request_from_existing(existing: &WorkflowRequest) -> Self {
        WorkflowRequest {
            last_updated_on: Utc::now(),
            ..existing.clone()
        }
    }

    /// Fields the request is waiting to confirm: the first change's target map
    pub fn pending_targets(&self) -> Option<&Map<String, JsonValue>> {
        self.field_changes.first().map(|c| &c.to_value)
    }

    /// Close the request with a terminal state
    pub fn resolve(&mut self, state: WorkflowState) {
        debug_assert!(state.is_terminal());
        self.state = state;
        self.in_workflow = false;
        self.last_updated_on = Utc::now();
    }

    /// Proposed values grouped by profile section:
    /// `{ "personalDetails": { "gender": "Female" }, ... }`
    pub fn profile_details(&self) -> JsonValue {
        let mut sections: Map<String, JsonValue> = Map::new();
        for change in &self.field_changes {
            let section = sections
                .entry(change.category.as_str().to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if let JsonValue::Object(obj) = section {
                for (key, value) in &change.to_value {
                    obj.insert(key.clone(), value.clone());
                }
            }
        }
        JsonValue::Object(sections)
    }
}
