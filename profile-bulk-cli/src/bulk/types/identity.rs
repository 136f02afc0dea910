//! Resolved users and the identity hints used to find them

use serde::{Deserialize, Serialize};

/// Directory attribute a row identifies its user by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityField {
    Email,
    Phone,
}

impl IdentityField {
    /// Filter key understood by the directory search
    pub fn key(&self) -> &'static str {
        match self {
            IdentityField::Email => "email",
            IdentityField::Phone => "phone",
        }
    }
}

/// A validated email or phone value, tried in row order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityHint {
    pub field: IdentityField,
    pub value: String,
}

impl IdentityHint {
    pub fn new(field: IdentityField, value: impl Into<String>) -> Self {
        IdentityHint {
            field,
            value: value.into(),
        }
    }
}

/// User found in the directory, valid for one row's processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub organization_id: String,
    pub department_name: String,
}

impl UserIdentity {
    /// Organisation ids are compared without regard to case
    pub fn belongs_to(&self, organization_id: &str) -> bool {
        self.organization_id.eq_ignore_ascii_case(organization_id)
    }
}
