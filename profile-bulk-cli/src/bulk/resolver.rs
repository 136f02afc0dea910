//! User resolution against the external directory

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::error::RowError;
use super::types::{IdentityField, UserIdentity};
use crate::api::SearchResponse;

/// Query-by-attribute capability of the user directory
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn search(&self, field: IdentityField, value: &str) -> Result<SearchResponse>;
}

pub struct UserResolver {
    directory: Arc<dyn UserDirectory>,
}

impl UserResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// First user matching `field = value`.
    ///
    /// A non-OK response or an empty page is "not found"; a transport or
    /// parse failure is a row error.
    pub async fn resolve(
        &self,
        field: IdentityField,
        value: &str,
    ) -> Result<Option<UserIdentity>, RowError> {
        let response = self.directory.search(field, value).await.map_err(|e| {
            log::error!("Exception while fetching user details by {}: {:#}", field.key(), e);
            RowError::DirectoryLookup(format!("{:#}", e))
        })?;

        if !response.is_ok() {
            log::warn!(
                "Directory search by {} answered {}",
                field.key(),
                response.response_code
            );
            return Ok(None);
        }

        let Some(record) = response.content().first() else {
            return Ok(None);
        };

        let user_id = record
            .user_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RowError::DirectoryLookup("user record without userId".to_string()))?;

        Ok(Some(UserIdentity {
            user_id,
            organization_id: record.root_org_id.clone().unwrap_or_default(),
            department_name: record.channel.clone().unwrap_or_default(),
        }))
    }
}
