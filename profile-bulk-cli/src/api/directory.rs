//! User directory search client

use anyhow::Result;
use async_trait::async_trait;

use super::models::{SearchRequest, SearchResponse};
use super::{http_client, join_url, post_json};
use crate::bulk::resolver::UserDirectory;
use crate::bulk::types::IdentityField;
use crate::config::DirectoryConfig;

pub struct HttpUserDirectory {
    client: reqwest::Client,
    search_url: String,
}

impl HttpUserDirectory {
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            search_url: join_url(&config.base_url, &config.search_endpoint),
        })
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn search(&self, field: IdentityField, value: &str) -> Result<SearchResponse> {
        log::debug!("Searching directory by {}", field.key());
        post_json(&self.client, &self.search_url, &SearchRequest::by(field.key(), value)).await
    }
}
