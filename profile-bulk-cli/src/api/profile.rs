//! Profile update client

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::models::{Envelope, ProfileUpdateRequest, ProfileUpdateResponse};
use super::{http_client, join_url, post_json};
use crate::bulk::profile::ProfileClient;
use crate::config::ProfileConfig;

pub struct HttpProfileClient {
    client: reqwest::Client,
    update_url: String,
}

impl HttpProfileClient {
    pub fn new(config: &ProfileConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            update_url: join_url(&config.base_url, &config.update_endpoint),
        })
    }
}

#[async_trait]
impl ProfileClient for HttpProfileClient {
    async fn update_profile(
        &self,
        user_id: &str,
        profile_details: &JsonValue,
    ) -> Result<ProfileUpdateResponse> {
        let body = Envelope {
            request: ProfileUpdateRequest {
                user_id: user_id.to_string(),
                profile_details: profile_details.clone(),
            },
        };
        post_json(&self.client, &self.update_url, &body).await
    }
}
