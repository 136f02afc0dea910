//! HTTP clients for the user directory and profile services

pub mod directory;
pub mod models;
pub mod profile;

pub use directory::HttpUserDirectory;
pub use models::{ProfileUpdateResponse, SearchResponse, UserRecord};
pub use profile::HttpProfileClient;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Client with a per-request timeout
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

/// Join a base url and an endpoint path without doubling the slash
pub(crate) fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// POST a JSON body and decode the JSON reply.
///
/// The body is decoded whatever the HTTP status, since both services report
/// failures through `responseCode`.
pub(crate) async fn post_json<B, R>(client: &reqwest::Client, url: &str, body: &B) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .with_context(|| format!("Failed to read response from {}", url))?;

    serde_json::from_str(&text).with_context(|| {
        let preview: String = text.chars().take(200).collect();
        format!("Unexpected response from {} ({}): {}", url, status, preview)
    })
}
