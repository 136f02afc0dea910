//! Trigger message consumption
//!
//! Messages arrive as newline-delimited JSON. Each one runs a batch to
//! completion and is then acknowledged, whatever the outcome; unreadable
//! messages are logged and acknowledged too.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::types::{BatchJob, SchemaChoice};

/// Request to process one uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMessage {
    #[serde(rename = "rootOrgId", alias = "organizationId")]
    pub organization_id: String,
    #[serde(rename = "identifier", alias = "batchId")]
    pub batch_id: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Row layout override for this file
    #[serde(rename = "rowSchema", default, skip_serializing_if = "Option::is_none")]
    pub row_schema: Option<SchemaChoice>,
}

impl TriggerMessage {
    pub fn parse(line: &str) -> Result<TriggerMessage> {
        serde_json::from_str(line).context("Failed to parse trigger message")
    }
}

/// Anything that can run a batch for a trigger. Never fails: the outcome is
/// carried by the returned job.
#[async_trait]
pub trait BatchRunner: Send + Sync {
    async fn run(&self, message: &TriggerMessage) -> BatchJob;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumeSummary {
    pub received: usize,
    pub processed: usize,
    pub rejected: usize,
}

/// Process every message from `reader` until end of input
pub async fn consume<R>(reader: R, runner: &dyn BatchRunner) -> Result<ConsumeSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = ConsumeSummary::default();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read trigger messages")?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.received += 1;

        match TriggerMessage::parse(line) {
            Ok(message) => {
                let job = runner.run(&message).await;
                summary.processed += 1;
                log::info!(
                    "Acknowledged trigger for batch {} of organisation {}: {}",
                    message.batch_id,
                    message.organization_id,
                    job.status
                );
            }
            Err(e) => {
                summary.rejected += 1;
                log::error!("{:#}; acknowledging message: {}", e, line);
            }
        }
    }

    Ok(summary)
}
