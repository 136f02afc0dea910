//! Run a single batch from command-line arguments

use anyhow::{Result, bail};
use colored::*;
use sqlx::SqlitePool;

use super::colored_status;
use crate::bulk::types::BatchStatus;
use crate::bulk::{BulkUploadProcessor, TriggerMessage};
use crate::cli::ProcessArgs;
use crate::config::Config;

pub async fn handle_process_command(
    args: ProcessArgs,
    config: &Config,
    pool: SqlitePool,
) -> Result<()> {
    let processor = BulkUploadProcessor::from_config(config, pool)?;
    let message = TriggerMessage {
        organization_id: args.org,
        batch_id: args.batch,
        file_name: args.file,
        row_schema: args.schema.map(Into::into),
    };

    println!(
        "Processing {} for {}...",
        message.file_name.cyan(),
        message.organization_id.bright_white().bold()
    );
    let job = processor.run(&message).await;

    println!(
        "Batch {}: {}  total {}  successful {}  failed {}",
        job.batch_id.cyan(),
        colored_status(Some(job.status)),
        job.total,
        job.successful.to_string().green(),
        job.failed.to_string().red()
    );

    if job.status != BatchStatus::Successful {
        bail!("Batch {} did not complete successfully", job.batch_id);
    }
    Ok(())
}
