//! Consume trigger messages from stdin

use anyhow::Result;
use colored::*;
use sqlx::SqlitePool;
use tokio::io::BufReader;

use crate::bulk::{BulkUploadProcessor, consume};
use crate::config::Config;

pub async fn handle_consume_command(config: &Config, pool: SqlitePool) -> Result<()> {
    let processor = BulkUploadProcessor::from_config(config, pool)?;
    let summary = consume(BufReader::new(tokio::io::stdin()), &processor).await?;

    println!(
        "Received {} message(s): {} processed, {} unreadable",
        summary.received,
        summary.processed.to_string().green(),
        summary.rejected.to_string().red()
    );
    Ok(())
}
