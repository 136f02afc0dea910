//! Print a batch's persisted status

use anyhow::Result;
use colored::*;
use sqlx::SqlitePool;

use super::colored_status;
use crate::cli::StatusArgs;
use crate::config::repository::batch_status;

pub async fn handle_status_command(args: StatusArgs, pool: &SqlitePool) -> Result<()> {
    let Some(record) = batch_status::get_status(pool, &args.org, &args.batch).await? else {
        println!(
            "No status recorded for batch {} of {}",
            args.batch.cyan(),
            args.org.cyan()
        );
        return Ok(());
    };

    println!("Batch:      {}", record.batch_id.cyan());
    println!("Org:        {}", record.organization_id);
    println!("Status:     {}", colored_status(record.status));
    println!("Total:      {}", record.total);
    println!("Successful: {}", record.successful.to_string().green());
    println!("Failed:     {}", record.failed.to_string().red());
    println!(
        "Updated:    {}",
        record.updated_on.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
    );
    Ok(())
}
