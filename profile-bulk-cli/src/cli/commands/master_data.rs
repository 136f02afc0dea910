//! Enumeration master data maintenance

use anyhow::Result;
use colored::*;
use sqlx::SqlitePool;

use crate::cli::MasterDataCommands;
use crate::config::repository::master_data;

pub async fn handle_master_data_command(
    command: MasterDataCommands,
    pool: &SqlitePool,
) -> Result<()> {
    match command {
        MasterDataCommands::Add { category, values } => {
            let inserted = master_data::insert_values(pool, &category, &values).await?;
            println!(
                "Added {} new value(s) to {}",
                inserted.to_string().green(),
                category.cyan()
            );
        }
        MasterDataCommands::Import { path } => {
            let inserted = master_data::import_csv(pool, &path).await?;
            println!(
                "Imported {} new value(s) from {}",
                inserted.to_string().green(),
                path.display().to_string().cyan()
            );
        }
        MasterDataCommands::List { category } => {
            let values = master_data::values_for(pool, &category).await?;
            if values.is_empty() {
                println!("No values for {}", category.cyan());
            }
            for value in values {
                println!("{}", value);
            }
        }
    }
    Ok(())
}
