//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::bulk::types::SchemaChoice;
use crate::config::{Config, repository};

#[derive(Parser, Debug)]
#[command(name = "profile-bulk")]
#[command(about = "Bulk user-profile updates from spreadsheets")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to <config_dir>/profile-bulk/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process one uploaded file
    Process(ProcessArgs),
    /// Process trigger messages read line by line from stdin
    Consume,
    /// Show the persisted status of a batch
    Status(StatusArgs),
    /// Manage enumeration values used by validation
    #[command(subcommand)]
    MasterData(MasterDataCommands),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Uploading organisation id
    #[arg(long)]
    pub org: String,

    /// Batch identifier
    #[arg(long)]
    pub batch: String,

    /// File name inside the inbox directory
    #[arg(long)]
    pub file: String,

    /// Row layout of the file; defaults to the configured choice
    #[arg(long, value_enum)]
    pub schema: Option<SchemaArg>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[arg(long)]
    pub org: String,

    #[arg(long)]
    pub batch: String,
}

#[derive(Subcommand, Debug)]
pub enum MasterDataCommands {
    /// Add values to a category
    Add {
        /// Category, e.g. position or languages
        category: String,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Import `context_type,context_name` rows from a CSV file
    Import { path: PathBuf },
    /// List the values of a category
    List { category: String },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaArg {
    Standard,
    Compact,
    Auto,
}

impl From<SchemaArg> for SchemaChoice {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Standard => SchemaChoice::Standard,
            SchemaArg::Compact => SchemaChoice::Compact,
            SchemaArg::Auto => SchemaChoice::Auto,
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    let pool = repository::connect(&config.database.url)
        .await
        .context("Failed to open the database")?;

    match cli.command {
        Commands::Process(args) => {
            commands::process::handle_process_command(args, &config, pool).await
        }
        Commands::Consume => commands::consume::handle_consume_command(&config, pool).await,
        Commands::Status(args) => commands::status::handle_status_command(args, &pool).await,
        Commands::MasterData(command) => {
            commands::master_data::handle_master_data_command(command, &pool).await
        }
    }
}
