pub mod consume;
pub mod master_data;
pub mod process;
pub mod status;

use colored::*;

use crate::bulk::types::BatchStatus;

/// Batch status colored for the terminal
pub(crate) fn colored_status(status: Option<BatchStatus>) -> ColoredString {
    match status {
        Some(BatchStatus::Successful) => status_text(status).bright_green().bold(),
        Some(BatchStatus::Failed) => status_text(status).bright_red().bold(),
        Some(BatchStatus::InProgress) => status_text(status).yellow(),
        _ => status_text(status).dimmed(),
    }
}

fn status_text(status: Option<BatchStatus>) -> &'static str {
    status.map(|s| s.as_str()).unwrap_or("UNKNOWN")
}
