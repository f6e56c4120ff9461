//! CLI command for exporting expenses

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::error::{SpendError, SpendResult};
use crate::export::export_expenses_csv;
use crate::models::{DateRange, User};
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Write expenses in a date range to a CSV file
    Csv {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// End date (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: String,
        /// Output file; defaults to expenses_<from>_<to>.csv in the working directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle an export command
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    user: &User,
    cmd: ExportCommands,
) -> SpendResult<()> {
    match cmd {
        ExportCommands::Csv { from, to, output } => {
            let range =
                DateRange::parse(&from, &to).map_err(|e| SpendError::Validation(e.to_string()))?;
            let export = export_expenses_csv(storage, user.id, range, settings.export_row_limit)?;

            let path = output.unwrap_or_else(|| PathBuf::from(&export.filename));
            std::fs::write(&path, export.body.as_bytes()).map_err(|e| {
                SpendError::Export(format!("Failed to write {}: {}", path.display(), e))
            })?;

            println!("Exported {} expense(s) to {}", export.rows, path.display());
        }
    }

    Ok(())
}
