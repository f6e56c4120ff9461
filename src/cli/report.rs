//! CLI commands for reports

use clap::Subcommand;

use crate::config::Settings;
use crate::error::{SpendError, SpendResult};
use crate::models::{DateRange, MonthPeriod, User};
use crate::reports::{CategoryReport, MonthlyReport, TrendReport};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Month-by-month spending per currency
    Trends {
        /// Number of months, ending with the current one (1-24)
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Spending by category for a date range
    Categories {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// End date (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: String,
    },

    /// Totals, averages and top categories for one month
    Monthly {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    user: &User,
    cmd: ReportCommands,
) -> SpendResult<()> {
    match cmd {
        ReportCommands::Trends { months } => {
            let months = months.unwrap_or(settings.default_trend_months);
            let report = TrendReport::generate(storage, user.id, months, MonthPeriod::current())?;
            print!("{}", report.format_terminal());
        }

        ReportCommands::Categories { from, to } => {
            let range =
                DateRange::parse(&from, &to).map_err(|e| SpendError::Validation(e.to_string()))?;
            let report = CategoryReport::generate(storage, user.id, range)?;
            print!("{}", report.format_terminal());
        }

        ReportCommands::Monthly { month } => {
            let period = super::parse_month(month.as_deref())?;
            let report = MonthlyReport::generate(storage, user.id, period)?;
            print!("{}", report.format_terminal());
        }
    }

    Ok(())
}
