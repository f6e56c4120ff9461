//! Expense CLI commands
//!
//! Record, list, edit and delete expenses, and bulk-import them from CSV.

use std::fs::File;
use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_page};
use crate::error::{SpendError, SpendResult};
use crate::models::period::parse_instant;
use crate::models::{Currency, DateRange, ExpenseId, User};
use crate::services::{
    CategoryService, ExpenseChanges, ExpenseFilter, ExpenseService, ImportService, NewExpense,
    Pagination,
};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Amount (e.g., "12.50" or "1,200")
        amount: String,
        /// What the money was spent on
        description: String,
        /// Currency (USD or NGN)
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Date (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List expenses, newest first
    List {
        /// Start date (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// End date (YYYY-MM-DD), inclusive
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Only this category (name or ID)
        #[arg(short, long)]
        category: Option<String>,
        /// Only this currency
        #[arg(long)]
        currency: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: usize,
        /// Expenses per page
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show expense details
    Show {
        /// Expense ID
        id: String,
    },

    /// Edit an expense
    Edit {
        /// Expense ID
        id: String,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New currency
        #[arg(long)]
        currency: Option<String>,
        /// New category name or ID
        #[arg(short, long, conflicts_with = "uncategorize")]
        category: Option<String>,
        /// Clear the category
        #[arg(long)]
        uncategorize: bool,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,
    },

    /// Import expenses from a CSV file
    ///
    /// Expected headers: date,description,category,amount,currency
    Import {
        /// Path to CSV file
        file: PathBuf,
    },
}

fn parse_currency(raw: &str) -> SpendResult<Currency> {
    raw.parse().map_err(SpendError::Validation)
}

fn parse_date(raw: &str) -> SpendResult<chrono::DateTime<chrono::Utc>> {
    parse_instant(raw)
        .ok_or_else(|| SpendError::Validation(format!("Invalid date '{}': use YYYY-MM-DD", raw)))
}

fn parse_expense_id(raw: &str) -> SpendResult<ExpenseId> {
    raw.parse()
        .map_err(|_| SpendError::expense_not_found(raw))
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    user: &User,
    cmd: ExpenseCommands,
) -> SpendResult<()> {
    let service = ExpenseService::new(storage);
    let categories = CategoryService::new(storage);

    match cmd {
        ExpenseCommands::Add {
            amount,
            description,
            currency,
            category,
            date,
        } => {
            let input = NewExpense {
                amount: super::parse_amount(&amount)?,
                currency: parse_currency(&currency)?,
                description,
                category_id: None,
                category: category
                    .map(|c| categories.find(user.id, &c).map(|c| c.name))
                    .transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
            };
            let expense = service.create(user.id, input)?;
            println!("Recorded: {}", expense);
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::List {
            from,
            to,
            category,
            currency,
            page,
            limit,
        } => {
            let range = match (from, to) {
                (Some(from), Some(to)) => Some(
                    DateRange::parse(&from, &to)
                        .map_err(|e| SpendError::Validation(e.to_string()))?,
                ),
                _ => None,
            };
            let filter = ExpenseFilter {
                range,
                category_id: category
                    .map(|c| categories.find(user.id, &c).map(|c| c.id))
                    .transpose()?,
                currency: currency.as_deref().map(parse_currency).transpose()?,
            };
            let pagination = Pagination::new(Some(page), Some(limit))?;
            let page = service.list(user.id, &filter, pagination)?;
            print!("{}", format_expense_page(&page, &settings.date_format));
        }

        ExpenseCommands::Show { id } => {
            let expense = service.get(user.id, parse_expense_id(&id)?)?;
            print!("{}", format_expense_details(&expense));
        }

        ExpenseCommands::Edit {
            id,
            amount,
            description,
            currency,
            category,
            uncategorize,
            date,
        } => {
            let id = parse_expense_id(&id)?;

            let category_id = if uncategorize {
                Some(None)
            } else {
                category
                    .map(|c| categories.find(user.id, &c).map(|c| Some(c.id)))
                    .transpose()?
            };

            let changes = ExpenseChanges {
                amount: amount.as_deref().map(super::parse_amount).transpose()?,
                currency: currency.as_deref().map(parse_currency).transpose()?,
                description,
                category_id,
                category: None,
                date: date.as_deref().map(parse_date).transpose()?,
            };

            let expense = service.update(user.id, id, changes)?;
            println!("Updated: {}", expense);
        }

        ExpenseCommands::Delete { id } => {
            let expense = service.delete(user.id, parse_expense_id(&id)?)?;
            println!("Deleted: {}", expense);
        }

        ExpenseCommands::Import { file } => {
            let source = File::open(&file).map_err(|e| {
                SpendError::Import(format!("Failed to open {}: {}", file.display(), e))
            })?;
            let result = ImportService::new(storage).import_csv(user.id, source)?;

            println!("Imported {} expense(s)", result.imported.len());
            if result.duplicates_skipped > 0 {
                println!("Skipped {} duplicate(s)", result.duplicates_skipped);
            }
            if !result.errors.is_empty() {
                println!("{} row(s) failed:", result.errors.len());
                for (row, message) in &result.errors {
                    println!("  row {}: {}", row, message);
                }
            }
        }
    }

    Ok(())
}
