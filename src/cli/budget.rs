//! Budget CLI commands
//!
//! One budget per category per month; `set` creates it or changes the
//! amount of the existing one.

use clap::Subcommand;

use crate::display::format_budget_list;
use crate::error::{SpendError, SpendResult};
use crate::models::{BudgetId, BudgetKey, User};
use crate::services::{BudgetChanges, BudgetService, CategoryService, NewBudget};
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the budget for a category (or overall) in a month
    Set {
        /// Amount (e.g., "500" or "500.00")
        amount: String,
        /// Category name or ID; omit for the overall budget
        #[arg(short, long)]
        category: Option<String>,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List budgets
    List {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    user: &User,
    cmd: BudgetCommands,
) -> SpendResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Set {
            amount,
            category,
            month,
        } => {
            let amount = super::parse_amount(&amount)?;
            let period = super::parse_month(month.as_deref())?;
            let category = category
                .map(|c| CategoryService::new(storage).find(user.id, &c))
                .transpose()?;

            let key = BudgetKey {
                user_id: user.id,
                category_id: category.as_ref().map(|c| c.id),
                period,
            };

            let budget = match storage.budgets.find_by_key(&key)? {
                Some(existing) => service.update(
                    user.id,
                    existing.id,
                    BudgetChanges {
                        amount: Some(amount),
                        ..Default::default()
                    },
                )?,
                None => service.create(
                    user.id,
                    NewBudget {
                        amount,
                        category_id: category.map(|c| c.id),
                        category: None,
                        period_start: period.start(),
                    },
                )?,
            };

            println!(
                "Budget for {} in {}: {}",
                budget.category,
                budget.period(),
                budget.amount.format_grouped()
            );
        }

        BudgetCommands::List { month } => {
            let period = month
                .as_deref()
                .map(|m| super::parse_month(Some(m)))
                .transpose()?;
            let budgets = service.list(user.id, period)?;
            print!("{}", format_budget_list(&budgets));
        }

        BudgetCommands::Delete { id } => {
            let id: BudgetId = id
                .parse()
                .map_err(|_| SpendError::budget_not_found(id.clone()))?;
            let budget = service.delete(user.id, id)?;
            println!("Deleted budget: {}", budget);
        }
    }

    Ok(())
}
