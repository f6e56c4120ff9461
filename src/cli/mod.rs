//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod category;
pub mod expense;
pub mod export;
pub mod report;
pub mod user;

pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use report::{handle_report_command, ReportCommands};
pub use user::{handle_user_command, UserCommands};

use crate::error::{SpendError, SpendResult};
use crate::models::{Money, MonthPeriod, User};
use crate::services::UserService;
use crate::storage::Storage;

/// Pick the user a command acts for
///
/// An explicit email wins. Without one, a store with exactly one user uses
/// that user.
pub fn resolve_user(storage: &Storage, email: Option<&str>) -> SpendResult<User> {
    let service = UserService::new(storage);
    if let Some(email) = email {
        return service.find_by_email(email);
    }

    let mut users = service.list()?;
    match users.len() {
        1 => Ok(users.remove(0)),
        0 => Err(SpendError::Validation(
            "No users yet. Create one with 'spendwise user add <name> <email>'".into(),
        )),
        _ => Err(SpendError::Validation(
            "Several users exist; choose one with --user <email>".into(),
        )),
    }
}

/// Parse a positive amount argument
pub(crate) fn parse_amount(raw: &str) -> SpendResult<Money> {
    let amount = Money::parse(raw)
        .map_err(|e| SpendError::Validation(format!("Invalid amount: {}", e)))?;
    if !amount.is_positive() {
        return Err(SpendError::Validation("Amount must be greater than 0".into()));
    }
    Ok(amount)
}

/// Parse an optional `YYYY-MM` argument, defaulting to the current month
pub(crate) fn parse_month(raw: Option<&str>) -> SpendResult<MonthPeriod> {
    match raw {
        Some(raw) => MonthPeriod::parse(raw).map_err(|e| SpendError::Validation(e.to_string())),
        None => Ok(MonthPeriod::current()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_resolve_user() {
        let (_temp_dir, storage) = create_test_storage();
        assert!(resolve_user(&storage, None).is_err());

        let ada = UserService::new(&storage).create("Ada", "ada@example.com").unwrap();
        assert_eq!(resolve_user(&storage, None).unwrap().id, ada.id);

        UserService::new(&storage).create("Bob", "bob@example.com").unwrap();
        assert!(resolve_user(&storage, None).is_err());
        assert_eq!(
            resolve_user(&storage, Some("ADA@example.com")).unwrap().id,
            ada.id
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.50").unwrap().cents(), 123450);
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("10.999").is_err());
        assert!(parse_amount("1.5€").is_err());
    }
}
