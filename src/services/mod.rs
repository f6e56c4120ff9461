//! Service layer for Spendwise
//!
//! Business rules on top of the storage layer: validation into field-level
//! errors, ownership checks, category cascades and budget uniqueness. Both
//! the HTTP handlers and the CLI go through these services.

pub mod budget;
pub mod category;
pub mod expense;
pub mod import;
pub mod user;

pub use budget::{BudgetChanges, BudgetService, NewBudget};
pub use category::{CategoryChanges, CategoryDeletion, CategoryService, NewCategory};
pub use expense::{ExpenseChanges, ExpenseFilter, ExpensePage, ExpenseService, NewExpense, Pagination};
pub use import::{ImportResult, ImportService};
pub use user::UserService;
