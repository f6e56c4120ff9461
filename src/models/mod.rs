//! Core data models for Spendwise
//!
//! One struct per collection (users, categories, expenses, budgets) plus the
//! value types they share: IDs, money, currency and calendar periods.

pub mod budget;
pub mod category;
pub mod currency;
pub mod expense;
pub mod ids;
pub mod money;
pub mod period;
pub mod user;

pub use budget::{Budget, BudgetKey, OVERALL_BUDGET};
pub use category::{Category, CategoryKind, DEFAULT_COLOR, GLOBAL_DEFAULTS};
pub use currency::Currency;
pub use expense::{Expense, UNCATEGORIZED};
pub use ids::{BudgetId, CategoryId, ExpenseId, UserId};
pub use money::Money;
pub use period::{DateRange, MonthPeriod};
pub use user::User;
