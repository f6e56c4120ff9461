//! Display formatting for terminal output
//!
//! Renders users, categories, expenses and budgets as `tabled` tables for the
//! CLI. Reports format themselves (see `reports`).

pub mod budget;
pub mod category;
pub mod expense;
pub mod user;

pub use budget::format_budget_list;
pub use category::{format_category_details, format_category_list};
pub use expense::{format_expense_details, format_expense_page};
pub use user::format_user_list;
