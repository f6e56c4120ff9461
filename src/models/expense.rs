//! Expense model
//!
//! An expense records one purchase in a single currency. The category name is
//! denormalized onto the expense so reports and exports never need a join,
//! and the reference (`category_id`) is cleared when the category goes away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;
use super::currency::Currency;
use super::ids::{CategoryId, ExpenseId, UserId};
use super::money::Money;

/// Category name carried by expenses without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Longest description accepted, in characters
pub const MAX_DESCRIPTION_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,

    pub user_id: UserId,

    /// Always positive
    pub amount: Money,

    pub currency: Currency,

    pub description: String,

    /// Denormalized category name
    pub category: String,

    /// `None` when uncategorized
    pub category_id: Option<CategoryId>,

    /// When the money was spent
    pub date: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new uncategorized expense
    pub fn new(
        user_id: UserId,
        amount: Money,
        currency: Currency,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            user_id,
            amount,
            currency,
            description: description.into().trim().to_string(),
            category: UNCATEGORIZED.to_string(),
            category_id: None,
            date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Point this expense at a category, or clear it with `None`
    pub fn set_category(&mut self, category: Option<&Category>) {
        match category {
            Some(category) => {
                self.category = category.name.clone();
                self.category_id = Some(category.id);
            }
            None => self.uncategorize(),
        }
        self.updated_at = Utc::now();
    }

    /// Detach from any category
    pub fn uncategorize(&mut self) {
        self.category = UNCATEGORIZED.to_string();
        self.category_id = None;
        self.updated_at = Utc::now();
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount);
        }

        if self.description.is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }

        let len = self.description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(ExpenseValidationError::DescriptionTooLong(len));
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.category,
            self.amount.format_with_currency(self.currency)
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NonPositiveAmount,
    EmptyDescription,
    DescriptionTooLong(usize),
}

impl ExpenseValidationError {
    /// The request field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "amount",
            Self::EmptyDescription | Self::DescriptionTooLong(_) => "description",
        }
    }
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Amount must be greater than 0"),
            Self::EmptyDescription => write!(f, "Description cannot be empty"),
            Self::DescriptionTooLong(len) => write!(
                f,
                "Description too long ({} chars, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::DEFAULT_COLOR;
    use chrono::TimeZone;

    fn sample() -> Expense {
        Expense::new(
            UserId::new(),
            Money::from_cents(2500),
            Currency::Usd,
            " Lunch ",
            Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_expense_is_uncategorized() {
        let expense = sample();
        assert_eq!(expense.description, "Lunch");
        assert_eq!(expense.category, UNCATEGORIZED);
        assert!(expense.category_id.is_none());
    }

    #[test]
    fn test_set_and_clear_category() {
        let mut expense = sample();
        let food = Category::global("Food", DEFAULT_COLOR);

        expense.set_category(Some(&food));
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.category_id, Some(food.id));

        expense.uncategorize();
        assert_eq!(expense.category, UNCATEGORIZED);
        assert_eq!(expense.category_id, None);
    }

    #[test]
    fn test_validation() {
        let mut expense = sample();
        assert!(expense.validate().is_ok());

        expense.amount = Money::zero();
        assert_eq!(
            expense.validate(),
            Err(ExpenseValidationError::NonPositiveAmount)
        );

        expense.amount = Money::from_cents(100);
        expense.description = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert_eq!(expense.validate().unwrap_err().field(), "description");
    }

    #[test]
    fn test_display() {
        let mut expense = sample();
        expense.amount = Money::from_cents(123450);
        assert_eq!(
            expense.to_string(),
            "2025-01-10 Lunch (Uncategorized) USD 1,234.50"
        );
    }
}
