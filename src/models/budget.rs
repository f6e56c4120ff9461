//! Budget model
//!
//! A budget caps spending for one category (or overall, with no category)
//! in one UTC month. At most one budget exists per
//! (user, category, periodStart); [`BudgetKey`] is that identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;
use super::ids::{BudgetId, CategoryId, UserId};
use super::money::Money;
use super::period::MonthPeriod;

/// Category name carried by budgets that span all categories
pub const OVERALL_BUDGET: &str = "Overall";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: BudgetId,

    pub user_id: UserId,

    /// `None` for an overall budget
    pub category_id: Option<CategoryId>,

    /// Denormalized category name
    pub category: String,

    /// First instant of the budgeted month, UTC
    pub period_start: DateTime<Utc>,

    pub amount: Money,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Uniqueness key for budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BudgetKey {
    pub user_id: UserId,
    pub category_id: Option<CategoryId>,
    pub period: MonthPeriod,
}

impl Budget {
    /// Create a budget for a month
    pub fn new(
        user_id: UserId,
        category: Option<&Category>,
        period: MonthPeriod,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        let mut budget = Self {
            id: BudgetId::new(),
            user_id,
            category_id: None,
            category: OVERALL_BUDGET.to_string(),
            period_start: period.start(),
            amount,
            created_at: now,
            updated_at: now,
        };
        budget.assign_category(category);
        budget
    }

    /// The budgeted month
    pub fn period(&self) -> MonthPeriod {
        MonthPeriod::containing(self.period_start)
    }

    /// Move the budget to another month
    pub fn set_period(&mut self, period: MonthPeriod) {
        self.period_start = period.start();
        self.updated_at = Utc::now();
    }

    /// Point the budget at a category, or make it an overall budget
    pub fn set_category(&mut self, category: Option<&Category>) {
        self.assign_category(category);
        self.updated_at = Utc::now();
    }

    fn assign_category(&mut self, category: Option<&Category>) {
        match category {
            Some(category) => {
                self.category_id = Some(category.id);
                self.category = category.name.clone();
            }
            None => {
                self.category_id = None;
                self.category = OVERALL_BUDGET.to_string();
            }
        }
    }

    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
        self.updated_at = Utc::now();
    }

    pub fn key(&self) -> BudgetKey {
        BudgetKey {
            user_id: self.user_id,
            category_id: self.category_id,
            period: self.period(),
        }
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if !self.amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveAmount);
        }

        if self.period().start() != self.period_start {
            return Err(BudgetValidationError::PeriodNotCanonical(self.period_start));
        }

        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.period(), self.category, self.amount)
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NonPositiveAmount,
    PeriodNotCanonical(DateTime<Utc>),
}

impl BudgetValidationError {
    /// The request field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "amount",
            Self::PeriodNotCanonical(_) => "periodStart",
        }
    }
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Budget amount must be greater than 0"),
            Self::PeriodNotCanonical(start) => {
                write!(f, "Period start {} is not the first of a UTC month", start)
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}
