//! Reports module for Spendwise
//!
//! Aggregations over one user's expenses: a month-by-month trend series, a
//! per-category breakdown for a date range and a single-month summary.
//! USD and NGN are always totalled separately; the "combined" total adds the
//! two numerically and only ever drives ordering.

pub mod categories;
pub mod monthly;
pub mod trends;

use serde::Serialize;

pub use categories::{CategoryReport, CategoryTotals};
pub use monthly::{CurrencySummary, MonthlyReport};
pub use trends::{TrendBucket, TrendReport, DEFAULT_TREND_MONTHS, MAX_TREND_MONTHS};

use crate::models::{Currency, Expense, Money};

/// Sum and count for one currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyTotal {
    pub total: Money,
    pub count: usize,
}

impl CurrencyTotal {
    fn add(&mut self, amount: Money) {
        self.total += amount;
        self.count += 1;
    }
}

/// Totals for both supported currencies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerCurrency {
    #[serde(rename = "USD")]
    pub usd: CurrencyTotal,
    #[serde(rename = "NGN")]
    pub ngn: CurrencyTotal,
}

impl PerCurrency {
    pub fn add(&mut self, expense: &Expense) {
        self.get_mut(expense.currency).add(expense.amount);
    }

    pub fn get(&self, currency: Currency) -> CurrencyTotal {
        match currency {
            Currency::Usd => self.usd,
            Currency::Ngn => self.ngn,
        }
    }

    fn get_mut(&mut self, currency: Currency) -> &mut CurrencyTotal {
        match currency {
            Currency::Usd => &mut self.usd,
            Currency::Ngn => &mut self.ngn,
        }
    }

    /// USD and NGN added without conversion
    pub fn combined(&self) -> Money {
        self.usd.total + self.ngn.total
    }

    pub fn count(&self) -> usize {
        self.usd.count + self.ngn.count
    }
}

impl<'a> FromIterator<&'a Expense> for PerCurrency {
    fn from_iter<I: IntoIterator<Item = &'a Expense>>(iter: I) -> Self {
        let mut totals = Self::default();
        for expense in iter {
            totals.add(expense);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use chrono::Utc;

    #[test]
    fn test_per_currency_totals() {
        let user = UserId::new();
        let expenses = [
            Expense::new(user, Money::from_cents(1000), Currency::Usd, "a", Utc::now()),
            Expense::new(user, Money::from_cents(250), Currency::Usd, "b", Utc::now()),
            Expense::new(user, Money::from_cents(500000), Currency::Ngn, "c", Utc::now()),
        ];

        let totals: PerCurrency = expenses.iter().collect();
        assert_eq!(totals.usd.total.cents(), 1250);
        assert_eq!(totals.usd.count, 2);
        assert_eq!(totals.get(Currency::Ngn).count, 1);
        assert_eq!(totals.combined().cents(), 501250);
        assert_eq!(totals.count(), 3);
    }

    #[test]
    fn test_serializes_both_currencies() {
        let json = serde_json::to_value(PerCurrency::default()).unwrap();
        assert_eq!(json["USD"]["count"], 0);
        assert_eq!(json["NGN"]["total"], 0.0);
    }
}
