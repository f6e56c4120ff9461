//! Monthly summary
//!
//! Totals, counts and averages for one UTC calendar month, with the five
//! categories that took the most.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::{SpendError, SpendResult};
use crate::models::{DateRange, Money, MonthPeriod, UserId};
use crate::storage::{ExpenseQuery, Storage};

use super::categories::{aggregate_by_category, CategoryTotals};
use super::{CurrencyTotal, PerCurrency};

const TOP_CATEGORIES: usize = 5;

/// Total, count and average for one currency
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CurrencySummary {
    pub total: Money,
    pub count: usize,
    /// Rounded to minor units
    pub average: Money,
}

impl From<CurrencyTotal> for CurrencySummary {
    fn from(t: CurrencyTotal) -> Self {
        Self {
            total: t.total,
            count: t.count,
            average: Money::average(t.total, t.count),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCurrencies {
    #[serde(rename = "USD")]
    pub usd: CurrencySummary,
    #[serde(rename = "NGN")]
    pub ngn: CurrencySummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub currencies: MonthlyCurrencies,
    pub combined_total: Money,
    pub expense_count: usize,
    pub top_categories: Vec<CategoryTotals>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Currency")]
    currency: &'static str,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Average")]
    average: String,
}

#[derive(Tabled)]
struct TopRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Combined")]
    combined: String,
    #[tabled(rename = "Count")]
    count: usize,
}

impl MonthlyReport {
    /// Validate a requested year and month
    pub fn period(year: i32, month: u32) -> SpendResult<MonthPeriod> {
        MonthPeriod::new(year, month).map_err(|e| {
            let field = if (1..=12).contains(&month) { "year" } else { "month" };
            SpendError::invalid_field(field, e.to_string())
        })
    }

    /// Generate the summary for one month
    pub fn generate(storage: &Storage, user_id: UserId, period: MonthPeriod) -> SpendResult<Self> {
        let expenses = storage
            .expenses
            .find(&ExpenseQuery::for_user(user_id).in_range(DateRange::month(period)))?;

        let totals: PerCurrency = expenses.iter().collect();
        let mut top_categories = aggregate_by_category(&expenses);
        top_categories.truncate(TOP_CATEGORIES);

        Ok(Self {
            year: period.year,
            month: period.month,
            label: period.to_string(),
            currencies: MonthlyCurrencies {
                usd: totals.usd.into(),
                ngn: totals.ngn.into(),
            },
            combined_total: totals.combined(),
            expense_count: totals.count(),
            top_categories,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let summary = [
            ("USD", self.currencies.usd),
            ("NGN", self.currencies.ngn),
        ]
        .into_iter()
        .map(|(currency, s)| SummaryRow {
            currency,
            total: s.total.format_grouped(),
            count: s.count,
            average: s.average.format_grouped(),
        });

        let mut output = format!("Monthly summary: {}\n", self.label);
        output.push_str(&Table::new(summary).with(Style::psql()).to_string());
        output.push('\n');

        if !self.top_categories.is_empty() {
            let top = self
                .top_categories
                .iter()
                .enumerate()
                .map(|(i, c)| TopRow {
                    rank: i + 1,
                    category: c.category.clone(),
                    combined: c.combined_total.format_grouped(),
                    count: c.count,
                });
            output.push_str("\nTop categories\n");
            output.push_str(&Table::new(top).with(Style::psql()).to_string());
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use crate::models::{Category, Currency, Expense, DEFAULT_COLOR};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_empty_month_has_both_currencies() {
        let (_temp_dir, storage) = create_test_storage();
        let period = MonthPeriod::new(2025, 2).unwrap();

        let report = MonthlyReport::generate(&storage, UserId::new(), period).unwrap();
        assert_eq!(report.currencies.usd.count, 0);
        assert!(report.currencies.ngn.average.is_zero());
        assert!(report.top_categories.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["currencies"]["USD"].is_object());
        assert!(json["currencies"]["NGN"].is_object());
        assert_eq!(json["label"], "2025-02");
    }

    #[test]
    fn test_totals_and_average() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let day = Utc.with_ymd_and_hms(2025, 2, 14, 8, 0, 0).unwrap();
        for cents in [100, 100, 101] {
            storage
                .expenses
                .upsert(Expense::new(user, Money::from_cents(cents), Currency::Usd, "x", day))
                .unwrap();
        }
        // Outside the month
        let march = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        storage
            .expenses
            .upsert(Expense::new(user, Money::from_cents(5000), Currency::Usd, "x", march))
            .unwrap();

        let period = MonthPeriod::new(2025, 2).unwrap();
        let report = MonthlyReport::generate(&storage, user, period).unwrap();
        assert_eq!(report.currencies.usd.total.cents(), 301);
        assert_eq!(report.currencies.usd.count, 3);
        assert_eq!(report.currencies.usd.average.cents(), 100);
        assert_eq!(report.expense_count, 3);
    }

    #[test]
    fn test_top_five_categories() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let day = Utc.with_ymd_and_hms(2025, 2, 3, 8, 0, 0).unwrap();

        for (i, name) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            let category = Category::custom(*name, DEFAULT_COLOR, user);
            let mut e = Expense::new(user, Money::from_cents(100 * (i as i64 + 1)), Currency::Ngn, "x", day);
            e.set_category(Some(&category));
            storage.expenses.upsert(e).unwrap();
        }

        let period = MonthPeriod::new(2025, 2).unwrap();
        let report = MonthlyReport::generate(&storage, user, period).unwrap();
        let names: Vec<_> = report.top_categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["G", "F", "E", "D", "C"]);
        assert_eq!(report.combined_total.cents(), 2800);
    }

    #[test]
    fn test_period_validation() {
        assert!(MonthlyReport::period(2025, 13).is_err());
        assert!(MonthlyReport::period(1999, 1).is_err());
        assert!(MonthlyReport::period(2100, 12).is_ok());
    }
}
