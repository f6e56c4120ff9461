//! Spending trends
//!
//! A dense month-by-month series ending at the current month, oldest first,
//! with one bucket per month even when nothing was spent.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::{SpendError, SpendResult};
use crate::models::{Currency, DateRange, Money, MonthPeriod, UserId};
use crate::storage::{ExpenseQuery, Storage};

pub const DEFAULT_TREND_MONTHS: u32 = 6;
pub const MAX_TREND_MONTHS: u32 = 24;

/// Spending in one month
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`
    pub label: String,
    pub usd: Money,
    pub ngn: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub months: u32,
    pub series: Vec<TrendBucket>,
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Month")]
    label: String,
    #[tabled(rename = "USD")]
    usd: String,
    #[tabled(rename = "NGN")]
    ngn: String,
}

impl TrendReport {
    /// Validate a requested month count
    pub fn validate_months(months: u32) -> SpendResult<u32> {
        if (1..=MAX_TREND_MONTHS).contains(&months) {
            Ok(months)
        } else {
            Err(SpendError::invalid_field(
                "months",
                format!("Months must be between 1 and {}", MAX_TREND_MONTHS),
            ))
        }
    }

    /// The `months`-long window ending with `current`
    pub fn window(current: MonthPeriod, months: u32) -> DateRange {
        let first = current.minus_months(months.saturating_sub(1));
        DateRange {
            from: first.start(),
            to: current.end(),
            to_inclusive: false,
        }
    }

    /// Generate the series for the `months` months ending with `current`
    pub fn generate(
        storage: &Storage,
        user_id: UserId,
        months: u32,
        current: MonthPeriod,
    ) -> SpendResult<Self> {
        let months = Self::validate_months(months)?;
        let window = Self::window(current, months);

        let expenses = storage
            .expenses
            .find(&ExpenseQuery::for_user(user_id).in_range(window))?;

        let mut sums: BTreeMap<(MonthPeriod, Currency), Money> = BTreeMap::new();
        for expense in &expenses {
            let key = (MonthPeriod::containing(expense.date), expense.currency);
            *sums.entry(key).or_default() += expense.amount;
        }

        let first = current.minus_months(months - 1);
        let series = (0..months)
            .scan(first, |period, _| {
                let this = *period;
                *period = period.next();
                Some(this)
            })
            .map(|period| TrendBucket {
                year: period.year,
                month: period.month,
                label: period.to_string(),
                usd: sums.get(&(period, Currency::Usd)).copied().unwrap_or_default(),
                ngn: sums.get(&(period, Currency::Ngn)).copied().unwrap_or_default(),
            })
            .collect();

        Ok(Self { months, series })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let rows = self.series.iter().map(|b| TrendRow {
            label: b.label.clone(),
            usd: b.usd.format_grouped(),
            ngn: b.ngn.format_grouped(),
        });

        let mut output = format!("Spending trend, last {} months\n", self.months);
        output.push_str(&Table::new(rows).with(Style::psql()).to_string());
        output.push('\n');
        output
    }
}
