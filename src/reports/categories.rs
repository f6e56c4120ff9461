//! Spending by category
//!
//! Groups a user's expenses in a date range by (category id, category name)
//! and orders the groups by combined total, largest first.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::SpendResult;
use crate::models::{CategoryId, DateRange, Expense, Money, UserId};
use crate::storage::{ExpenseQuery, Storage};

use super::PerCurrency;

/// Totals for one category
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    /// `None` for uncategorized spending
    pub category_id: Option<CategoryId>,
    pub category: String,
    pub currencies: PerCurrency,
    pub combined_total: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub categories: Vec<CategoryTotals>,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "USD")]
    usd: String,
    #[tabled(rename = "NGN")]
    ngn: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Group expenses by category, largest combined total first
///
/// Ties are broken by category name so the order is stable.
pub fn aggregate_by_category<'a, I>(expenses: I) -> Vec<CategoryTotals>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut groups: HashMap<(Option<CategoryId>, &'a str), PerCurrency> = HashMap::new();
    for expense in expenses {
        groups
            .entry((expense.category_id, expense.category.as_str()))
            .or_default()
            .add(expense);
    }

    let mut rows: Vec<_> = groups
        .into_iter()
        .map(|((category_id, name), currencies)| CategoryTotals {
            category_id,
            category: name.to_string(),
            combined_total: currencies.combined(),
            count: currencies.count(),
            currencies,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.combined_total
            .cmp(&a.combined_total)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

impl CategoryReport {
    /// Generate the breakdown for a date range
    pub fn generate(storage: &Storage, user_id: UserId, range: DateRange) -> SpendResult<Self> {
        let expenses = storage
            .expenses
            .find(&ExpenseQuery::for_user(user_id).in_range(range))?;

        Ok(Self {
            from: range.from,
            to: range.to,
            categories: aggregate_by_category(&expenses),
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        if self.categories.is_empty() {
            return "No expenses in this range.\n".to_string();
        }

        let rows = self.categories.iter().map(|c| CategoryRow {
            category: c.category.clone(),
            usd: c.currencies.usd.total.format_grouped(),
            ngn: c.currencies.ngn.total.format_grouped(),
            count: c.count,
        });

        let mut output = format!(
            "Spending by category: {} to {}\n",
            self.from.format("%Y-%m-%d"),
            self.to.format("%Y-%m-%d %H:%M")
        );
        output.push_str(&Table::new(rows).with(Style::psql()).to_string());
        output.push('\n');
        output
    }
}
