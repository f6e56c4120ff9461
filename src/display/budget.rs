use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Budget;

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "ID")]
    id: String,
}

pub fn format_budget_list(budgets: &[Budget]) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n".to_string();
    }

    let rows = budgets.iter().map(|b| BudgetRow {
        month: b.period().to_string(),
        category: b.category.clone(),
        amount: b.amount.format_grouped(),
        id: b.id.to_string(),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, MonthPeriod, UserId, OVERALL_BUDGET};

    #[test]
    fn test_overall_budget_row() {
        let period = MonthPeriod::new(2025, 3).unwrap();
        let budget = Budget::new(UserId::new(), None, period, Money::from_cents(50000));
        let output = format_budget_list(&[budget]);
        assert!(output.contains("2025-03"));
        assert!(output.contains(OVERALL_BUDGET));
        assert!(output.contains("500.00"));
    }
}
