//! Expense display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Expense;
use crate::services::ExpensePage;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// Format one page of expenses with a paging footer
pub fn format_expense_page(page: &ExpensePage, date_format: &str) -> String {
    if page.expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows = page.expenses.iter().map(|e| ExpenseRow {
        date: e.date.format(date_format).to_string(),
        description: e.description.clone(),
        category: e.category.clone(),
        amount: e.amount.format_with_currency(e.currency),
        id: e.id.to_string(),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output.push_str(&format!(
        "Page {} of {} ({} expenses)\n",
        page.page,
        page.total_pages.max(1),
        page.total
    ));
    output
}

/// Format a single expense
pub fn format_expense_details(expense: &Expense) -> String {
    let mut output = String::new();
    output.push_str(&format!("Expense: {}\n", expense.description));
    output.push_str(&format!("  ID:       {}\n", expense.id));
    output.push_str(&format!(
        "  Amount:   {}\n",
        expense.amount.format_with_currency(expense.currency)
    ));
    output.push_str(&format!("  Category: {}\n", expense.category));
    output.push_str(&format!("  Date:     {}\n", expense.date.format("%Y-%m-%d %H:%M")));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Money, UserId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_page_footer() {
        let date = Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap();
        let expense = Expense::new(UserId::new(), Money::from_cents(123450), Currency::Ngn, "Rent", date);
        let page = ExpensePage {
            expenses: vec![expense],
            page: 1,
            limit: 20,
            total: 1,
            total_pages: 1,
        };

        let output = format_expense_page(&page, "%d/%m/%Y");
        assert!(output.contains("04/03/2025"));
        assert!(output.contains("NGN 1,234.50"));
        assert!(output.contains("Page 1 of 1 (1 expenses)"));
    }
}
