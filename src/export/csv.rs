//! CSV export of expenses
//!
//! Output layout: a UTF-8 BOM, a `Date, Description, Category, Amount`
//! header, then one line per expense (oldest first) with a blank line
//! between records. Fields are separated by `", "`.

use std::borrow::Cow;
use std::io::Write;

use chrono::Duration;

use crate::error::{SpendError, SpendResult};
use crate::models::{DateRange, Expense, UserId};
use crate::storage::{ExpenseQuery, Storage};

pub const UTF8_BOM: &str = "\u{FEFF}";

const HEADER: [&str; 4] = ["Date", "Description", "Category", "Amount"];
const SEPARATOR: &str = ", ";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
}

impl ExportFormat {
    /// Parse an optional `format` parameter; absent means CSV
    pub fn parse(value: Option<&str>) -> SpendResult<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::Csv),
            Some(v) if v.eq_ignore_ascii_case("csv") => Ok(Self::Csv),
            Some(other) => Err(SpendError::invalid_field(
                "format",
                format!("Unsupported export format '{}': only csv is available", other),
            )),
        }
    }
}

/// A rendered export ready to download or write
#[derive(Debug, Clone)]
pub struct ExpenseExport {
    pub filename: String,
    pub body: String,
    pub rows: usize,
}

/// `expenses_<from>_<to>.csv`, using the requested calendar days
pub fn export_filename(range: &DateRange) -> String {
    let last = if range.to_inclusive {
        range.to
    } else {
        range.to - Duration::nanoseconds(1)
    };
    format!(
        "expenses_{}_{}.csv",
        range.from.format("%Y-%m-%d"),
        last.format("%Y-%m-%d")
    )
}

/// Export a user's expenses in `range`, refusing more than `limit` rows
pub fn export_expenses_csv(
    storage: &Storage,
    user_id: UserId,
    range: DateRange,
    limit: usize,
) -> SpendResult<ExpenseExport> {
    let query = ExpenseQuery::for_user(user_id).in_range(range);

    // One snapshot, so the limit check and the written rows agree
    let mut expenses = storage.expenses.find(&query)?;
    if expenses.len() > limit {
        return Err(SpendError::ExportLimit {
            limit,
            found: expenses.len(),
        });
    }
    expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut body = Vec::with_capacity(64 * (expenses.len() + 1));
    write_expenses_csv(&expenses, &mut body)?;
    let body =
        String::from_utf8(body).map_err(|e| SpendError::Export(format!("Invalid UTF-8: {}", e)))?;

    Ok(ExpenseExport {
        filename: export_filename(&range),
        body,
        rows: expenses.len(),
    })
}

/// Write expenses in the order given
pub fn write_expenses_csv<W: Write>(expenses: &[Expense], writer: &mut W) -> SpendResult<()> {
    let io = |e: std::io::Error| SpendError::Export(e.to_string());

    write!(writer, "{}", UTF8_BOM).map_err(io)?;
    writeln!(writer, "{}", HEADER.join(SEPARATOR)).map_err(io)?;

    for (i, expense) in expenses.iter().enumerate() {
        if i > 0 {
            writeln!(writer).map_err(io)?;
        }
        let date = expense.date.format("%Y-%m-%d").to_string();
        let amount = expense.amount.format_with_currency(expense.currency);
        let fields = [
            escape_csv(&date),
            escape_csv(&expense.description),
            escape_csv(&expense.category),
            escape_csv(&amount),
        ];
        writeln!(writer, "{}", fields.join(SEPARATOR)).map_err(io)?;
    }

    Ok(())
}

fn escape_csv(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}
