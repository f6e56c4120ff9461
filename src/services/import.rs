//! CSV import of expenses
//!
//! Reads rows with `date,description,category,amount,currency` headers
//! (category and currency optional), skips rows that duplicate an existing
//! expense and reports the rest by row number.

use std::collections::HashSet;
use std::io::Read;

use serde::Deserialize;

use crate::error::{SpendError, SpendResult};
use crate::models::period::parse_instant;
use crate::models::{Currency, Expense, Money, UserId};
use crate::services::expense::{ExpenseService, NewExpense};
use crate::storage::{ExpenseQuery, Storage};

/// One CSV row as written by the user
#[derive(Debug, Deserialize)]
struct ImportRow {
    date: String,
    description: String,
    #[serde(default)]
    category: Option<String>,
    amount: String,
    #[serde(default)]
    currency: Option<String>,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: Vec<Expense>,
    pub duplicates_skipped: usize,
    /// (1-based data row, message)
    pub errors: Vec<(usize, String)>,
}

/// Service for importing expenses from CSV
pub struct ImportService<'a> {
    storage: &'a Storage,
}

/// Identity used for duplicate detection
fn fingerprint(expense: &Expense) -> (i64, i64, String, Currency) {
    (
        expense.date.timestamp(),
        expense.amount.cents(),
        expense.description.to_lowercase(),
        expense.currency,
    )
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Import every valid row for `user_id`
    pub fn import_csv<R: Read>(&self, user_id: UserId, source: R) -> SpendResult<ImportResult> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| SpendError::Import(format!("Failed to read CSV header: {}", e)))?
            .clone();
        for required in ["date", "description", "amount"] {
            if !headers.iter().any(|h| h.eq_ignore_ascii_case(required)) {
                return Err(SpendError::Import(format!(
                    "CSV is missing the '{}' column",
                    required
                )));
            }
        }
        let lowered: csv::StringRecord = headers.iter().map(str::to_lowercase).collect();
        reader.set_headers(lowered);

        let mut seen: HashSet<_> = self
            .storage
            .expenses
            .find(&ExpenseQuery::for_user(user_id))?
            .iter()
            .map(fingerprint)
            .collect();

        let expenses = ExpenseService::new(self.storage);
        let mut result = ImportResult::default();

        for (index, record) in reader.deserialize::<ImportRow>().enumerate() {
            let row = index + 1;
            let input = match record
                .map_err(|e| e.to_string())
                .and_then(|r| self.parse_row(r))
            {
                Ok(input) => input,
                Err(message) => {
                    result.errors.push((row, message));
                    continue;
                }
            };

            let candidate = Expense::new(
                user_id,
                input.amount,
                input.currency,
                input.description.clone(),
                input.date.unwrap_or_default(),
            );
            if !seen.insert(fingerprint(&candidate)) {
                result.duplicates_skipped += 1;
                continue;
            }

            match expenses.create(user_id, input) {
                Ok(expense) => result.imported.push(expense),
                Err(SpendError::Storage(msg)) => return Err(SpendError::Storage(msg)),
                Err(e) => result.errors.push((row, e.to_string())),
            }
        }

        tracing::info!(
            imported = result.imported.len(),
            duplicates = result.duplicates_skipped,
            errors = result.errors.len(),
            "expense import finished"
        );
        Ok(result)
    }

    fn parse_row(&self, row: ImportRow) -> Result<NewExpense, String> {
        let date = parse_instant(&row.date).ok_or_else(|| format!("Invalid date '{}'", row.date))?;

        let amount = Money::parse(&row.amount)
            .map_err(|e| format!("Invalid amount '{}': {}", row.amount, e))?;

        let currency = match row.currency.as_deref().map(str::trim) {
            None | Some("") => Currency::default(),
            Some(code) => code.parse::<Currency>()?,
        };

        Ok(NewExpense {
            amount,
            currency,
            description: row.description,
            category_id: None,
            category: row.category.filter(|c| !c.trim().is_empty()),
            date: Some(date),
        })
    }
}
