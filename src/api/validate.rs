//! Request validation
//!
//! Handlers feed raw body and query fields through a [`Validator`], which
//! parses what it can and collects a field-level message for everything it
//! cannot, so one response reports every problem at once.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::{FieldError, SpendError, SpendResult};
use crate::models::period::parse_instant;
use crate::models::{CategoryId, Currency, DateRange, Money};

/// Distinguish an absent field from an explicit `null`
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: absent gives
/// `None`, `null` gives `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Record a missing required field
    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.fail(field, format!("{} is required", field));
        }
        value
    }

    /// A positive amount with at most two decimal places
    pub fn amount(&mut self, field: &str, value: Option<f64>) -> Option<Money> {
        let value = value?;
        match Money::from_major(value) {
            Some(money) if !money.is_positive() => {
                self.fail(field, "Amount must be greater than 0");
                None
            }
            Some(money) if (money.to_major() - value).abs() > 1e-6 => {
                self.fail(field, "Amount must have at most two decimal places");
                None
            }
            Some(money) => Some(money),
            None => {
                self.fail(field, "Amount is out of range");
                None
            }
        }
    }

    pub fn currency(&mut self, field: &str, value: Option<&str>) -> Option<Currency> {
        match value?.parse() {
            Ok(currency) => Some(currency),
            Err(_) => {
                self.fail(field, "Currency must be USD or NGN");
                None
            }
        }
    }

    pub fn category_id(&mut self, field: &str, value: Option<&str>) -> Option<CategoryId> {
        match value?.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                self.fail(field, "Invalid category id");
                None
            }
        }
    }

    /// A `YYYY-MM-DD` date or an ISO 8601 timestamp
    pub fn instant(&mut self, field: &str, value: Option<&str>) -> Option<DateTime<Utc>> {
        let raw = value?;
        let parsed = parse_instant(raw);
        if parsed.is_none() {
            self.fail(field, "Use YYYY-MM-DD or an ISO 8601 timestamp");
        }
        parsed
    }

    /// Any `FromStr` query parameter
    pub fn number<T: FromStr>(&mut self, field: &str, value: Option<&str>) -> Option<T> {
        match value?.trim().parse() {
            Ok(n) => Some(n),
            Err(_) => {
                self.fail(field, format!("{} must be a whole number", field));
                None
            }
        }
    }

    /// A `from`/`to` pair; both present or both absent unless `required`
    pub fn range(
        &mut self,
        from: Option<&str>,
        to: Option<&str>,
        required: bool,
    ) -> Option<DateRange> {
        if !required && from.is_none() && to.is_none() {
            return None;
        }

        let from_dt = self.required("from", from).and_then(|f| self.instant("from", Some(f)));
        let to_dt = self.required("to", to).and_then(|t| self.instant("to", Some(t)));

        match DateRange::new(from_dt?, to_dt?) {
            Ok(range) => Some(range),
            Err(e) => {
                self.fail("from", e.to_string());
                None
            }
        }
    }

    /// `Ok` when nothing failed
    pub fn finish(self) -> SpendResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SpendError::InvalidFields(self.errors))
        }
    }
}
