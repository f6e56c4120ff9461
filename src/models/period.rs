//! Calendar periods and date ranges
//!
//! All period arithmetic happens in UTC. A budget's `periodStart` and every
//! report window are derived from [`MonthPeriod`] so a timestamp near
//! midnight never lands in the wrong month because of a local offset.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Years accepted for month periods
pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// A calendar month in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    /// Create a month period, rejecting out-of-range values
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(PeriodParseError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given instant
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    /// The current UTC month
    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First instant of the month (inclusive)
    pub fn start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.first_day().and_time(NaiveTime::MIN))
    }

    /// First instant of the following month (exclusive end)
    pub fn end(&self) -> DateTime<Utc> {
        self.next().start()
    }

    /// Check if an instant falls within this month
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start() && instant < self.end()
    }

    /// Get the next month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Step back `count` months
    pub fn minus_months(&self, count: u32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 - count as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Parse a `YYYY-MM` string
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| PeriodParseError::InvalidFormat(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;

        Self::new(year, month)
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parse a date or timestamp into a UTC instant
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339 with any offset, and a
/// naive `YYYY-MM-DDTHH:MM:SS` treated as UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// A reporting window between two instants
///
/// A `to` bound that falls exactly on midnight is read as "through the end
/// of that day": the range becomes `[from, to + 1 day)`. Any other `to` is an
/// inclusive instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub to_inclusive: bool,
}

impl DateRange {
    /// Build a range from already-parsed bounds
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, PeriodParseError> {
        if to < from {
            return Err(PeriodParseError::InvertedRange);
        }

        if to.time() == NaiveTime::MIN {
            Ok(Self {
                from,
                to: to + Duration::days(1),
                to_inclusive: false,
            })
        } else {
            Ok(Self {
                from,
                to,
                to_inclusive: true,
            })
        }
    }

    /// A whole calendar month, `[start, next start)`
    pub fn month(period: MonthPeriod) -> Self {
        Self {
            from: period.start(),
            to: period.end(),
            to_inclusive: false,
        }
    }

    /// Parse both bounds from strings
    pub fn parse(from: &str, to: &str) -> Result<Self, PeriodParseError> {
        let from_dt =
            parse_instant(from).ok_or_else(|| PeriodParseError::InvalidDate(from.to_string()))?;
        let to_dt = parse_instant(to).ok_or_else(|| PeriodParseError::InvalidDate(to.to_string()))?;
        Self::new(from_dt, to_dt)
    }

    /// Check if an instant falls within the range
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if instant < self.from {
            return false;
        }
        if self.to_inclusive {
            instant <= self.to
        } else {
            instant < self.to
        }
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
    YearOutOfRange(i32),
    InvalidDate(String),
    InvertedRange,
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Invalid period '{}': use YYYY-MM", s),
            Self::InvalidMonth(m) => write!(f, "Invalid month {}: must be 1-12", m),
            Self::YearOutOfRange(y) => {
                write!(f, "Year {} out of range ({}-{})", y, MIN_YEAR, MAX_YEAR)
            }
            Self::InvalidDate(s) => {
                write!(f, "Invalid date '{}': use YYYY-MM-DD or an ISO 8601 timestamp", s)
            }
            Self::InvertedRange => write!(f, "'from' must not be after 'to'"),
        }
    }
}

impl std::error::Error for PeriodParseError {}
