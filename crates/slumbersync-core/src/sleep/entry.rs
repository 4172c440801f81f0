//! Sleep log entries and the immutable snapshot every derivation reads.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One calendar day's recorded sleep, as returned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepLogEntry {
    /// Storage-assigned identifier, stable across overwrites.
    pub id: String,
    pub date: NaiveDate,
    pub hours: f64,
    /// Time of the latest write to this date.
    pub recorded_at: DateTime<Utc>,
}

/// A `(date, hours)` pair submitted for writing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewSleepLog {
    pub date: NaiveDate,
    pub hours: f64,
}

impl NewSleepLog {
    pub fn new(date: NaiveDate, hours: f64) -> Self {
        Self { date, hours }
    }
}

/// Immutable, date-keyed view of a user's sleep log.
///
/// Built fresh from every load. The ascending view is the map order; the
/// descending view is its reverse. At most one value exists per date, so
/// building from raw entries that repeat a date keeps the last one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSnapshot {
    by_date: BTreeMap<NaiveDate, f64>,
}

impl LogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from storage entries in any order.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a SleepLogEntry>,
    {
        entries
            .into_iter()
            .map(|e| NewSleepLog::new(e.date, e.hours))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Hours logged for `date`, if any.
    pub fn hours_on(&self, date: NaiveDate) -> Option<f64> {
        self.by_date.get(&date).copied()
    }

    pub fn is_logged(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date)
    }

    /// Most recent logged date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next_back().copied()
    }

    /// Entries in ascending date order.
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, f64)> + '_ {
        self.by_date.iter().map(|(d, h)| (*d, *h))
    }

    /// Entries in descending date order.
    pub fn descending(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.ascending().rev()
    }

    /// Returns a new snapshot with `log` applied as an upsert.
    pub fn with(&self, log: NewSleepLog) -> Self {
        let mut by_date = self.by_date.clone();
        by_date.insert(log.date, log.hours);
        Self { by_date }
    }
}

impl FromIterator<NewSleepLog> for LogSnapshot {
    fn from_iter<T: IntoIterator<Item = NewSleepLog>>(iter: T) -> Self {
        let mut by_date = BTreeMap::new();
        for log in iter {
            by_date.insert(log.date, log.hours);
        }
        Self { by_date }
    }
}

/// Parse user-entered hours.
///
/// Accepts any finite, non-negative decimal. The core enforces no upper
/// bound.
pub fn parse_hours(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    let hours: f64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        input: input.to_string(),
    })?;
    validate_hours(hours)
}

/// Reject NaN, infinite and negative hour values.
pub fn validate_hours(hours: f64) -> Result<f64, ValidationError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(ValidationError::OutOfRange(hours));
    }
    Ok(hours)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn snapshot_orders_unsorted_input() {
        let snap: LogSnapshot = vec![
            NewSleepLog::new(d("2024-01-03"), 5.0),
            NewSleepLog::new(d("2024-01-01"), 6.0),
            NewSleepLog::new(d("2024-01-02"), 9.0),
        ]
        .into_iter()
        .collect();

        let dates: Vec<_> = snap.ascending().map(|(date, _)| date).collect();
        assert_eq!(dates, vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")]);
        assert_eq!(snap.descending().next(), Some((d("2024-01-03"), 5.0)));
        assert_eq!(snap.last_date(), Some(d("2024-01-03")));
    }

    #[test]
    fn duplicate_dates_keep_last_value() {
        let snap: LogSnapshot = vec![
            NewSleepLog::new(d("2024-01-01"), 6.0),
            NewSleepLog::new(d("2024-01-01"), 7.5),
        ]
        .into_iter()
        .collect();

        assert_eq!(snap.len(), 1);
        assert_eq!(snap.hours_on(d("2024-01-01")), Some(7.5));
    }

    #[test]
    fn with_does_not_touch_original() {
        let base: LogSnapshot = vec![NewSleepLog::new(d("2024-01-01"), 6.0)]
            .into_iter()
            .collect();
        let next = base.with(NewSleepLog::new(d("2024-01-01"), 9.0));

        assert_eq!(base.hours_on(d("2024-01-01")), Some(6.0));
        assert_eq!(next.hours_on(d("2024-01-01")), Some(9.0));
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn parse_hours_accepts_decimals_and_whitespace() {
        assert_eq!(parse_hours("7.5").unwrap(), 7.5);
        assert_eq!(parse_hours(" 8 ").unwrap(), 8.0);
        assert_eq!(parse_hours("0").unwrap(), 0.0);
        assert_eq!(parse_hours("30").unwrap(), 30.0);
    }

    #[test]
    fn parse_hours_rejects_garbage() {
        assert!(matches!(
            parse_hours("abc"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_hours(""),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_hours("-1"),
            Err(ValidationError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_hours("NaN"),
            Err(ValidationError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_hours("inf"),
            Err(ValidationError::OutOfRange(_))
        ));
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("01/02/2024").is_err());
        assert_eq!(parse_date("2024-02-29").unwrap(), d("2024-02-29"));
    }
}
