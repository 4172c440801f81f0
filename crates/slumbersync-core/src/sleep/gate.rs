//! Backfill gate.
//!
//! Today's entry is only accepted once every missing day between the last
//! entry and today has a value. The gate is derived from each load, never
//! advanced by hand:
//!
//! - **Clear**: no gaps; today's entry may be written or overwritten.
//! - **Blocked**: one or more gap dates pending; only a backfill that covers
//!   every one of them is accepted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entry::{parse_hours, LogSnapshot, NewSleepLog};
use super::gap::detect_gaps;
use crate::error::{GateError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "gaps", rename_all = "lowercase")]
pub enum BackfillGate {
    Clear,
    Blocked(Vec<NaiveDate>),
}

impl BackfillGate {
    /// Derive the gate from a freshly loaded snapshot.
    pub fn from_logs(logs: &LogSnapshot, today: NaiveDate) -> Self {
        let gaps = detect_gaps(logs, today);
        if gaps.is_empty() {
            Self::Clear
        } else {
            Self::Blocked(gaps)
        }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    /// Pending gap dates, empty when clear.
    pub fn gaps(&self) -> &[NaiveDate] {
        match self {
            Self::Clear => &[],
            Self::Blocked(gaps) => gaps,
        }
    }

    /// Check that today's entry may be written.
    pub fn admit_today(&self) -> Result<(), GateError> {
        match self {
            Self::Clear => Ok(()),
            Self::Blocked(gaps) => Err(GateError::Blocked { gaps: gaps.clone() }),
        }
    }

    /// Validate a backfill submission.
    ///
    /// `inputs` maps dates to raw user input. Every gap date needs a
    /// parseable, non-negative value and no other dates may be present. On
    /// success returns one entry per gap date, ascending.
    pub fn admit_backfill(
        &self,
        inputs: &BTreeMap<NaiveDate, String>,
    ) -> Result<Vec<NewSleepLog>, BackfillRejection> {
        let gaps = match self {
            Self::Clear => return Err(GateError::NothingToBackfill.into()),
            Self::Blocked(gaps) => gaps,
        };

        let unexpected: Vec<NaiveDate> = inputs
            .keys()
            .filter(|d| !gaps.contains(d))
            .copied()
            .collect();
        if !unexpected.is_empty() {
            return Err(ValidationError::UnexpectedDates(unexpected).into());
        }

        let mut missing = Vec::new();
        let mut entries = Vec::with_capacity(gaps.len());
        for date in gaps {
            match inputs.get(date).map(|raw| parse_hours(raw)) {
                Some(Ok(hours)) => entries.push(NewSleepLog::new(*date, hours)),
                Some(Err(_)) | None => missing.push(*date),
            }
        }

        if !missing.is_empty() {
            return Err(ValidationError::IncompleteBackfill(missing).into());
        }
        Ok(entries)
    }
}

/// Why a backfill submission was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum BackfillRejection {
    Gate(GateError),
    Invalid(ValidationError),
}

impl From<GateError> for BackfillRejection {
    fn from(err: GateError) -> Self {
        Self::Gate(err)
    }
}

impl From<ValidationError> for BackfillRejection {
    fn from(err: ValidationError) -> Self {
        Self::Invalid(err)
    }
}

impl From<BackfillRejection> for crate::error::CoreError {
    fn from(err: BackfillRejection) -> Self {
        match err {
            BackfillRejection::Gate(e) => e.into(),
            BackfillRejection::Invalid(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today() - Days::new(n)
    }

    fn logs_ending(n: u64) -> LogSnapshot {
        vec![NewSleepLog::new(days_ago(n), 7.0)].into_iter().collect()
    }

    fn inputs(pairs: &[(NaiveDate, &str)]) -> BTreeMap<NaiveDate, String> {
        pairs.iter().map(|(d, s)| (*d, s.to_string())).collect()
    }

    #[test]
    fn last_log_four_days_ago_blocks_with_three_gaps() {
        let gate = BackfillGate::from_logs(&logs_ending(4), today());
        assert_eq!(
            gate,
            BackfillGate::Blocked(vec![days_ago(3), days_ago(2), days_ago(1)])
        );
        assert!(!gate.is_clear());
        assert!(matches!(
            gate.admit_today(),
            Err(GateError::Blocked { gaps }) if gaps.len() == 3
        ));
    }

    #[test]
    fn empty_and_caught_up_logs_are_clear() {
        assert!(BackfillGate::from_logs(&LogSnapshot::new(), today()).is_clear());
        let gate = BackfillGate::from_logs(&logs_ending(1), today());
        assert!(gate.is_clear());
        assert!(gate.admit_today().is_ok());
        assert!(gate.gaps().is_empty());
    }

    #[test]
    fn complete_backfill_is_accepted() {
        let gate = BackfillGate::from_logs(&logs_ending(3), today());
        let entries = gate
            .admit_backfill(&inputs(&[(days_ago(1), "7.5"), (days_ago(2), "6")]))
            .unwrap();
        assert_eq!(
            entries,
            vec![
                NewSleepLog::new(days_ago(2), 6.0),
                NewSleepLog::new(days_ago(1), 7.5),
            ]
        );
    }

    #[test]
    fn missing_or_non_numeric_values_are_rejected() {
        let gate = BackfillGate::from_logs(&logs_ending(4), today());
        let err = gate
            .admit_backfill(&inputs(&[(days_ago(3), "8"), (days_ago(2), "lots")]))
            .unwrap_err();
        assert_eq!(
            err,
            BackfillRejection::Invalid(ValidationError::IncompleteBackfill(vec![
                days_ago(2),
                days_ago(1)
            ]))
        );
    }

    #[test]
    fn extra_dates_are_rejected() {
        let gate = BackfillGate::from_logs(&logs_ending(2), today());
        let err = gate
            .admit_backfill(&inputs(&[(days_ago(1), "8"), (today(), "8")]))
            .unwrap_err();
        assert_eq!(
            err,
            BackfillRejection::Invalid(ValidationError::UnexpectedDates(vec![today()]))
        );
    }

    #[test]
    fn backfill_when_clear_is_rejected() {
        let gate = BackfillGate::Clear;
        assert_eq!(
            gate.admit_backfill(&BTreeMap::new()).unwrap_err(),
            BackfillRejection::Gate(GateError::NothingToBackfill)
        );
    }

    #[test]
    fn gate_serializes_with_state_tag() {
        let json = serde_json::to_value(BackfillGate::Blocked(vec![days_ago(1)])).unwrap();
        assert_eq!(json["state"], "blocked");
        assert_eq!(json["gaps"][0], "2024-05-19");
        let clear = serde_json::to_value(BackfillGate::Clear).unwrap();
        assert_eq!(clear["state"], "clear");
    }
}
