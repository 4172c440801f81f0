//! Sleep debt, streak and debt-level derivation.
//!
//! Debt models sleep owed: each night adds `target - hours`, and the running
//! total is clamped at zero after every night, so surplus sleep repays debt
//! but never banks credit. The streak counts the most recent consecutive
//! entries that met the target.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entry::LogSnapshot;

/// Nightly sleep target in hours.
pub const DEFAULT_TARGET_HOURS: f64 = 8.0;

/// Inclusive lower bound of the Moderate band.
pub const MODERATE_THRESHOLD: f64 = 2.0;
/// Inclusive lower bound of the High band.
pub const HIGH_THRESHOLD: f64 = 6.0;
/// Inclusive lower bound of the Severe band.
pub const SEVERE_THRESHOLD: f64 = 12.0;

/// Classification of accumulated sleep debt.
///
/// `Low` is also known as `Minimal`; both names parse to `Low` and only
/// `low` is ever written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtLevel {
    /// Under 2 hours of debt
    #[serde(alias = "minimal")]
    Low,
    /// 2 to under 6 hours
    Moderate,
    /// 6 to under 12 hours
    High,
    /// 12 hours or more
    Severe,
}

impl DebtLevel {
    /// Classify a debt value. Values exactly on a threshold belong to the
    /// higher band.
    pub fn from_debt(debt: f64) -> Self {
        if debt >= SEVERE_THRESHOLD {
            Self::Severe
        } else if debt >= HIGH_THRESHOLD {
            Self::High
        } else if debt >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Severe => "severe",
        }
    }
}

impl fmt::Display for DebtLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebtLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "minimal" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            "severe" => Ok(Self::Severe),
            other => Err(format!("unknown debt level: {other}")),
        }
    }
}

/// Running debt recorded at the end of each logged day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebtHistory(BTreeMap<NaiveDate, f64>);

impl DebtHistory {
    /// Debt recorded on exactly `date`.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.0.get(&date).copied()
    }

    /// Debt as of `date`: the value recorded that day, otherwise the value of
    /// the latest earlier logged day, otherwise zero.
    pub fn as_of(&self, date: NaiveDate) -> f64 {
        if let Some(debt) = self.get(date) {
            return debt;
        }
        self.0
            .range(..date)
            .next_back()
            .map(|(_, debt)| *debt)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.0.iter().map(|(d, v)| (*d, *v))
    }
}

/// Everything derived from one pass over the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSummary {
    pub total_debt: f64,
    pub streak: u32,
    pub level: DebtLevel,
    pub debt_by_date: DebtHistory,
}

/// Debt/streak calculator.
#[derive(Debug, Clone)]
pub struct Aggregator {
    target_hours: f64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    /// Create an aggregator with the 8-hour target.
    pub fn new() -> Self {
        Self {
            target_hours: DEFAULT_TARGET_HOURS,
        }
    }

    /// Create with a custom nightly target.
    pub fn with_target(target_hours: f64) -> Self {
        Self { target_hours }
    }

    pub fn target_hours(&self) -> f64 {
        self.target_hours
    }

    /// Compute debt, streak, level and per-day debt history.
    pub fn aggregate(&self, logs: &LogSnapshot) -> SleepSummary {
        let mut running_debt = 0.0_f64;
        let mut history = BTreeMap::new();

        for (date, hours) in logs.ascending() {
            running_debt += self.target_hours - hours;
            if running_debt < 0.0 {
                running_debt = 0.0;
            }
            history.insert(date, running_debt);
        }

        let streak = logs
            .descending()
            .take_while(|(_, hours)| *hours >= self.target_hours)
            .count() as u32;

        let summary = SleepSummary {
            total_debt: running_debt,
            streak,
            level: DebtLevel::from_debt(running_debt),
            debt_by_date: DebtHistory(history),
        };

        tracing::debug!(
            entries = logs.len(),
            total_debt = summary.total_debt,
            streak = summary.streak,
            level = %summary.level,
            "aggregated sleep log"
        );
        summary
    }
}

/// Aggregate with the default 8-hour target.
pub fn aggregate(logs: &LogSnapshot) -> SleepSummary {
    Aggregator::new().aggregate(logs)
}
