//! Load, derive, submit.
//!
//! Every operation reads a fresh snapshot from storage and re-derives the
//! whole dashboard from it. Nothing derived is cached between calls, so a
//! caller always acts on the latest completed load.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sleep::{
    build_weekly_stats, parse_hours, Aggregator, BackfillGate, DailyStat, LogSnapshot,
    NewSleepLog, SleepSummary,
};
use crate::storage::SleepStore;

/// Everything the front end shows after a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub target_hours: f64,
    pub summary: SleepSummary,
    pub weekly: Vec<DailyStat>,
    pub gate: BackfillGate,
    /// Whether today already has an entry (a new submit overwrites it).
    pub today_logged: bool,
    pub entries: usize,
}

/// Today's date in the local time zone.
pub fn today_local() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub struct Tracker<S> {
    store: S,
    aggregator: Aggregator,
}

impl<S: SleepStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            aggregator: Aggregator::new(),
        }
    }

    /// Use a custom nightly target.
    pub fn with_target(store: S, target_hours: f64) -> Self {
        Self {
            store,
            aggregator: Aggregator::with_target(target_hours),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read all entries into a snapshot.
    pub fn snapshot(&self) -> Result<LogSnapshot> {
        let entries = self.store.logs()?;
        Ok(LogSnapshot::from_entries(&entries))
    }

    /// Derive the dashboard from an already loaded snapshot.
    pub fn derive(&self, logs: &LogSnapshot, today: NaiveDate) -> Dashboard {
        let gate = BackfillGate::from_logs(logs, today);
        let summary = self.aggregator.aggregate(logs);
        let weekly = build_weekly_stats(logs, &summary.debt_by_date, today);

        Dashboard {
            today,
            target_hours: self.aggregator.target_hours(),
            today_logged: logs.is_logged(today),
            entries: logs.len(),
            summary,
            weekly,
            gate,
        }
    }

    /// Load from storage and derive.
    pub fn load(&self, today: NaiveDate) -> Result<Dashboard> {
        let logs = self.snapshot()?;
        Ok(self.derive(&logs, today))
    }

    /// Write today's entry if the gate is clear, then reload.
    pub fn submit_today(&self, today: NaiveDate, raw_hours: &str) -> Result<Dashboard> {
        let hours = parse_hours(raw_hours)?;
        let logs = self.snapshot()?;
        if let Err(e) = BackfillGate::from_logs(&logs, today).admit_today() {
            tracing::warn!(%today, error = %e, "today's entry refused");
            return Err(e.into());
        }

        self.store.upsert_log(today, hours)?;
        self.load(today)
    }

    /// Fill every pending gap in one batch, then reload.
    ///
    /// Nothing is written unless every gap date has a valid value.
    pub fn submit_backfill(
        &self,
        today: NaiveDate,
        inputs: &BTreeMap<NaiveDate, String>,
    ) -> Result<Dashboard> {
        let logs = self.snapshot()?;
        let gate = BackfillGate::from_logs(&logs, today);
        let entries: Vec<NewSleepLog> = match gate.admit_backfill(inputs) {
            Ok(entries) => entries,
            Err(rejection) => {
                tracing::warn!(%today, ?rejection, "backfill refused");
                return Err(rejection.into());
            }
        };

        self.store.upsert_batch(&entries)?;
        let dashboard = self.load(today)?;
        if !dashboard.gate.is_clear() {
            tracing::warn!(gaps = ?dashboard.gate.gaps(), "gaps remain after backfill");
        }
        Ok(dashboard)
    }
}
