//! # SlumberSync Core Library
//!
//! This library provides the core business logic for SlumberSync, a nightly
//! sleep tracker. The CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Sleep engine**: pure derivations over an immutable [`LogSnapshot`]:
//!   gap detection, debt/streak aggregation, the 7-day window and the month
//!   calendar
//! - **Backfill gate**: blocks today's entry while earlier days are missing
//! - **Storage**: SQLite log storage and session, TOML configuration
//! - **Advice**: coaching text from an external text generator, with a
//!   fallback message for every failure
//!
//! ## Key Components
//!
//! - [`Tracker`]: load / submit front door over a [`SleepStore`]
//! - [`Aggregator`]: sleep debt, streak and [`DebtLevel`]
//! - [`BackfillGate`]: `Clear` / `Blocked(gaps)` state
//! - [`Database`]: log and session persistence
//! - [`Config`]: application configuration management

pub mod advice;
pub mod error;
pub mod sleep;
pub mod storage;
pub mod tracker;

pub use advice::{advice_or_fallback, AdviceError, AdviceProvider, AdviceRequest, Coach, GeminiClient};
pub use error::{ConfigError, CoreError, DatabaseError, GateError, ValidationError};
pub use sleep::{
    aggregate, build_weekly_stats, detect_gaps, month_calendar, Aggregator, BackfillGate,
    DailyStat, DebtHistory, DebtLevel, LogSnapshot, MonthCalendar, NewSleepLog, NightQuality,
    SleepLogEntry, SleepSummary,
};
pub use storage::{Config, Database, SessionStore, SleepStore, UserProfile};
pub use tracker::{today_local, Dashboard, Tracker};
