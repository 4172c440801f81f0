mod aggregate;
mod calendar;
mod entry;
mod gap;
mod gate;
mod weekly;

pub use aggregate::{
    aggregate, Aggregator, DebtHistory, DebtLevel, SleepSummary, DEFAULT_TARGET_HOURS,
    HIGH_THRESHOLD, MODERATE_THRESHOLD, SEVERE_THRESHOLD,
};
pub use calendar::{month_calendar, CalendarDay, MonthCalendar, NightQuality};
pub use entry::{
    parse_date, parse_hours, validate_hours, LogSnapshot, NewSleepLog, SleepLogEntry,
};
pub use gap::detect_gaps;
pub use gate::{BackfillGate, BackfillRejection};
pub use weekly::{build_weekly_stats, DailyStat, WINDOW_DAYS};
