//! Seven-day window for charts.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::aggregate::DebtHistory;
use super::entry::LogSnapshot;

/// Number of points in the weekly window.
pub const WINDOW_DAYS: u64 = 7;

/// One point of the weekly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    /// Short English weekday, e.g. `Mon`.
    pub day_name: String,
    /// Hours logged that day, 0 when unlogged.
    pub hours: f64,
    /// Debt as of the end of that day.
    pub debt: f64,
}

/// Build the series for `today - 6 ..= today`, ascending.
///
/// Days without an entry carry forward the debt of the latest earlier logged
/// day, so an unlogged today still shows the true accumulated debt.
pub fn build_weekly_stats(
    logs: &LogSnapshot,
    debt_by_date: &DebtHistory,
    today: NaiveDate,
) -> Vec<DailyStat> {
    (0..WINDOW_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DailyStat {
            date,
            day_name: date.format("%a").to_string(),
            hours: logs.hours_on(date).unwrap_or(0.0),
            debt: debt_by_date.as_of(date),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleep::aggregate::aggregate;
    use crate::sleep::entry::NewSleepLog;

    // 2024-05-20 is a Monday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today() - Days::new(n)
    }

    fn weekly(entries: &[(NaiveDate, f64)]) -> Vec<DailyStat> {
        let logs: LogSnapshot = entries
            .iter()
            .map(|(d, h)| NewSleepLog::new(*d, *h))
            .collect();
        let summary = aggregate(&logs);
        build_weekly_stats(&logs, &summary.debt_by_date, today())
    }

    #[test]
    fn empty_log_gives_seven_zero_points() {
        let stats = weekly(&[]);
        assert_eq!(stats.len(), 7);
        assert!(stats.iter().all(|s| s.hours == 0.0 && s.debt == 0.0));
        assert_eq!(stats[0].date, days_ago(6));
        assert_eq!(stats[6].date, today());
    }

    #[test]
    fn day_names_follow_dates() {
        let stats = weekly(&[]);
        let names: Vec<_> = stats.iter().map(|s| s.day_name.as_str()).collect();
        assert_eq!(names, vec!["Tue", "Wed", "Thu", "Fri", "Sat", "Sun", "Mon"]);
    }

    #[test]
    fn unlogged_today_carries_yesterdays_debt() {
        let stats = weekly(&[(days_ago(2), 6.0), (days_ago(1), 5.0)]);
        let last = stats.last().unwrap();
        assert_eq!(last.date, today());
        assert_eq!(last.hours, 0.0);
        assert_eq!(last.debt, 5.0);
        assert_eq!(stats[5].hours, 5.0);
        assert_eq!(stats[5].debt, 5.0);
    }

    #[test]
    fn debt_before_window_carries_in() {
        let stats = weekly(&[(days_ago(30), 2.0)]);
        assert!(stats.iter().all(|s| s.debt == 6.0));
        assert!(stats.iter().all(|s| s.hours == 0.0));
    }

    #[test]
    fn hole_inside_window_uses_nearest_earlier_entry() {
        let stats = weekly(&[(days_ago(5), 4.0), (days_ago(2), 10.0)]);
        // days_ago(5) -> 4, days_ago(4..=3) carry 4, days_ago(2) -> 2
        assert_eq!(stats[0].debt, 0.0);
        assert_eq!(stats[1].debt, 4.0);
        assert_eq!(stats[2].debt, 4.0);
        assert_eq!(stats[3].debt, 4.0);
        assert_eq!(stats[4].debt, 2.0);
        assert_eq!(stats[4].hours, 10.0);
        assert_eq!(stats[6].debt, 2.0);
    }
}
