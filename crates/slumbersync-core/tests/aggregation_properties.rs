//! Property tests for the sleep debt engine.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use slumbersync_core::{
    aggregate, build_weekly_stats, detect_gaps, BackfillGate, LogSnapshot, NewSleepLog,
};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn logs_strategy() -> impl Strategy<Value = Vec<(u64, f64)>> {
    prop::collection::vec((0u64..120, 0.0f64..14.0), 0..60)
}

fn snapshot(raw: &[(u64, f64)]) -> LogSnapshot {
    raw.iter()
        .map(|(offset, hours)| NewSleepLog::new(base() + Days::new(*offset), *hours))
        .collect()
}

proptest! {
    #[test]
    fn debt_is_never_negative(raw in logs_strategy()) {
        let summary = aggregate(&snapshot(&raw));
        prop_assert!(summary.total_debt >= 0.0);
        for (_, debt) in summary.debt_by_date.iter() {
            prop_assert!(debt >= 0.0);
        }
    }

    #[test]
    fn latest_debt_equals_total(raw in logs_strategy()) {
        let logs = snapshot(&raw);
        let summary = aggregate(&logs);
        match logs.last_date() {
            Some(last) => prop_assert_eq!(summary.debt_by_date.get(last), Some(summary.total_debt)),
            None => prop_assert_eq!(summary.total_debt, 0.0),
        }
    }

    #[test]
    fn short_latest_night_zeroes_streak(raw in logs_strategy(), short in 0.0f64..7.99) {
        let logs = snapshot(&raw);
        let after = logs.last_date().map(|d| d + Days::new(1)).unwrap_or_else(base);
        let logs = logs.with(NewSleepLog::new(after, short));
        prop_assert_eq!(aggregate(&logs).streak, 0);
    }

    #[test]
    fn streak_never_exceeds_entry_count(raw in logs_strategy()) {
        let logs = snapshot(&raw);
        prop_assert!(aggregate(&logs).streak as usize <= logs.len());
    }

    #[test]
    fn input_order_does_not_matter(raw in logs_strategy()) {
        let mut deduped: Vec<(u64, f64)> = Vec::new();
        for (offset, hours) in &raw {
            deduped.retain(|(o, _)| o != offset);
            deduped.push((*offset, *hours));
        }
        let forward = aggregate(&snapshot(&deduped));
        let mut reversed = deduped.clone();
        reversed.reverse();
        prop_assert_eq!(forward, aggregate(&snapshot(&reversed)));
    }

    #[test]
    fn weekly_window_has_seven_points_and_carries_debt(
        raw in logs_strategy(),
        today_offset in 0u64..150,
    ) {
        let logs = snapshot(&raw);
        let summary = aggregate(&logs);
        let today = base() + Days::new(today_offset);
        let stats = build_weekly_stats(&logs, &summary.debt_by_date, today);

        prop_assert_eq!(stats.len(), 7);
        prop_assert_eq!(stats[6].date, today);
        for i in 0..7 {
            let stat = &stats[i];
            if logs.is_logged(stat.date) {
                prop_assert_eq!(Some(stat.debt), summary.debt_by_date.get(stat.date));
            } else {
                prop_assert_eq!(stat.hours, 0.0);
                if i > 0 {
                    prop_assert_eq!(stat.debt, stats[i - 1].debt);
                }
            }
        }
    }

    #[test]
    fn gaps_are_contiguous_and_end_yesterday(
        raw in logs_strategy(),
        today_offset in 0u64..150,
    ) {
        let logs = snapshot(&raw);
        let today = base() + Days::new(today_offset);
        let gaps = detect_gaps(&logs, today);

        for pair in gaps.windows(2) {
            prop_assert_eq!(pair[0] + Days::new(1), pair[1]);
        }
        if let Some(last_gap) = gaps.last() {
            prop_assert_eq!(*last_gap + Days::new(1), today);
            prop_assert!(!logs.is_logged(gaps[0]));
            prop_assert_eq!(logs.last_date().map(|d| d + Days::new(1)), Some(gaps[0]));
        }
        prop_assert_eq!(BackfillGate::from_logs(&logs, today).is_clear(), gaps.is_empty());
    }
}
