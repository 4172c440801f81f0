//! Missing-day detection.
//!
//! A gap date is a calendar day strictly after the latest logged day and
//! strictly before today. Today is never a gap: it is logged through its own
//! path once the gaps are filled.

use chrono::{Days, NaiveDate};

use super::entry::LogSnapshot;

/// Return every unlogged date between the latest entry and `today`, both
/// exclusive, in ascending order.
///
/// An empty log has no gaps, and neither does a log whose latest entry is on
/// or after `today`.
pub fn detect_gaps(logs: &LogSnapshot, today: NaiveDate) -> Vec<NaiveDate> {
    let Some(last) = logs.last_date() else {
        return Vec::new();
    };

    let mut gaps = Vec::new();
    let mut pointer = last.checked_add_days(Days::new(1));
    while let Some(date) = pointer {
        if date >= today {
            break;
        }
        gaps.push(date);
        pointer = date.checked_add_days(Days::new(1));
    }
    gaps
}
