//! Month calendar grid with a per-night quality rating.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::entry::LogSnapshot;

/// Nights at or above this many hours count as rested.
pub const RESTED_HOURS: f64 = 8.0;
/// Nights below this many hours count as short.
pub const SHORT_HOURS: f64 = 6.0;

/// Rating of one logged night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightQuality {
    /// 8h or more
    Rested,
    /// 6h up to 8h
    Fair,
    /// Under 6h
    Short,
    NoData,
}

impl NightQuality {
    pub fn from_hours(hours: Option<f64>) -> Self {
        match hours {
            None => Self::NoData,
            Some(h) if h >= RESTED_HOURS => Self::Rested,
            Some(h) if h < SHORT_HOURS => Self::Short,
            Some(_) => Self::Fair,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub hours: Option<f64>,
    pub quality: NightQuality,
}

/// A month laid out Sunday-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    /// Empty slots before the 1st (0 when the month starts on Sunday).
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthCalendar {
    /// Month name, e.g. `March`.
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

/// Lay out `year-month`. Returns `None` for an invalid month.
pub fn month_calendar(logs: &LogSnapshot, year: i32, month: u32) -> Option<MonthCalendar> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| {
            let hours = logs.hours_on(date);
            CalendarDay {
                date,
                hours,
                quality: NightQuality::from_hours(hours),
            }
        })
        .collect();

    Some(MonthCalendar {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    })
}
