use chrono::Datelike;
use clap::Subcommand;
use slumbersync_core::{month_calendar, today_local, Dashboard, DebtLevel, NightQuality};

use super::{open_tracker, print_json};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Debt, level, streak and missing days
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Last seven days of hours and debt
    Week {
        #[arg(long)]
        json: bool,
    },
    /// Month calendar of logged nights
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, user) = open_tracker()?;
    let today = today_local();

    match action {
        StatsAction::Status { json } => {
            let dashboard = tracker.load(today)?;
            if json {
                return print_json(&dashboard);
            }
            let summary = &dashboard.summary;
            println!("Welcome back, {}", user.display_name);
            println!(
                "Current sleep debt: {:.1}h ({})",
                summary.total_debt, summary.level
            );
            if summary.level != DebtLevel::Low {
                println!("Goal: {}h / night", dashboard.target_hours);
            }
            println!("Streak: {}", summary.streak);
            if dashboard.gate.is_clear() {
                println!("{}", today_line(&dashboard));
            } else {
                let gaps: Vec<String> = dashboard
                    .gate
                    .gaps()
                    .iter()
                    .map(|d| d.to_string())
                    .collect();
                println!("Missing days: {}", gaps.join(", "));
                println!("You can't log today's sleep until you fill in the gaps (`slumbersync backfill`).");
            }
        }
        StatsAction::Week { json } => {
            let dashboard = tracker.load(today)?;
            if json {
                return print_json(&dashboard.weekly);
            }
            println!("{:<10} {:<4} {:>6} {:>6}", "date", "day", "hours", "debt");
            for stat in &dashboard.weekly {
                let bar = "#".repeat(stat.hours.round().clamp(0.0, 24.0) as usize);
                println!(
                    "{:<10} {:<4} {:>6.1} {:>6.1}  {bar}",
                    stat.date.to_string(),
                    stat.day_name,
                    stat.hours,
                    stat.debt
                );
            }
        }
        StatsAction::Calendar { month, json } => {
            let (year, month) = match month {
                Some(raw) => parse_month(&raw)?,
                None => (today.year(), today.month()),
            };
            let calendar = month_calendar(&tracker.snapshot()?, year, month)
                .ok_or_else(|| format!("invalid month {year}-{month:02}"))?;
            if json {
                return print_json(&calendar);
            }

            println!("{} Progress", calendar.title());
            println!(" S  M  T  W  T  F  S");
            let mut line = "   ".repeat(calendar.leading_blanks as usize);
            let mut column = calendar.leading_blanks;
            for day in &calendar.days {
                line.push_str(&format!("{:>2}{}", day.date.day(), quality_mark(day.quality)));
                column += 1;
                if column % 7 == 0 {
                    println!("{}", line.trim_end());
                    line.clear();
                }
            }
            if !line.is_empty() {
                println!("{}", line.trim_end());
            }
            println!("+ 8h or more   ~ 6-8h   ! under 6h   . no data");
        }
    }
    Ok(())
}

/// Today's entry, read from the dashboard's own window.
fn today_line(dashboard: &Dashboard) -> String {
    let hours = dashboard
        .weekly
        .last()
        .filter(|_| dashboard.today_logged)
        .map(|stat| stat.hours);
    match hours {
        Some(hours) => format!("Today: {hours}h (run `slumbersync log` to edit)"),
        None => "Today: not logged yet".to_string(),
    }
}

fn quality_mark(quality: NightQuality) -> char {
    match quality {
        NightQuality::Rested => '+',
        NightQuality::Fair => '~',
        NightQuality::Short => '!',
        NightQuality::NoData => '.',
    }
}

fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    let (year, month) = raw
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got '{raw}'"))?;
    let year = year
        .parse()
        .map_err(|_| format!("invalid year in '{raw}'"))?;
    let month = month
        .parse()
        .map_err(|_| format!("invalid month in '{raw}'"))?;
    Ok((year, month))
}
