//! Writing sleep entries: today's night and backfilled gaps.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use chrono::NaiveDate;
use slumbersync_core::sleep::parse_date;
use slumbersync_core::{today_local, Dashboard};

use super::open_tracker;

/// Record last night's sleep for today.
pub fn run_today(hours: String) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, _user) = open_tracker()?;
    let today = today_local();
    let was_logged = tracker.snapshot()?.is_logged(today);

    let dashboard = tracker.submit_today(today, &hours).map_err(|e| {
        if matches!(e, slumbersync_core::CoreError::Gate(_)) {
            format!("{e}\nRun `slumbersync backfill` to fill them in.").into()
        } else {
            Box::<dyn std::error::Error>::from(e)
        }
    })?;

    let verb = if was_logged { "Updated" } else { "Saved" };
    let logged = dashboard
        .weekly
        .last()
        .map(|s| s.hours)
        .unwrap_or_default();
    println!("{verb} {logged}h for {today}");
    print_totals(&dashboard);
    Ok(())
}

/// Fill in every missing day.
///
/// Values come from `DATE=HOURS` arguments; with no arguments each gap date
/// is prompted for on stdin.
pub fn run_backfill(entries: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, _user) = open_tracker()?;
    let today = today_local();

    let inputs = if entries.is_empty() {
        let gaps = tracker.load(today)?.gate.gaps().to_vec();
        if gaps.is_empty() {
            println!("No missing days.");
            return Ok(());
        }
        prompt_for(&gaps)?
    } else {
        parse_pairs(&entries)?
    };

    let dashboard = tracker.submit_backfill(today, &inputs)?;
    println!("Filled {} missing day(s).", inputs.len());
    print_totals(&dashboard);
    Ok(())
}

/// List pending gap dates.
pub fn run_gaps(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, _user) = open_tracker()?;
    let dashboard = tracker.load(today_local())?;
    let gaps = dashboard.gate.gaps();

    if json {
        return super::print_json(&gaps);
    }
    if gaps.is_empty() {
        println!("No missing days.");
    } else {
        for date in gaps {
            println!("{date}");
        }
    }
    Ok(())
}

fn parse_pairs(entries: &[String]) -> Result<BTreeMap<NaiveDate, String>, Box<dyn std::error::Error>> {
    let mut inputs = BTreeMap::new();
    for entry in entries {
        let (date, hours) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected DATE=HOURS, got '{entry}'"))?;
        inputs.insert(parse_date(date)?, hours.trim().to_string());
    }
    Ok(inputs)
}

fn prompt_for(gaps: &[NaiveDate]) -> Result<BTreeMap<NaiveDate, String>, Box<dyn std::error::Error>> {
    println!("Wait! Missing data. Enter hours slept for each day:");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut inputs = BTreeMap::new();

    for date in gaps {
        print!("  {date}: ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if !line.trim().is_empty() {
            inputs.insert(*date, line.trim().to_string());
        }
    }
    Ok(inputs)
}

fn print_totals(dashboard: &Dashboard) {
    println!(
        "Sleep debt: {:.1}h ({}), streak: {}",
        dashboard.summary.total_debt, dashboard.summary.level, dashboard.summary.streak
    );
}
