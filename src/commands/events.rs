use anyhow::Result;
use calendarize_core::PersistedEvent;
use calendarize_core::repository::{EventRepository, QuerySettings};
use calendarize_core::settings::Settings;
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;

use super::open_store;

pub fn run(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let repo = EventRepository::with_settings(&store, QuerySettings::from_settings(settings));

    let events = repo.find_all()?;
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut current_date: Option<String> = None;

    for event in &events {
        let date_label = format_date_label(event_date(event), today);

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label.bold());
            current_date = Some(date_label);
        }

        let tag = format!("[#{} pid {}]", event.uid, event.pid);
        println!("  {} {} {}", format_time(event), event, tag.dimmed());
    }

    Ok(())
}

/// All-day events keep their calendar date, timed ones are shown in local time
fn event_date(event: &PersistedEvent) -> NaiveDate {
    if event.all_day {
        event.start.date_naive()
    } else {
        event.start.with_timezone(&Local).date_naive()
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25 2026")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Format the time portion of an event (e.g. "15:00" or "all-day")
fn format_time(event: &PersistedEvent) -> String {
    if event.all_day {
        "all-day".to_string()
    } else {
        format!("{:>7}", event.start.with_timezone(&Local).format("%H:%M"))
    }
}
