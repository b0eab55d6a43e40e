use anyhow::Result;
use calendarize_core::EventId;
use calendarize_core::repository::{EventRepository, QuerySettings};
use calendarize_core::settings::Settings;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use super::open_store;
use crate::render::Render;

pub fn run(settings: &Settings, event_id: EventId, now: DateTime<Utc>) -> Result<()> {
    let store = open_store(settings)?;
    let repo = EventRepository::with_settings(&store, QuerySettings::from_settings(settings));

    match repo.resolve_applicable_index(event_id, now) {
        Some(index) => {
            let label = if index.start >= now { "next" } else { "last" };
            println!("{} {}", label.bold(), index.render());
        }
        None => println!("{}", format!("No occurrence for event {}", event_id).dimmed()),
    }

    Ok(())
}
