use anyhow::Result;
use calendarize_core::repository::{EventRepository, QuerySettings};
use calendarize_core::settings::Settings;
use owo_colors::OwoColorize;

use super::open_store;

pub fn run(settings: &Settings, term: &str) -> Result<()> {
    let store = open_store(settings)?;
    let repo = EventRepository::with_settings(&store, QuerySettings::from_settings(settings));

    let ids = repo.search_ids(term)?;
    if ids.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for id in ids {
        println!("{}", id);
    }

    Ok(())
}
