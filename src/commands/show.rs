use anyhow::Result;
use calendarize_core::repository::{EventRepository, QuerySettings};
use calendarize_core::settings::Settings;
use chrono::Utc;
use owo_colors::OwoColorize;

use super::open_store;
use crate::render::Render;

pub fn run(settings: &Settings, import_id: &str) -> Result<()> {
    let store = open_store(settings)?;
    let repo = EventRepository::with_settings(&store, QuerySettings::from_settings(settings));

    let Some(event) = repo.find_by_import_id(import_id)? else {
        println!("{}", format!("No event imported from {}", import_id).dimmed());
        return Ok(());
    };

    println!("{}", event.render());
    if let Some(index) = repo.resolve_applicable_index(event.uid, Utc::now()) {
        println!("   {} {}", "occurrence:".dimmed(), index.render());
    }

    Ok(())
}
