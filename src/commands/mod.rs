pub mod events;
pub mod import;
pub mod next;
pub mod search;
pub mod show;

use anyhow::{Context, Result};
use calendarize_core::settings::Settings;
use calendarize_core::store::FileStore;

/// Open the event store configured in `settings`.
pub fn open_store(settings: &Settings) -> Result<FileStore> {
    let path = settings.store_path();
    FileStore::open(&path).with_context(|| format!("Failed to open {}", path.display()))
}
