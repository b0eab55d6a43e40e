//! Core of calendarize: importing iCalendar feeds and querying the imported events.
//!
//! - `feed` downloads a feed into a deterministic cache file
//! - `ics` turns the cached file into `RawEventRecord`s
//! - `import` drives both and fans every record out to registered handlers
//! - `persist` is the handler that upserts records into an `EventStore`
//! - `repository` answers lookups against the stored events and indices

pub mod error;
pub mod event;
pub mod feed;
pub mod ics;
pub mod import;
pub mod message;
pub mod persist;
pub mod repository;
pub mod settings;
pub mod store;

pub use error::{CalResult, CalendarizeError};
pub use event::{EventId, IndexId, OccurrenceIndex, PersistedEvent, RawEventRecord};
