//! Storage of persisted events and their occurrence indices.
//!
//! The import flow never deletes events. Queries live in `crate::repository`;
//! a store only knows how to read and write records.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::CalResult;
use crate::event::{EventId, OccurrenceIndex, PersistedEvent};

pub trait EventStore {
    /// All events, hidden ones included, ordered by id.
    fn events(&self) -> CalResult<Vec<PersistedEvent>>;

    fn event(&self, uid: EventId) -> CalResult<Option<PersistedEvent>>;

    /// Store a new event and return the id assigned to it.
    /// Whatever `uid` the event carries is ignored.
    fn insert_event(&mut self, event: PersistedEvent) -> CalResult<EventId>;

    /// Overwrite an existing event, matched by `uid`.
    fn update_event(&mut self, event: &PersistedEvent) -> CalResult<()>;

    /// Indices of an event ordered by start time.
    fn indices_for(&self, event: EventId) -> CalResult<Vec<OccurrenceIndex>>;

    /// Replace every index of an event. Index ids are assigned by the store.
    fn replace_indices(&mut self, event: EventId, indices: Vec<OccurrenceIndex>) -> CalResult<()>;
}
