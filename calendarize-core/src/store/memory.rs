use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::EventStore;
use crate::error::{CalResult, CalendarizeError};
use crate::event::{EventId, IndexId, OccurrenceIndex, PersistedEvent};

/// In-memory store. Also the on-disk format of `FileStore`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    last_event_id: u64,
    #[serde(default)]
    last_index_id: u64,
    #[serde(default)]
    events: BTreeMap<EventId, PersistedEvent>,
    #[serde(default)]
    indices: BTreeMap<EventId, Vec<OccurrenceIndex>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventStore for MemoryStore {
    fn events(&self) -> CalResult<Vec<PersistedEvent>> {
        Ok(self.events.values().cloned().collect())
    }

    fn event(&self, uid: EventId) -> CalResult<Option<PersistedEvent>> {
        Ok(self.events.get(&uid).cloned())
    }

    fn insert_event(&mut self, mut event: PersistedEvent) -> CalResult<EventId> {
        self.last_event_id += 1;
        let uid = EventId(self.last_event_id);
        event.uid = uid;
        self.events.insert(uid, event);
        Ok(uid)
    }

    fn update_event(&mut self, event: &PersistedEvent) -> CalResult<()> {
        match self.events.get_mut(&event.uid) {
            Some(existing) => {
                *existing = event.clone();
                Ok(())
            }
            None => Err(CalendarizeError::Store(format!(
                "Cannot update unknown event {}",
                event.uid
            ))),
        }
    }

    fn indices_for(&self, event: EventId) -> CalResult<Vec<OccurrenceIndex>> {
        Ok(self.indices.get(&event).cloned().unwrap_or_default())
    }

    fn replace_indices(
        &mut self,
        event: EventId,
        mut indices: Vec<OccurrenceIndex>,
    ) -> CalResult<()> {
        if !self.events.contains_key(&event) {
            return Err(CalendarizeError::Store(format!(
                "Cannot index unknown event {}",
                event
            )));
        }

        for index in &mut indices {
            self.last_index_id += 1;
            index.uid = IndexId(self.last_index_id);
            index.event = event;
        }
        indices.sort_by_key(|i| i.start);

        self.indices.insert(event, indices);
        Ok(())
    }
}
