//! Event queries: upsert lookup, search and applicable index resolution.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::index::{Direction, IndexRepository, SortOrder};
use crate::error::CalResult;
use crate::event::{EventId, OccurrenceIndex, PersistedEvent};
use crate::settings::Settings;
use crate::store::EventStore;

/// Default scope of the scoped queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySettings {
    /// Containers to search; every container when empty
    pub storage_pids: Vec<u64>,
    pub include_hidden: bool,
}

impl QuerySettings {
    pub fn from_settings(settings: &Settings) -> Self {
        QuerySettings {
            storage_pids: settings.storage_pids.clone(),
            include_hidden: settings.include_hidden,
        }
    }

    fn respects_enable_fields(&self, event: &PersistedEvent) -> bool {
        self.include_hidden || !event.hidden
    }

    fn respects_storage_pids(&self, event: &PersistedEvent) -> bool {
        self.storage_pids.is_empty() || self.storage_pids.contains(&event.pid)
    }

    fn matches(&self, event: &PersistedEvent) -> bool {
        self.respects_enable_fields(event) && self.respects_storage_pids(event)
    }
}

pub struct EventRepository<'a, S: EventStore + ?Sized> {
    store: &'a S,
    settings: QuerySettings,
}

impl<'a, S: EventStore + ?Sized> EventRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_settings(store, QuerySettings::default())
    }

    pub fn with_settings(store: &'a S, settings: QuerySettings) -> Self {
        EventRepository { store, settings }
    }

    /// Find the event imported from `import_id`.
    ///
    /// Hidden events and events outside the storage pids are found too:
    /// a re-import must update them instead of creating a duplicate. When
    /// several events share the id, the one with the lowest id wins.
    pub fn find_by_import_id(&self, import_id: &str) -> CalResult<Option<PersistedEvent>> {
        Ok(self
            .store
            .events()?
            .into_iter()
            .find(|e| e.import_id.as_deref() == Some(import_id)))
    }

    /// Ids of the events whose title or description contains `term`,
    /// ignoring case. An empty term matches every event in scope.
    pub fn search_ids(&self, term: &str) -> CalResult<BTreeSet<EventId>> {
        let needle = term.to_lowercase();

        Ok(self
            .store
            .events()?
            .into_iter()
            .filter(|e| self.settings.matches(e))
            .filter(|e| {
                e.title.to_lowercase().contains(&needle)
                    || e.description.to_lowercase().contains(&needle)
            })
            .map(|e| e.uid)
            .collect())
    }

    /// Look up an event by id. Storage pids do not apply, the hidden flag does.
    pub fn find_by_uid(&self, uid: EventId) -> CalResult<Option<PersistedEvent>> {
        Ok(self
            .store
            .event(uid)?
            .filter(|e| self.settings.respects_enable_fields(e)))
    }

    /// Every event in scope, ordered by start time.
    pub fn find_all(&self) -> CalResult<Vec<PersistedEvent>> {
        let mut events: Vec<_> = self
            .store
            .events()?
            .into_iter()
            .filter(|e| self.settings.matches(e))
            .collect();
        events.sort_by_key(|e| (e.start, e.uid));
        Ok(events)
    }

    /// The occurrence to show for an event: the next one at or after `now`,
    /// or the most recent one when the event lies entirely in the past.
    ///
    /// Unknown events, events without indices and store failures all give
    /// `None`.
    pub fn resolve_applicable_index(
        &self,
        uid: EventId,
        now: DateTime<Utc>,
    ) -> Option<OccurrenceIndex> {
        let event = match self.find_by_uid(uid) {
            Ok(Some(event)) => event,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not load event {}: {}", uid, e);
                return None;
            }
        };

        let indices = IndexRepository::new(self.store);
        let result = indices
            .find_by_event_traversing(event.uid, Direction::Future, Some(1), SortOrder::Ascending, now)
            .and_then(|found| {
                if found.is_empty() {
                    indices.find_by_event_traversing(
                        event.uid,
                        Direction::Past,
                        Some(1),
                        SortOrder::Descending,
                        now,
                    )
                } else {
                    Ok(found)
                }
            });

        match result {
            Ok(found) => found.into_iter().next(),
            Err(e) => {
                log::warn!("Could not load indices of event {}: {}", uid, e);
                None
            }
        }
    }
}
