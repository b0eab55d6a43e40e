//! The import handler that writes imported events into an `EventStore`.

use chrono::{DateTime, Utc};

use crate::error::{CalResult, CalendarizeError};
use crate::event::{EventId, OccurrenceIndex, PersistedEvent, RawEventRecord};
use crate::import::{ImportHandler, ImportSignal};
use crate::repository::EventRepository;
use crate::store::EventStore;

/// Upserts every imported event by its UID.
///
/// Re-importing an event overwrites the stored copy (last write wins) and
/// rebuilds its occurrence index. Signals another handler already handled
/// are left alone.
///
/// The event and its index are two separate store writes. When the index
/// write fails the event stays stored without an index and the upsert
/// returns the error; the next import of the same UID finds the event and
/// writes the index again.
pub struct PersistHandler<'s, S: EventStore + ?Sized> {
    store: &'s mut S,
    clock: fn() -> DateTime<Utc>,
    created: usize,
    updated: usize,
}

/// What a single upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created(EventId),
    Updated(EventId),
}

impl<'s, S: EventStore + ?Sized> PersistHandler<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self::with_clock(store, Utc::now)
    }

    pub fn with_clock(store: &'s mut S, clock: fn() -> DateTime<Utc>) -> Self {
        PersistHandler {
            store,
            clock,
            created: 0,
            updated: 0,
        }
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn updated(&self) -> usize {
        self.updated
    }

    pub fn upsert(&mut self, record: &RawEventRecord, pid: u64) -> CalResult<Upsert> {
        let now = (self.clock)();
        let existing = EventRepository::new(&*self.store).find_by_import_id(&record.uid)?;

        let (event, outcome) = match existing {
            Some(mut event) => {
                event.apply_record(record, pid, now);
                self.store.update_event(&event)?;
                let uid = event.uid;
                (event, Upsert::Updated(uid))
            }
            None => {
                let uid = self
                    .store
                    .insert_event(PersistedEvent::from_record(record, pid, now))?;
                let event = self.store.event(uid)?.ok_or_else(|| {
                    CalendarizeError::Store(format!("Event {} missing after insert", uid))
                })?;
                (event, Upsert::Created(uid))
            }
        };

        self.store
            .replace_indices(event.uid, vec![OccurrenceIndex::for_event(&event)])?;

        match outcome {
            Upsert::Created(_) => self.created += 1,
            Upsert::Updated(_) => self.updated += 1,
        }
        log::debug!("{:?} event '{}' from import id {}", outcome, event, record.uid);

        Ok(outcome)
    }
}

impl<S: EventStore + ?Sized> ImportHandler for PersistHandler<'_, S> {
    fn handle(&mut self, signal: &mut ImportSignal<'_>) -> bool {
        if signal.handled {
            return false;
        }

        match self.upsert(signal.event, signal.pid) {
            Ok(_) => true,
            Err(e) => {
                signal.messages.error(
                    "Store",
                    format!("Could not store \"{}\" (UID {}): {}", signal.event.title, signal.event.uid, e),
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Messages, Severity};
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn record(uid: &str, title: &str) -> RawEventRecord {
        RawEventRecord {
            uid: uid.to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
            all_day: false,
            title: title.to_string(),
            description: String::new(),
            location: String::new(),
        }
    }

    #[test]
    fn test_upsert_creates_then_updates_same_identity() {
        let mut store = MemoryStore::new();
        let mut handler = PersistHandler::with_clock(&mut store, fixed_now);

        let first = handler.upsert(&record("A", "Standup"), 5).unwrap();
        let second = handler.upsert(&record("A", "Standup (moved)"), 6).unwrap();

        let Upsert::Created(uid) = first else {
            panic!("Expected a created event, got {:?}", first);
        };
        assert_eq!(second, Upsert::Updated(uid));
        assert_eq!((handler.created(), handler.updated()), (1, 1));

        let stored = store.event(uid).unwrap().unwrap();
        assert_eq!(stored.title, "Standup (moved)");
        assert_eq!(stored.pid, 6);
        assert_eq!(store.len(), 1);
        assert_eq!(store.indices_for(uid).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_updates_hidden_events() {
        let mut store = MemoryStore::new();
        let uid = {
            let mut handler = PersistHandler::with_clock(&mut store, fixed_now);
            match handler.upsert(&record("A", "Standup"), 5).unwrap() {
                Upsert::Created(uid) => uid,
                other => panic!("Expected a created event, got {:?}", other),
            }
        };
        let mut hidden = store.event(uid).unwrap().unwrap();
        hidden.hidden = true;
        store.update_event(&hidden).unwrap();

        let mut handler = PersistHandler::with_clock(&mut store, fixed_now);
        assert_eq!(
            handler.upsert(&record("A", "Standup"), 5).unwrap(),
            Upsert::Updated(uid)
        );
    }

    #[test]
    fn test_index_follows_event_times() {
        let mut store = MemoryStore::new();
        let mut handler = PersistHandler::with_clock(&mut store, fixed_now);
        let Upsert::Created(uid) = handler.upsert(&record("A", "Standup"), 5).unwrap() else {
            panic!("Expected a created event");
        };

        let index = &store.indices_for(uid).unwrap()[0];
        assert_eq!(index.event, uid);
        assert_eq!(index.pid, 5);
        assert_eq!(index.start, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_handle_skips_already_handled_signals() {
        let mut store = MemoryStore::new();
        let mut messages = Messages::new();
        let event = record("A", "Standup");
        {
            let mut handler = PersistHandler::with_clock(&mut store, fixed_now);
            let mut signal = ImportSignal {
                event: &event,
                pid: 5,
                handled: true,
                messages: &mut messages,
            };
            assert!(!handler.handle(&mut signal));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_handle_reports_store_errors_as_messages() {
        struct ReadOnly(MemoryStore);

        impl EventStore for ReadOnly {
            fn events(&self) -> CalResult<Vec<PersistedEvent>> {
                self.0.events()
            }
            fn event(&self, uid: EventId) -> CalResult<Option<PersistedEvent>> {
                self.0.event(uid)
            }
            fn insert_event(&mut self, _event: PersistedEvent) -> CalResult<EventId> {
                Err(CalendarizeError::Store("read-only".into()))
            }
            fn update_event(&mut self, _event: &PersistedEvent) -> CalResult<()> {
                Err(CalendarizeError::Store("read-only".into()))
            }
            fn indices_for(&self, event: EventId) -> CalResult<Vec<OccurrenceIndex>> {
                self.0.indices_for(event)
            }
            fn replace_indices(&mut self, _event: EventId, _indices: Vec<OccurrenceIndex>) -> CalResult<()> {
                Err(CalendarizeError::Store("read-only".into()))
            }
        }

        let mut store = ReadOnly(MemoryStore::new());
        let mut messages = Messages::new();
        let event = record("A", "Standup");
        let mut handler = PersistHandler::new(&mut store);
        let mut signal = ImportSignal {
            event: &event,
            pid: 5,
            handled: false,
            messages: &mut messages,
        };

        assert!(!handler.handle(&mut signal));
        assert_eq!(messages.count(Severity::Error), 1);
    }

    #[test]
    fn test_failed_index_write_is_repaired_by_next_upsert() {
        struct FlakyIndices {
            inner: MemoryStore,
            fail_indices: bool,
        }

        impl EventStore for FlakyIndices {
            fn events(&self) -> CalResult<Vec<PersistedEvent>> {
                self.inner.events()
            }
            fn event(&self, uid: EventId) -> CalResult<Option<PersistedEvent>> {
                self.inner.event(uid)
            }
            fn insert_event(&mut self, event: PersistedEvent) -> CalResult<EventId> {
                self.inner.insert_event(event)
            }
            fn update_event(&mut self, event: &PersistedEvent) -> CalResult<()> {
                self.inner.update_event(event)
            }
            fn indices_for(&self, event: EventId) -> CalResult<Vec<OccurrenceIndex>> {
                self.inner.indices_for(event)
            }
            fn replace_indices(&mut self, event: EventId, indices: Vec<OccurrenceIndex>) -> CalResult<()> {
                if self.fail_indices {
                    return Err(CalendarizeError::Store("disk full".into()));
                }
                self.inner.replace_indices(event, indices)
            }
        }

        let mut store = FlakyIndices {
            inner: MemoryStore::new(),
            fail_indices: true,
        };

        {
            let mut handler = PersistHandler::with_clock(&mut store, fixed_now);
            assert!(handler.upsert(&record("A", "Standup"), 5).is_err());
            assert_eq!(handler.created(), 0);
        }
        let stored = store.inner.events().unwrap();
        assert_eq!(stored.len(), 1);
        let uid = stored[0].uid;
        assert!(store.inner.indices_for(uid).unwrap().is_empty());

        store.fail_indices = false;
        let mut handler = PersistHandler::with_clock(&mut store, fixed_now);
        assert_eq!(
            handler.upsert(&record("A", "Standup"), 5).unwrap(),
            Upsert::Updated(uid)
        );
        assert_eq!(store.inner.indices_for(uid).unwrap().len(), 1);
    }
}
