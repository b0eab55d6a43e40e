//! Occurrence index queries.

use chrono::{DateTime, Utc};

use crate::error::CalResult;
use crate::event::{EventId, OccurrenceIndex};
use crate::store::EventStore;

/// Which side of "now" to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// start >= now
    Future,
    /// start < now
    Past,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

pub struct IndexRepository<'a, S: EventStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: EventStore + ?Sized> IndexRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        IndexRepository { store }
    }

    /// Indices of `event` on the given side of `now`, sorted by start time.
    pub fn find_by_event_traversing(
        &self,
        event: EventId,
        direction: Direction,
        limit: Option<usize>,
        order: SortOrder,
        now: DateTime<Utc>,
    ) -> CalResult<Vec<OccurrenceIndex>> {
        let mut indices: Vec<OccurrenceIndex> = self
            .store
            .indices_for(event)?
            .into_iter()
            .filter(|index| match direction {
                Direction::Future => index.start >= now,
                Direction::Past => index.start < now,
                Direction::All => true,
            })
            .collect();

        indices.sort_by_key(|index| index.start);
        if order == SortOrder::Descending {
            indices.reverse();
        }
        if let Some(limit) = limit {
            indices.truncate(limit);
        }

        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{IndexId, PersistedEvent};
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
    }

    fn store_with_days(days: &[u32]) -> (MemoryStore, EventId) {
        let mut store = MemoryStore::new();
        let event = PersistedEvent {
            uid: EventId(0),
            pid: 1,
            import_id: None,
            title: "Weekly".to_string(),
            description: String::new(),
            location: String::new(),
            start: day(1),
            end: day(1),
            all_day: false,
            hidden: false,
            created_at: day(1),
            updated_at: day(1),
        };
        let uid = store.insert_event(event).unwrap();
        let indices = days
            .iter()
            .map(|d| OccurrenceIndex {
                uid: IndexId(0),
                event: uid,
                pid: 1,
                start: day(*d),
                end: day(*d),
                all_day: false,
            })
            .collect();
        store.replace_indices(uid, indices).unwrap();
        (store, uid)
    }

    fn starts(indices: &[OccurrenceIndex]) -> Vec<DateTime<Utc>> {
        indices.iter().map(|i| i.start).collect()
    }

    #[test]
    fn test_future_includes_now() {
        let (store, uid) = store_with_days(&[1, 5, 10]);
        let repo = IndexRepository::new(&store);

        let found = repo
            .find_by_event_traversing(uid, Direction::Future, None, SortOrder::Ascending, day(5))
            .unwrap();

        assert_eq!(starts(&found), vec![day(5), day(10)]);
    }

    #[test]
    fn test_past_descending_with_limit() {
        let (store, uid) = store_with_days(&[1, 2, 3, 10]);
        let repo = IndexRepository::new(&store);

        let found = repo
            .find_by_event_traversing(uid, Direction::Past, Some(2), SortOrder::Descending, day(5))
            .unwrap();

        assert_eq!(starts(&found), vec![day(3), day(2)]);
    }

    #[test]
    fn test_all_directions() {
        let (store, uid) = store_with_days(&[3, 1, 2]);
        let repo = IndexRepository::new(&store);

        let found = repo
            .find_by_event_traversing(uid, Direction::All, None, SortOrder::Ascending, day(2))
            .unwrap();

        assert_eq!(starts(&found), vec![day(1), day(2), day(3)]);
    }
}
