//! Event types: records parsed from a feed and what the store keeps of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier of a persisted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

/// Store-assigned identifier of an occurrence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EventId)
    }
}

/// One VEVENT as read from a feed, only alive for a single import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEventRecord {
    /// Externally assigned UID, not guaranteed unique across feeds
    pub uid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// DTSTART was a DATE value
    pub all_day: bool,
    pub title: String,
    pub description: String,
    pub location: String,
}

/// An event owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEvent {
    pub uid: EventId,
    /// Container the event was imported into
    pub pid: u64,
    /// UID of the feed event this record was imported from
    pub import_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    /// Disabled events stay in the store but drop out of scoped queries
    #[serde(default)]
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersistedEvent {
    /// Build a not yet stored event from an imported record.
    /// The store replaces `uid` on insert.
    pub fn from_record(record: &RawEventRecord, pid: u64, now: DateTime<Utc>) -> Self {
        PersistedEvent {
            uid: EventId(0),
            pid,
            import_id: Some(record.uid.clone()),
            title: record.title.clone(),
            description: record.description.clone(),
            location: record.location.clone(),
            start: record.start,
            end: record.end,
            all_day: record.all_day,
            hidden: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the imported fields, keeping identity and bookkeeping.
    pub fn apply_record(&mut self, record: &RawEventRecord, pid: u64, now: DateTime<Utc>) {
        self.pid = pid;
        self.title = record.title.clone();
        self.description = record.description.clone();
        self.location = record.location.clone();
        self.start = record.start;
        self.end = record.end;
        self.all_day = record.all_day;
        self.updated_at = now;
    }
}

impl fmt::Display for PersistedEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.title)
        }
    }
}

/// One concrete time instance of a persisted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceIndex {
    pub uid: IndexId,
    /// Owning event
    pub event: EventId,
    pub pid: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
}

impl OccurrenceIndex {
    /// The single occurrence of a non-recurring event.
    /// The store assigns `uid` when the index is written.
    pub fn for_event(event: &PersistedEvent) -> Self {
        OccurrenceIndex {
            uid: IndexId(0),
            event: event.uid,
            pid: event.pid,
            start: event.start,
            end: event.end,
            all_day: event.all_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> RawEventRecord {
        RawEventRecord {
            uid: "A".to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
            all_day: false,
            title: "Standup".to_string(),
            description: String::new(),
            location: "Room 1".to_string(),
        }
    }

    #[test]
    fn test_from_record_uses_uid_as_import_id() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let event = PersistedEvent::from_record(&record(), 5, now);

        assert_eq!(event.import_id.as_deref(), Some("A"));
        assert_eq!(event.pid, 5);
        assert_eq!(event.created_at, now);
        assert!(!event.hidden);
    }

    #[test]
    fn test_apply_record_keeps_identity() {
        let created = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut event = PersistedEvent::from_record(&record(), 5, created);
        event.uid = EventId(42);

        let mut changed = record();
        changed.title = "Retro".to_string();
        event.apply_record(&changed, 7, later);

        assert_eq!(event.uid, EventId(42));
        assert_eq!(event.title, "Retro");
        assert_eq!(event.pid, 7);
        assert_eq!(event.created_at, created);
        assert_eq!(event.updated_at, later);
    }

    #[test]
    fn test_event_id_from_str_trims() {
        assert_eq!(" 12 ".parse::<EventId>().unwrap(), EventId(12));
        assert!("abc".parse::<EventId>().is_err());
    }
}
