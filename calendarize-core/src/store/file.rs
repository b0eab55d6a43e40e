use std::path::{Path, PathBuf};

use super::{EventStore, MemoryStore};
use crate::error::{CalResult, CalendarizeError};
use crate::event::{EventId, OccurrenceIndex, PersistedEvent};

/// A `MemoryStore` kept as a JSON file, rewritten after every change.
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> CalResult<Self> {
        let inner = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                CalendarizeError::Serialization(format!("{}: {}", path.display(), e))
            })?
        } else {
            MemoryStore::new()
        };

        Ok(FileStore {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> CalResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(&self.inner)
            .map_err(|e| CalendarizeError::Serialization(e.to_string()))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;

        log::debug!("Saved event store to {}", self.path.display());
        Ok(())
    }

    /// Apply `change` and save. On any failure the in-memory state is put
    /// back, so it never runs ahead of the file.
    fn commit<T>(&mut self, change: impl FnOnce(&mut MemoryStore) -> CalResult<T>) -> CalResult<T> {
        let before = self.inner.clone();

        match change(&mut self.inner).and_then(|value| self.save().map(|()| value)) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.inner = before;
                Err(e)
            }
        }
    }
}

impl EventStore for FileStore {
    fn events(&self) -> CalResult<Vec<PersistedEvent>> {
        self.inner.events()
    }

    fn event(&self, uid: EventId) -> CalResult<Option<PersistedEvent>> {
        self.inner.event(uid)
    }

    fn insert_event(&mut self, event: PersistedEvent) -> CalResult<EventId> {
        self.commit(|inner| inner.insert_event(event))
    }

    fn update_event(&mut self, event: &PersistedEvent) -> CalResult<()> {
        self.commit(|inner| inner.update_event(event))
    }

    fn indices_for(&self, event: EventId) -> CalResult<Vec<OccurrenceIndex>> {
        self.inner.indices_for(event)
    }

    fn replace_indices(&mut self, event: EventId, indices: Vec<OccurrenceIndex>) -> CalResult<()> {
        self.commit(|inner| inner.replace_indices(event, indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event() -> PersistedEvent {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        PersistedEvent {
            uid: EventId(0),
            pid: 5,
            import_id: Some("A".to_string()),
            title: "Standup".to_string(),
            description: String::new(),
            location: String::new(),
            start: at,
            end: at,
            all_day: false,
            hidden: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("events.json")).unwrap();

        assert!(store.events().unwrap().is_empty());
    }

    #[test]
    fn test_changes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/events.json");

        let uid = {
            let mut store = FileStore::open(&path).unwrap();
            let uid = store.insert_event(event()).unwrap();
            let persisted = store.event(uid).unwrap().unwrap();
            store
                .replace_indices(uid, vec![OccurrenceIndex::for_event(&persisted)])
                .unwrap();
            uid
        };

        let mut reopened = FileStore::open(&path).unwrap();
        let persisted = reopened.event(uid).unwrap().unwrap();
        assert_eq!(persisted.title, "Standup");
        assert_eq!(reopened.indices_for(uid).unwrap().len(), 1);

        // Ids keep counting from where the previous session stopped
        let next = reopened.insert_event(event()).unwrap();
        assert!(next > uid);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_save_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the store directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let mut store = FileStore::open(&blocker.join("events.json")).unwrap();

        assert!(matches!(
            store.insert_event(event()),
            Err(CalendarizeError::Io(_))
        ));
        assert!(store.events().unwrap().is_empty());
    }

    #[test]
    fn test_failed_save_keeps_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let mut store = FileStore::open(&path).unwrap();
        let uid = store.insert_event(event()).unwrap();

        // Block the rename target with a directory
        let tmp = path.with_extension("json.tmp");
        std::fs::create_dir(&tmp).unwrap();

        let mut changed = store.event(uid).unwrap().unwrap();
        changed.title = "Moved".to_string();
        assert!(store.update_event(&changed).is_err());

        assert_eq!(store.event(uid).unwrap().unwrap().title, "Standup");
        std::fs::remove_dir(&tmp).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.event(uid).unwrap().unwrap().title, "Standup");
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(CalendarizeError::Serialization(_))
        ));
    }
}
