//! Persistence for the task collection
//!
//! The collection is stored under a single key, `tasks`, as one JSON array and is
//! rewritten in full on every save. [`FileStore`] keeps each key in its own file
//! inside a data directory; [`MemoryStore`] keeps the serialized payload in memory.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::task::Task;

/// Storage key the collection lives under
pub const STORAGE_KEY: &str = "tasks";

/// Load/save port for the task collection
pub trait TaskStore {
    /// Read the persisted collection, empty when nothing usable is stored
    fn load(&self) -> Vec<Task>;

    /// Replace the persisted collection with `tasks`
    fn save(&mut self, tasks: &[Task]) -> Result<()>;
}

/// Decode a stored payload.
///
/// Absent data, or a payload that is not a JSON array, yields an empty
/// collection. Inside an array each record is decoded on its own: records that
/// do not fit the task shape are dropped with a warning and the rest are kept.
pub fn decode(raw: Option<&str>) -> Vec<Task> {
    decode_lossy(raw).0
}

/// Decoded tasks plus whether anything stored had to be thrown away
fn decode_lossy(raw: Option<&str>) -> (Vec<Task>, bool) {
    let Some(raw) = raw else {
        debug!("decode: nothing stored, starting empty");
        return (Vec::new(), false);
    };
    let records: Vec<Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Stored tasks could not be parsed, starting empty: {}", e);
            return (Vec::new(), true);
        }
    };
    let stored = records.len();
    let tasks: Vec<Task> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(e) => {
                warn!("Dropping stored task record {}: {}", index, e);
                None
            }
        })
        .collect();
    let lossy = tasks.len() < stored;
    (tasks, lossy)
}

pub fn encode(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Directory-backed store, one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", STORAGE_KEY))
    }

    /// Copy of the stored file taken when loading had to drop data
    pub fn backup_path(&self) -> PathBuf {
        self.path().with_extension("json.bak")
    }
}

impl TaskStore for FileStore {
    fn load(&self) -> Vec<Task> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        };
        let (tasks, lossy) = decode_lossy(raw.as_deref());
        if lossy {
            let backup = self.backup_path();
            match fs::copy(&path, &backup) {
                Ok(_) => warn!("Kept the unreadable data in {}", backup.display()),
                Err(e) => warn!("Failed to back up {} to {}: {}", path.display(), backup.display(), e),
            }
        }
        info!("Loaded {} tasks from {}", tasks.len(), path.display());
        tasks
    }

    fn save(&mut self, tasks: &[Task]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, encode(tasks)?)?;
        fs::rename(&tmp, &path)?;
        debug!(count = tasks.len(), path = %path.display(), "FileStore::save: wrote tasks");
        Ok(())
    }
}

/// In-memory store holding the serialized payload, for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Option<String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-serialized payload, valid or not
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            writes: 0,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Number of saves since creation
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Vec<Task> {
        decode(self.raw.as_deref())
    }

    fn save(&mut self, tasks: &[Task]) -> Result<()> {
        self.raw = Some(encode(tasks)?);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Status;
    use tempfile::TempDir;

    fn sample() -> Vec<Task> {
        vec![
            Task {
                id: 1,
                title: "Write report".to_string(),
                description: "Quarterly numbers".to_string(),
                due_date: "2024-01-10".to_string(),
                status: Status::Pending,
            },
            Task {
                id: 2,
                title: "Review PR".to_string(),
                description: "Storage rewrite".to_string(),
                due_date: "2024-01-05".to_string(),
                status: Status::InProgress,
            },
        ]
    }

    #[test]
    fn test_decode_missing_is_empty() {
        assert!(decode(None).is_empty());
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert!(decode(Some("not json")).is_empty());
        assert!(decode(Some("{\"tasks\": 1}")).is_empty());
        assert!(decode(Some("[{\"id\": 1, \"status\": \"done\"}]")).is_empty());
    }

    #[test]
    fn test_decode_keeps_good_records_next_to_bad_ones() {
        let raw = r#"[
            {"id":1,"title":"Write report","description":"d","dueDate":"2024-01-10","status":"pending"},
            {"id":2,"title":"Review PR","description":"d","dueDate":"2024-01-05","status":"done"},
            {"id":3,"title":"Plan sprint","description":"d","dueDate":"2024-01-07","status":"completed"},
            "stray"
        ]"#;
        let ids: Vec<_> = decode(Some(raw)).iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[test]
    fn test_file_store_mixed_records_survive_next_save() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());
        let raw = r#"[{"id":1,"title":"t","description":"d","dueDate":"2024-01-10","status":"pending"},
                      {"id":2,"title":"t","description":"d","dueDate":"2024-01-05","status":"done"}]"#;
        fs::write(store.path(), raw).unwrap();

        let tasks = store.load();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 1);
        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), raw);

        store.save(&tasks).unwrap();
        assert_eq!(store.load(), tasks);
    }

    #[test]
    fn test_file_store_clean_load_takes_no_backup() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn test_file_store_corrupt_file_is_backed_up() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(store.path(), "[{\"id\":").unwrap();
        assert!(store.load().is_empty());
        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), "[{\"id\":");
    }

    #[test]
    fn test_decode_reads_record_shape() {
        let raw = r#"[{"id":1700000000000,"title":"t","description":"d","dueDate":"2024-01-10","status":"in-progress"}]"#;
        let tasks = decode(Some(raw));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 1_700_000_000_000);
        assert_eq!(tasks[0].due_date, "2024-01-10");
        assert_eq!(tasks[0].status, Status::InProgress);
    }

    #[test]
    fn test_file_store_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("data"));
        store.save(&sample()).unwrap();

        assert!(store.path().ends_with("tasks.json"));
        assert_eq!(FileStore::new(store.dir()).load(), sample());
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_save_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());
        store.save(&sample()).unwrap();
        store.save(&sample()[1..]).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 2);
    }

    #[test]
    fn test_file_store_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(store.path(), "[{\"id\":").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        assert_eq!(store.raw(), None);
        store.save(&sample()).unwrap();
        store.save(&sample()).unwrap();
        assert_eq!(store.writes(), 2);
        assert_eq!(store.load(), sample());
    }
}
