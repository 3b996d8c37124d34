//! History persistence with file locking.
//!
//! The full history lives in one JSON file: an array of `DD/MM/YYYY`
//! strings in ascending order. A missing or unreadable file is treated
//! as an empty history; a file whose dates are out of order is sorted on
//! load rather than rejected.

use crate::{engine, CycleHistory, CycleRecord, Error, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Outcome of reading the history file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// No history file yet
    Missing,
    /// File read and parsed
    Loaded,
    /// File read, but its dates were out of order or repeated; the history
    /// was sorted and deduplicated in memory
    Normalized,
    /// File present but unusable; the history was reset to empty
    Corrupted(String),
}

/// Handle to the durable cycle history
#[derive(Clone, Debug)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Load the history, falling back to empty on any problem
    pub fn load(&self) -> CycleHistory {
        self.load_with_status().0
    }

    /// Load the history and report whether the file was missing or corrupted
    pub fn load_with_status(&self) -> (CycleHistory, LoadStatus) {
        if !self.path.exists() {
            tracing::info!("No history file at {:?}, starting empty", self.path);
            return (CycleHistory::new(), LoadStatus::Missing);
        }

        match self.read_locked() {
            Ok(records) => {
                let stored = records.len();
                let (history, changed) = CycleHistory::normalized(records);
                if changed {
                    tracing::warn!(
                        "History file {:?} was out of order ({} stored, {} distinct); sorted in memory",
                        self.path,
                        stored,
                        history.len()
                    );
                    return (history, LoadStatus::Normalized);
                }

                tracing::debug!(
                    "Loaded {} cycle records from {:?}",
                    history.len(),
                    self.path
                );
                (history, LoadStatus::Loaded)
            }
            Err(e) => {
                tracing::warn!(
                    "Unable to read history file {:?}: {}. Using empty history.",
                    self.path,
                    e
                );
                (CycleHistory::new(), LoadStatus::Corrupted(e.to_string()))
            }
        }
    }

    fn read_locked(&self) -> Result<Vec<CycleRecord>> {
        let file = File::open(&self.path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        read?;

        Ok(serde_json::from_str(&contents)?)
    }

    /// Overwrite the history file with the full history
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the existing file
    pub fn save(&self, history: &CycleHistory) -> Result<()> {
        write_atomically(&self.path, |writer| {
            serde_json::to_writer_pretty(&mut *writer, history)?;
            writer.write_all(b"\n")?;
            Ok(())
        })?;

        tracing::debug!("Saved {} cycle records to {:?}", history.len(), self.path);
        Ok(())
    }

    /// Record a new cycle start: load, validate, append and save while
    /// holding an exclusive lock, so two registrations cannot interleave.
    pub fn register(&self, candidate: NaiveDate, today: NaiveDate) -> Result<CycleHistory> {
        ensure_parent_dir(&self.path)?;

        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;

        let result = self.load_validate_save(candidate, today);

        // Lock is also released when the handle is dropped
        let _ = lock.unlock();
        result
    }

    fn load_validate_save(&self, candidate: NaiveDate, today: NaiveDate) -> Result<CycleHistory> {
        let history = self.load();
        let updated = engine::validate_and_append(&history, candidate, today)?;
        self.save(&updated)?;

        tracing::info!("Registered cycle start {}", candidate);
        Ok(updated)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write a file through a temp file and rename, so readers never see a
/// partially written file.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut std::io::BufWriter<&File>) -> Result<()>,
{
    ensure_parent_dir(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let temp = NamedTempFile::new_in(dir)?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;

    // Atomically replace the old file
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CycleError, CycleRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_history() -> CycleHistory {
        CycleHistory::from_records(vec![
            CycleRecord::new(date(2024, 1, 1)),
            CycleRecord::new(date(2024, 1, 29)),
            CycleRecord::new(date(2024, 2, 27)),
        ])
        .unwrap()
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(temp_dir.path().join("cycles.json"));

        let history = sample_history();
        store.save(&history).unwrap();

        let (loaded, status) = store.load_with_status();
        assert_eq!(status, LoadStatus::Loaded);
        assert_eq!(loaded, history);

        // Saving what was loaded changes nothing
        store.save(&loaded).unwrap();
        assert_eq!(store.load(), loaded);
    }

    #[test]
    fn test_file_format_is_date_array() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cycles.json");
        RecordStore::new(&path).save(&sample_history()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let values: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(values, vec!["01/01/2024", "29/01/2024", "27/02/2024"]);
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(temp_dir.path().join("nonexistent.json"));

        let (history, status) = store.load_with_status();
        assert!(history.is_empty());
        assert_eq!(status, LoadStatus::Missing);
    }

    #[test]
    fn test_corrupted_file_returns_empty() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cycles.json");
        let store = RecordStore::new(&path);

        for contents in [
            "{ invalid json }",
            r#"["01/01/2024", "not a date"]"#,
            r#"{"cycles": []}"#,
        ] {
            std::fs::write(&path, contents).unwrap();
            let (history, status) = store.load_with_status();
            assert!(history.is_empty(), "{contents}");
            assert!(matches!(status, LoadStatus::Corrupted(_)), "{contents}");
        }
    }

    #[test]
    fn test_unordered_file_keeps_its_records() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cycles.json");
        let store = RecordStore::new(&path);
        std::fs::write(&path, r#"["01/01/2024", "29/01/2024", "15/01/2024", "01/01/2024"]"#)
            .unwrap();

        let (history, status) = store.load_with_status();
        assert_eq!(status, LoadStatus::Normalized);
        assert_eq!(
            history.records(),
            &[
                CycleRecord::new(date(2024, 1, 1)),
                CycleRecord::new(date(2024, 1, 15)),
                CycleRecord::new(date(2024, 1, 29)),
            ]
        );

        // The next registration builds on the sorted records instead of
        // discarding them
        let updated = store.register(date(2024, 2, 26), date(2024, 3, 1)).unwrap();
        assert_eq!(updated.len(), 4);

        let raw = std::fs::read_to_string(&path).unwrap();
        let values: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            values,
            vec!["01/01/2024", "15/01/2024", "29/01/2024", "26/02/2024"]
        );
        assert_eq!(store.load_with_status().1, LoadStatus::Loaded);
    }

    #[test]
    fn test_empty_array_is_not_corruption() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cycles.json");
        std::fs::write(&path, "[]").unwrap();

        let (history, status) = RecordStore::new(&path).load_with_status();
        assert!(history.is_empty());
        assert_eq!(status, LoadStatus::Loaded);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("cycles.json");
        RecordStore::new(&path).save(&sample_history()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(temp_dir.path().join("cycles.json"));
        store.save(&sample_history()).unwrap();

        // Verify history file exists and no stray temp files remain
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "cycles.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only cycles.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_register_persists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(temp_dir.path().join("cycles.json"));
        let today = date(2024, 3, 1);

        store.register(date(2024, 1, 1), today).unwrap();
        let updated = store.register(date(2024, 1, 31), today).unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(store.load(), updated);
    }

    #[test]
    fn test_register_rejection_leaves_file_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(temp_dir.path().join("cycles.json"));
        let today = date(2024, 3, 1);
        store.register(date(2024, 2, 1), today).unwrap();

        let err = store.register(date(2024, 1, 1), today).unwrap_err();
        assert!(matches!(
            err,
            Error::Cycle(CycleError::NonMonotonic { .. })
        ));
        assert_eq!(store.load().len(), 1);
    }
}
