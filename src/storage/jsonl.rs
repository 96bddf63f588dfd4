//! Append-only JSONL audit store
//!
//! Each record is written as a single JSON line and flushed immediately.
//! Reads are served from an in-memory cache loaded when the store is opened.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AuditError, AuditResult};
use crate::models::AuditRecord;

use super::memory::MemoryStore;
use super::query::{FindOptions, IndexField, RecordQuery};
use super::AuditStore;

/// Audit store backed by a line-delimited JSON file
pub struct JsonlStore {
    /// Path to the audit log file
    log_path: PathBuf,
    cache: MemoryStore,
    /// Serializes appends so lines never interleave
    append_lock: Mutex<()>,
}

impl JsonlStore {
    /// Open the store, loading any records already in the file
    ///
    /// A missing file is an empty store; it is created on first insert.
    pub fn open(log_path: impl Into<PathBuf>) -> AuditResult<Self> {
        let log_path = log_path.into();
        let cache = MemoryStore::new();

        for record in read_records(&log_path)? {
            cache.insert(&record)?;
        }

        tracing::debug!(path = %log_path.display(), "opened audit log");

        Ok(Self {
            log_path,
            cache,
            append_lock: Mutex::new(()),
        })
    }

    /// Check if the audit log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Get the path to the audit log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuditError::Persistence(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AuditError::Persistence(format!("Failed to open audit log: {}", e)))?;

        let json = serde_json::to_string(record).map_err(|e| {
            AuditError::Persistence(format!("Failed to serialize audit record: {}", e))
        })?;

        writeln!(file, "{}", json)
            .map_err(|e| AuditError::Persistence(format!("Failed to write audit record: {}", e)))?;

        file.flush()
            .map_err(|e| AuditError::Persistence(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }
}

impl AuditStore for JsonlStore {
    fn insert(&self, record: &AuditRecord) -> AuditResult<()> {
        record.validate()?;

        let _guard = self.append_lock.lock().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire append lock: {}", e))
        })?;

        if self.cache.contains(record.id)? {
            return Err(AuditError::Persistence(format!(
                "Duplicate audit record id: {}",
                record.id.as_uuid()
            )));
        }

        self.append(record)?;
        self.cache.insert(record)
    }

    fn find(&self, query: &RecordQuery, options: &FindOptions) -> AuditResult<Vec<AuditRecord>> {
        self.cache.find(query, options)
    }

    fn count(&self, query: &RecordQuery) -> AuditResult<u64> {
        self.cache.count(query)
    }

    fn ensure_index(&self, field: IndexField) -> AuditResult<()> {
        self.cache.ensure_index(field)
    }
}

/// Read every record from a JSONL file, oldest first
fn read_records(path: &Path) -> AuditResult<Vec<AuditRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))?;

    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            AuditError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
        })?;

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let record: AuditRecord = serde_json::from_str(&line).map_err(|e| {
            AuditError::Json(format!(
                "Failed to parse audit record at line {}: {}",
                line_num + 1,
                e
            ))
        })?;

        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Action;
    use crate::storage::query::SortSpec;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_store() -> (JsonlStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlStore::open(temp_dir.path().join("auditlog.jsonl")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_insert_and_read() {
        let (store, _temp) = create_test_store();
        store.insert(&AuditRecord::insert(Some("u1"), "orders", "o1")).unwrap();

        let records = store.find(&RecordQuery::all(), &FindOptions::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Insert);
        assert_eq!(records[0].collection, "orders");
    }

    #[test]
    fn test_one_line_per_record() {
        let (store, temp) = create_test_store();
        for i in 0..5 {
            store
                .insert(&AuditRecord::insert(None, "orders", format!("o{}", i)))
                .unwrap();
        }

        let contents = fs::read_to_string(temp.path().join("auditlog.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 5);
        assert_eq!(store.count(&RecordQuery::all()).unwrap(), 5);
    }

    #[test]
    fn test_empty_log() {
        let (store, _temp) = create_test_store();

        assert!(!store.exists());
        assert_eq!(store.count(&RecordQuery::all()).unwrap(), 0);
    }

    #[test]
    fn test_survives_restart() {
        let (store, temp) = create_test_store();
        store.insert(&AuditRecord::insert(Some("u1"), "orders", "o1")).unwrap();
        store
            .insert(&AuditRecord::update(Some("u1"), "orders", "o1", vec![]))
            .unwrap();
        drop(store);

        // Reopen the same file
        let reopened = JsonlStore::open(temp.path().join("auditlog.jsonl")).unwrap();
        let records = reopened
            .find(&RecordQuery::all(), &FindOptions::new(SortSpec::newest_first()))
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action, Action::Update);
        assert_eq!(records[0].delta, Some(vec![]));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("auditlog.jsonl");
        let record = AuditRecord::remove(None, "orders", "o1");
        fs::write(
            &path,
            format!("\n{}\n\n", serde_json::to_string(&record).unwrap()),
        )
        .unwrap();

        let store = JsonlStore::open(&path).unwrap();
        assert_eq!(store.count(&RecordQuery::all()).unwrap(), 1);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("auditlog.jsonl");
        let record = AuditRecord::remove(None, "orders", "o1");
        fs::write(
            &path,
            format!("{}\nnot json\n", serde_json::to_string(&record).unwrap()),
        )
        .unwrap();

        let err = JsonlStore::open(&path).err().unwrap();
        assert!(matches!(err, AuditError::Json(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("auditlog.jsonl");
        let store = JsonlStore::open(&path).unwrap();

        store.insert(&AuditRecord::insert(None, "orders", "o1")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_record_not_written() {
        let (store, temp) = create_test_store();
        let mut record = AuditRecord::insert(None, "orders", "o1");
        record.delta = Some(vec![]);

        assert!(store.insert(&record).is_err());
        assert!(!temp.path().join("auditlog.jsonl").exists());
    }
}
