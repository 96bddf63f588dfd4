//! In-memory audit store
//!
//! Keeps records in insertion order behind a `RwLock`, with optional hash
//! indexes on `userId` and `docId`.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::error::{AuditError, AuditResult};
use crate::models::{AuditRecord, RecordId};

use super::query::{FindOptions, IndexField, RecordQuery, SortDirection};
use super::AuditStore;

#[derive(Debug, Default)]
struct MemoryData {
    records: Vec<AuditRecord>,
    ids: HashSet<RecordId>,
    indexes: HashMap<IndexField, HashMap<String, Vec<usize>>>,
}

impl MemoryData {
    /// Positions of records that may match the query
    ///
    /// Uses an index when the query pins an indexed field, otherwise scans.
    fn candidates(&self, query: &RecordQuery) -> Vec<usize> {
        for (field, index) in &self.indexes {
            if let Some(key) = query.indexed_key(*field) {
                return index.get(key).cloned().unwrap_or_default();
            }
        }
        (0..self.records.len()).collect()
    }

    fn push(&mut self, record: AuditRecord) {
        let position = self.records.len();
        for (field, index) in self.indexes.iter_mut() {
            if let Some(key) = field.key_of(&record) {
                index.entry(key.to_string()).or_default().push(position);
            }
        }
        self.ids.insert(record.id);
        self.records.push(record);
    }
}

/// Audit store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record with this ID has been stored
    pub fn contains(&self, id: RecordId) -> AuditResult<bool> {
        let data = self.data.read().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.ids.contains(&id))
    }

    /// Fields that currently have an index
    pub fn indexed_fields(&self) -> AuditResult<Vec<IndexField>> {
        let data = self.data.read().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.indexes.keys().copied().collect())
    }
}

impl AuditStore for MemoryStore {
    fn insert(&self, record: &AuditRecord) -> AuditResult<()> {
        record.validate()?;

        let mut data = self.data.write().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire write lock: {}", e))
        })?;

        if data.ids.contains(&record.id) {
            return Err(AuditError::Persistence(format!(
                "Duplicate audit record id: {}",
                record.id.as_uuid()
            )));
        }

        data.push(record.clone());
        Ok(())
    }

    fn find(&self, query: &RecordQuery, options: &FindOptions) -> AuditResult<Vec<AuditRecord>> {
        let data = self.data.read().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut matched: Vec<(usize, &AuditRecord)> = data
            .candidates(query)
            .into_iter()
            .map(|position| (position, &data.records[position]))
            .filter(|(_, record)| query.matches(record))
            .collect();

        let descending = options.sort.primary_direction() == SortDirection::Descending;
        matched.sort_by(|(pa, a), (pb, b)| {
            options.sort.compare(a, b).then_with(|| {
                if descending {
                    pb.cmp(pa)
                } else {
                    pa.cmp(pb)
                }
            })
        });

        if let Some(limit) = options.limit {
            matched.truncate(limit);
        }

        Ok(matched.into_iter().map(|(_, record)| record.clone()).collect())
    }

    fn count(&self, query: &RecordQuery) -> AuditResult<u64> {
        let data = self.data.read().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire read lock: {}", e))
        })?;

        let count = data
            .candidates(query)
            .into_iter()
            .filter(|&position| query.matches(&data.records[position]))
            .count();

        Ok(count as u64)
    }

    fn ensure_index(&self, field: IndexField) -> AuditResult<()> {
        let mut data = self.data.write().map_err(|e| {
            AuditError::Persistence(format!("Failed to acquire write lock: {}", e))
        })?;

        if data.indexes.contains_key(&field) {
            return Ok(());
        }

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, record) in data.records.iter().enumerate() {
            if let Some(key) = field.key_of(record) {
                index.entry(key.to_string()).or_default().push(position);
            }
        }
        data.indexes.insert(field, index);

        Ok(())
    }
}
