//! Query, sort, and index descriptions for audit stores
//!
//! These types are the storage-agnostic vocabulary shared by the query
//! service and every `AuditStore` implementation.

use std::cmp::Ordering;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{AuditError, AuditResult};
use crate::models::{Action, AuditRecord};

/// Fields a store can index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexField {
    UserId,
    DocId,
}

impl IndexField {
    /// Wire name of the indexed field
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexField::UserId => "userId",
            IndexField::DocId => "docId",
        }
    }

    /// The indexed key of a record, if it has one
    pub fn key_of<'a>(&self, record: &'a AuditRecord) -> Option<&'a str> {
        match self {
            IndexField::UserId => record.user_id.as_deref(),
            IndexField::DocId => Some(record.doc_id.as_str()),
        }
    }
}

/// Filter over audit records; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub user_id: Option<String>,
    pub doc_id: Option<String>,
    pub collection: Option<String>,
    pub action: Option<Action>,
    /// Case-insensitive substring over `collection` and `docId`
    pub search: Option<String>,
}

impl RecordQuery {
    /// Query matching every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn for_document(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn in_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search.map(|s| s.to_lowercase());
        self
    }

    /// Value to look up in an index, if the query pins that field
    pub fn indexed_key(&self, field: IndexField) -> Option<&str> {
        match field {
            IndexField::UserId => self.user_id.as_deref(),
            IndexField::DocId => self.doc_id.as_deref(),
        }
    }

    /// Check whether a record satisfies every set filter
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(user_id) = &self.user_id {
            if record.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }

        if let Some(doc_id) = &self.doc_id {
            if &record.doc_id != doc_id {
                return false;
            }
        }

        if let Some(collection) = &self.collection {
            if &record.collection != collection {
                return false;
            }
        }

        if let Some(action) = self.action {
            if record.action != action {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !record.collection.to_lowercase().contains(&needle)
                && !record.doc_id.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }
}

/// Record fields that can be sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Collection,
    DocId,
    UserId,
    Action,
}

impl SortField {
    /// Parse a wire field name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "createdAt" => Some(SortField::CreatedAt),
            "collection" => Some(SortField::Collection),
            "docId" => Some(SortField::DocId),
            "userId" => Some(SortField::UserId),
            "action" => Some(SortField::Action),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Collection => "collection",
            SortField::DocId => "docId",
            SortField::UserId => "userId",
            SortField::Action => "action",
        }
    }

    fn compare(&self, a: &AuditRecord, b: &AuditRecord) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Collection => a.collection.cmp(&b.collection),
            SortField::DocId => a.doc_id.cmp(&b.doc_id),
            SortField::UserId => a.user_id.cmp(&b.user_id),
            SortField::Action => a.action.as_str().cmp(b.action.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse `1`/`-1` or `asc`/`desc`
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(SortDirection::Ascending),
                Some(-1) => Some(SortDirection::Descending),
                _ => None,
            },
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "1" => Some(SortDirection::Ascending),
            "desc" | "descending" | "-1" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Ordered list of sort keys
///
/// An empty spec keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(SortField, SortDirection)>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest records first
    pub fn newest_first() -> Self {
        Self::new().by(SortField::CreatedAt, SortDirection::Descending)
    }

    /// Append a sort key
    pub fn by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.keys.push((field, direction));
        self
    }

    pub fn keys(&self) -> &[(SortField, SortDirection)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Direction of the first key, used to order ties by insertion
    pub fn primary_direction(&self) -> SortDirection {
        self.keys
            .first()
            .map(|(_, direction)| *direction)
            .unwrap_or(SortDirection::Ascending)
    }

    /// Build a spec from a JSON object such as `{"createdAt": -1}`
    ///
    /// Key order in the object is the sort priority.
    pub fn from_json(value: &Value) -> AuditResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            AuditError::InvalidArgument(format!("sort must be an object, got {}", value))
        })?;

        let mut spec = Self::new();
        for (name, direction) in obj {
            let field = SortField::parse(name).ok_or_else(|| {
                AuditError::InvalidArgument(format!("Unknown sort field: '{}'", name))
            })?;
            let direction = SortDirection::from_json(direction).ok_or_else(|| {
                AuditError::InvalidArgument(format!(
                    "Invalid sort direction for '{}': {} (use 1 or -1)",
                    name, direction
                ))
            })?;
            spec = spec.by(field, direction);
        }

        Ok(spec)
    }

    /// Compare two records under this spec
    pub fn compare(&self, a: &AuditRecord, b: &AuditRecord) -> Ordering {
        for (field, direction) in &self.keys {
            let ordering = direction.apply(field.compare(a, b));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl FromStr for SortSpec {
    type Err = AuditError;

    /// Parse `field[:asc|desc]` keys separated by commas, e.g. `createdAt:desc,docId`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = Self::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, direction) = match part.split_once(':') {
                Some((name, direction)) => {
                    let direction = SortDirection::parse(direction).ok_or_else(|| {
                        AuditError::InvalidArgument(format!(
                            "Invalid sort direction: '{}'",
                            direction
                        ))
                    })?;
                    (name.trim(), direction)
                }
                None => (part, SortDirection::Ascending),
            };
            let field = SortField::parse(name).ok_or_else(|| {
                AuditError::InvalidArgument(format!("Unknown sort field: '{}'", name))
            })?;
            spec = spec.by(field, direction);
        }
        Ok(spec)
    }
}

/// Sorting and capping applied by `find`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: SortSpec,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn new(sort: SortSpec) -> Self {
        Self { sort, limit: None }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_query_matches_everything() {
        let record = AuditRecord::insert(None, "orders", "o1");
        assert!(RecordQuery::all().matches(&record));
    }

    #[test]
    fn test_field_filters() {
        let record = AuditRecord::insert(Some("u1"), "orders", "o1");

        assert!(RecordQuery::all().by_user("u1").matches(&record));
        assert!(!RecordQuery::all().by_user("u2").matches(&record));
        assert!(RecordQuery::all().for_document("o1").matches(&record));
        assert!(!RecordQuery::all().in_collection("users").matches(&record));
        assert!(!RecordQuery::all().with_action(Action::Update).matches(&record));
    }

    #[test]
    fn test_search_is_case_insensitive_over_collection_and_doc_id() {
        let record = AuditRecord::insert(Some("u1"), "Orders", "INV-2024-001");

        assert!(RecordQuery::all().with_search(Some("ord")).matches(&record));
        assert!(RecordQuery::all().with_search(Some("inv-2024")).matches(&record));
        assert!(!RecordQuery::all().with_search(Some("u1")).matches(&record));
    }

    #[test]
    fn test_search_is_literal() {
        let record = AuditRecord::insert(None, "orders", "o1");
        assert!(!RecordQuery::all().with_search(Some("o.*")).matches(&record));
    }

    #[test]
    fn test_sort_from_json_preserves_key_order() {
        let spec = SortSpec::from_json(&json!({"collection": 1, "createdAt": -1})).unwrap();
        assert_eq!(
            spec.keys(),
            &[
                (SortField::Collection, SortDirection::Ascending),
                (SortField::CreatedAt, SortDirection::Descending)
            ]
        );
    }

    #[test]
    fn test_sort_from_json_rejects_bad_shapes() {
        assert!(SortSpec::from_json(&json!("createdAt")).unwrap_err().is_invalid_argument());
        assert!(SortSpec::from_json(&json!({"name": 1})).unwrap_err().is_invalid_argument());
        assert!(SortSpec::from_json(&json!({"createdAt": 2})).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_sort_from_str() {
        let spec: SortSpec = "createdAt:desc, docId".parse().unwrap();
        assert_eq!(
            spec.keys(),
            &[
                (SortField::CreatedAt, SortDirection::Descending),
                (SortField::DocId, SortDirection::Ascending)
            ]
        );
        assert!("createdAt:sideways".parse::<SortSpec>().is_err());
        assert!("bogus".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_compare_uses_secondary_key() {
        let a = AuditRecord::insert(None, "orders", "a");
        let b = AuditRecord::insert(None, "orders", "b");

        let spec = SortSpec::new()
            .by(SortField::Collection, SortDirection::Ascending)
            .by(SortField::DocId, SortDirection::Descending);
        assert_eq!(spec.compare(&a, &b), Ordering::Greater);
    }
}
