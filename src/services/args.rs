//! Argument validation for query calls
//!
//! Arguments arriving over a transport are untyped JSON. They are checked
//! here, before any store access, and rejected with `InvalidArgument`.

use serde_json::Value;

use crate::error::{AuditError, AuditResult};
use crate::storage::SortSpec;

/// Validated arguments of a paginated query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageArgs {
    pub sort: SortSpec,
    /// Page size; `0` means the configured default
    pub limit: usize,
    pub search: Option<String>,
}

impl PageArgs {
    pub fn new(sort: SortSpec, limit: usize) -> Self {
        Self {
            sort,
            limit,
            search: None,
        }
    }

    /// Filter by a search term; a blank term means no filter
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self
    }

    /// Validate raw transport arguments
    pub fn from_json(sort: &Value, limit: &Value, search: &Value) -> AuditResult<Self> {
        Ok(Self {
            sort: SortSpec::from_json(sort)?,
            limit: parse_limit(limit)?,
            search: parse_search(search)?,
        })
    }
}

/// A limit must be a non-negative integer
pub fn parse_limit(value: &Value) -> AuditResult<usize> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            AuditError::InvalidArgument(format!(
                "limit must be a non-negative integer, got {}",
                value
            ))
        })
}

/// A search term must be a string or absent; blank terms are absent
pub fn parse_search(value: &Value) -> AuditResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(AuditError::InvalidArgument(format!(
            "search must be a string, got {}",
            other
        ))),
    }
}
