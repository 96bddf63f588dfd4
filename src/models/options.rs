//! Per-collection logging options
//!
//! Supplied once when a collection is registered for monitoring and never
//! changed afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Options attached to a monitored collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogOptions {
    /// Field names excluded from delta computation
    #[serde(default)]
    omit: BTreeSet<String>,
}

impl LogOptions {
    /// Options with an empty exclusion set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add field names to the exclusion set
    pub fn omit<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit.extend(fields.into_iter().map(Into::into));
        self
    }

    /// The field names excluded from deltas
    pub fn omitted(&self) -> &BTreeSet<String> {
        &self.omit
    }

    /// Whether a field name is excluded from deltas
    pub fn is_omitted(&self, field: &str) -> bool {
        self.omit.contains(field)
    }
}
