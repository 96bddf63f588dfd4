//! Audit record data structures
//!
//! Defines the action types and the persisted record format. Field names on
//! the wire follow the document-store convention (`_id`, `userId`, `docId`,
//! `createdAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RecordId;
use crate::audit::delta::DeltaEntry;
use crate::error::{AuditError, AuditResult};

/// Write actions that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Document was inserted
    Insert,
    /// Document was updated
    Update,
    /// Document was removed
    #[serde(alias = "delete")]
    Remove,
}

impl Action {
    /// Parse an action name (case-insensitive, `delete` accepted for `remove`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "insert" => Some(Action::Insert),
            "update" => Some(Action::Update),
            "remove" | "delete" => Some(Action::Remove),
            _ => None,
        }
    }

    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Insert => "insert",
            Action::Update => "update",
            Action::Remove => "remove",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Insert => write!(f, "INSERT"),
            Action::Update => write!(f, "UPDATE"),
            Action::Remove => write!(f, "REMOVE"),
        }
    }
}

/// A single persisted audit record
///
/// Records one observed write against a monitored collection. Records are
/// append-only: nothing in this crate mutates one after it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Unique identifier, generated at capture time
    #[serde(rename = "_id")]
    pub id: RecordId,

    /// Actor that performed the write; absent for system writes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Name of the monitored collection
    pub collection: String,

    /// Identifier of the affected document
    pub doc_id: String,

    /// Kind of write
    pub action: Action,

    /// When the write was captured (UTC)
    pub created_at: DateTime<Utc>,

    /// Field-level changes, only for updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Vec<DeltaEntry>>,
}

impl AuditRecord {
    fn new(
        action: Action,
        user_id: Option<&str>,
        collection: impl Into<String>,
        doc_id: impl Into<String>,
        delta: Option<Vec<DeltaEntry>>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            user_id: user_id.map(str::to_string),
            collection: collection.into(),
            doc_id: doc_id.into(),
            action,
            created_at: Utc::now(),
            delta,
        }
    }

    /// Create a record for an insert
    pub fn insert(
        user_id: Option<&str>,
        collection: impl Into<String>,
        doc_id: impl Into<String>,
    ) -> Self {
        Self::new(Action::Insert, user_id, collection, doc_id, None)
    }

    /// Create a record for a remove
    pub fn remove(
        user_id: Option<&str>,
        collection: impl Into<String>,
        doc_id: impl Into<String>,
    ) -> Self {
        Self::new(Action::Remove, user_id, collection, doc_id, None)
    }

    /// Create a record for an update; the delta may be empty
    pub fn update(
        user_id: Option<&str>,
        collection: impl Into<String>,
        doc_id: impl Into<String>,
        delta: Vec<DeltaEntry>,
    ) -> Self {
        Self::new(Action::Update, user_id, collection, doc_id, Some(delta))
    }

    /// Check the record against the persisted schema
    pub fn validate(&self) -> AuditResult<()> {
        if self.collection.trim().is_empty() {
            return Err(AuditError::Validation(
                "Audit record collection cannot be empty".into(),
            ));
        }

        if self.doc_id.trim().is_empty() {
            return Err(AuditError::Validation(
                "Audit record docId cannot be empty".into(),
            ));
        }

        match (self.action, &self.delta) {
            (Action::Update, None) => Err(AuditError::Validation(
                "Update records must carry a delta".into(),
            )),
            (Action::Insert | Action::Remove, Some(_)) => Err(AuditError::Validation(format!(
                "{} records cannot carry a delta",
                self.action.as_str()
            ))),
            _ => Ok(()),
        }
    }

    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action,
            self.collection,
            self.doc_id
        );

        if let Some(user) = &self.user_id {
            output.push_str(&format!(" by {}", user));
        }

        if let Some(summary) = self.delta.as_deref().and_then(crate::audit::delta::summarize) {
            output.push_str(&format!("\n  Changes: {}", summary));
        }

        output
    }
}
