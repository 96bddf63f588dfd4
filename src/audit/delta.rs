//! Delta computation for audit logging
//!
//! Computes the structural difference between two snapshots of the same
//! document. Each change is a tagged [`DeltaEntry`] carrying the path to the
//! changed field and the old and/or new value. Entries are persisted as-is.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step in the path to a changed value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position inside an array
    Index(usize),
    /// Key inside an object
    Key(String),
}

impl PathSegment {
    /// The object key, if this segment is one
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{}]", i),
            PathSegment::Key(key) => write!(f, "{}", key),
        }
    }
}

/// Element-level change inside an array that grew or shrank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ArrayItem {
    #[serde(rename = "add")]
    Added { rhs: Value },
    #[serde(rename = "delete")]
    Deleted { lhs: Value },
}

/// A single change between two document snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeltaEntry {
    /// Field present only in the new snapshot
    #[serde(rename = "add")]
    Added { path: Vec<PathSegment>, rhs: Value },

    /// Field present only in the old snapshot
    #[serde(rename = "delete")]
    Deleted { path: Vec<PathSegment>, lhs: Value },

    /// Field value (or type) changed
    #[serde(rename = "edit")]
    Edited {
        path: Vec<PathSegment>,
        lhs: Value,
        rhs: Value,
    },

    /// Array grew or shrank at `index`
    #[serde(rename = "array")]
    ArrayChanged {
        path: Vec<PathSegment>,
        index: usize,
        item: ArrayItem,
    },
}

impl DeltaEntry {
    /// Path to the changed value (the array itself for `ArrayChanged`)
    pub fn path(&self) -> &[PathSegment] {
        match self {
            DeltaEntry::Added { path, .. }
            | DeltaEntry::Deleted { path, .. }
            | DeltaEntry::Edited { path, .. }
            | DeltaEntry::ArrayChanged { path, .. } => path,
        }
    }

    /// Wire name of the change kind
    pub fn kind(&self) -> &'static str {
        match self {
            DeltaEntry::Added { .. } => "add",
            DeltaEntry::Deleted { .. } => "delete",
            DeltaEntry::Edited { .. } => "edit",
            DeltaEntry::ArrayChanged { .. } => "array",
        }
    }

    /// Dotted rendering of the path, e.g. `items[2].price`
    pub fn path_string(&self) -> String {
        render_path(self.path())
    }

    /// Human-readable one-line description of the change
    pub fn describe(&self) -> String {
        let path = self.path_string();
        let path = if path.is_empty() { "(document)".to_string() } else { path };
        match self {
            DeltaEntry::Added { rhs, .. } => format!("{}: (added) -> {}", path, format_value(rhs)),
            DeltaEntry::Deleted { lhs, .. } => {
                format!("{}: {} -> (removed)", path, format_value(lhs))
            }
            DeltaEntry::Edited { lhs, rhs, .. } => {
                format!("{}: {} -> {}", path, format_value(lhs), format_value(rhs))
            }
            DeltaEntry::ArrayChanged { index, item, .. } => match item {
                ArrayItem::Added { rhs } => {
                    format!("{}[{}]: (added) -> {}", path, index, format_value(rhs))
                }
                ArrayItem::Deleted { lhs } => {
                    format!("{}[{}]: {} -> (removed)", path, index, format_value(lhs))
                }
            },
        }
    }
}

fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(i) => out.push_str(&format!("[{}]", i)),
        }
    }
    out
}

/// Compute the delta between two snapshots of a document
///
/// Object keys are visited in `before` order, followed by keys that only
/// exist in `after`. A key listed in `omit` is skipped at any depth,
/// together with everything beneath it.
///
/// A missing `before` snapshot yields a single `Added` entry with an empty
/// path holding the whole `after` document.
pub fn compute_delta(
    before: Option<&Value>,
    after: &Value,
    omit: &BTreeSet<String>,
) -> Vec<DeltaEntry> {
    let mut changes = Vec::new();

    match before {
        Some(before) => diff_values(before, after, &mut Vec::new(), omit, &mut changes),
        None => changes.push(DeltaEntry::Added {
            path: Vec::new(),
            rhs: after.clone(),
        }),
    }

    changes
}

fn diff_values(
    before: &Value,
    after: &Value,
    path: &mut Vec<PathSegment>,
    omit: &BTreeSet<String>,
    changes: &mut Vec<DeltaEntry>,
) {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            // Modified and removed fields
            for (key, before_val) in before_obj {
                if omit.contains(key) {
                    continue;
                }
                path.push(PathSegment::Key(key.clone()));
                match after_obj.get(key) {
                    Some(after_val) => diff_values(before_val, after_val, path, omit, changes),
                    None => changes.push(DeltaEntry::Deleted {
                        path: path.clone(),
                        lhs: before_val.clone(),
                    }),
                }
                path.pop();
            }

            // Added fields
            for (key, after_val) in after_obj {
                if before_obj.contains_key(key) || omit.contains(key) {
                    continue;
                }
                let mut field_path = path.clone();
                field_path.push(PathSegment::Key(key.clone()));
                changes.push(DeltaEntry::Added {
                    path: field_path,
                    rhs: after_val.clone(),
                });
            }
        }
        (Value::Array(before_arr), Value::Array(after_arr)) => {
            for (i, before_val) in before_arr.iter().enumerate() {
                match after_arr.get(i) {
                    Some(after_val) => {
                        path.push(PathSegment::Index(i));
                        diff_values(before_val, after_val, path, omit, changes);
                        path.pop();
                    }
                    None => changes.push(DeltaEntry::ArrayChanged {
                        path: path.clone(),
                        index: i,
                        item: ArrayItem::Deleted {
                            lhs: before_val.clone(),
                        },
                    }),
                }
            }

            for (i, after_val) in after_arr.iter().enumerate().skip(before_arr.len()) {
                changes.push(DeltaEntry::ArrayChanged {
                    path: path.clone(),
                    index: i,
                    item: ArrayItem::Added {
                        rhs: after_val.clone(),
                    },
                });
            }
        }
        _ => {
            if !scalars_equal(before, after) {
                changes.push(DeltaEntry::Edited {
                    path: path.clone(),
                    lhs: before.clone(),
                    rhs: after.clone(),
                });
            }
        }
    }
}

/// Scalar equality where numbers compare by value, so `20` equals `20.0`
fn scalars_equal(before: &Value, after: &Value) -> bool {
    match (before, after) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                a == b
            } else if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                a == b
            } else {
                a.as_f64() == b.as_f64()
            }
        }
        _ => before == after,
    }
}

/// Summarize a delta on one line, `None` when nothing changed
pub fn summarize(delta: &[DeltaEntry]) -> Option<String> {
    if delta.is_empty() {
        None
    } else {
        Some(
            delta
                .iter()
                .map(DeltaEntry::describe)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
