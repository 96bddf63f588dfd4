//! Write modifiers for the reference collection
//!
//! Supports `$set`, `$unset`, `$inc` and `$push` with dotted paths, or a
//! plain replacement document.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{AuditError, AuditResult};
use crate::models::ID_FIELD;

const OPERATORS: [&str; 4] = ["$set", "$unset", "$inc", "$push"];

/// Apply `modifier` to `doc` in place
///
/// Returns the top-level field names the modifier touched, in order of first
/// appearance. On error `doc` may be partially modified; callers apply to a
/// copy.
pub fn apply_modifier(doc: &mut Value, modifier: &Value) -> AuditResult<Vec<String>> {
    let ops = modifier.as_object().ok_or_else(|| {
        AuditError::InvalidArgument(format!("modifier must be an object, got {}", modifier))
    })?;

    let has_operators = ops.keys().any(|key| key.starts_with('$'));
    if !has_operators {
        return replace(doc, ops);
    }

    let mut field_names: Vec<String> = Vec::new();
    for (operator, fields) in ops {
        if !OPERATORS.contains(&operator.as_str()) {
            return Err(AuditError::InvalidArgument(format!(
                "unsupported modifier '{}'",
                operator
            )));
        }
        let fields = fields.as_object().ok_or_else(|| {
            AuditError::InvalidArgument(format!("{} expects an object of fields", operator))
        })?;

        for (path, value) in fields {
            let top = path.split('.').next().unwrap_or(path.as_str());
            if top.is_empty() {
                return Err(AuditError::InvalidArgument(format!("invalid field path '{}'", path)));
            }
            if top == ID_FIELD {
                return Err(AuditError::InvalidArgument("_id cannot be modified".into()));
            }

            match operator.as_str() {
                "$set" => *slot(doc, path)? = value.clone(),
                "$unset" => unset(doc, path),
                "$inc" => increment(slot(doc, path)?, value, path)?,
                _ => push(slot(doc, path)?, value, path)?,
            }

            if !field_names.iter().any(|name| name == top) {
                field_names.push(top.to_string());
            }
        }
    }

    Ok(field_names)
}

/// Replace every field but `_id`
fn replace(doc: &mut Value, replacement: &Map<String, Value>) -> AuditResult<Vec<String>> {
    let target = doc
        .as_object_mut()
        .ok_or_else(|| AuditError::InvalidArgument("document is not an object".into()))?;

    let mut field_names: Vec<String> = target
        .keys()
        .chain(replacement.keys())
        .filter(|key| key.as_str() != ID_FIELD)
        .cloned()
        .collect();
    let mut seen = HashSet::new();
    field_names.retain(|name| seen.insert(name.clone()));

    target.retain(|key, _| key == ID_FIELD);
    for (key, value) in replacement {
        if key != ID_FIELD {
            target.insert(key.clone(), value.clone());
        }
    }

    Ok(field_names)
}

/// Mutable slot at a dotted path, creating intermediate objects
fn slot<'a>(doc: &'a mut Value, path: &str) -> AuditResult<&'a mut Value> {
    let mut current = doc;
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(AuditError::InvalidArgument(format!("invalid field path '{}'", path)));
        }
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
            Value::Array(items) => {
                let index: usize = segment.parse().map_err(|_| {
                    AuditError::InvalidArgument(format!(
                        "'{}' in '{}' is not an array index",
                        segment, path
                    ))
                })?;
                // Appending one past the end is allowed; gaps are not
                if index > items.len() {
                    return Err(AuditError::InvalidArgument(format!(
                        "index {} in '{}' is past the end of an array of length {}",
                        index,
                        path,
                        items.len()
                    )));
                }
                if index == items.len() {
                    items.push(Value::Null);
                }
                &mut items[index]
            }
            _ => {
                return Err(AuditError::InvalidArgument(format!(
                    "cannot traverse into a scalar at '{}'",
                    path
                )))
            }
        };
    }
    Ok(current)
}

fn unset(doc: &mut Value, path: &str) {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        let next = match current {
            Value::Object(map) if last => {
                map.remove(segment);
                return;
            }
            Value::Object(map) => map.get_mut(segment),
            Value::Array(items) if last => {
                if let Some(item) = segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                    *item = Value::Null;
                }
                return;
            }
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return,
        }
    }
}

fn increment(target: &mut Value, by: &Value, path: &str) -> AuditResult<()> {
    let not_numeric =
        || AuditError::InvalidArgument(format!("$inc on '{}' requires numeric values", path));

    if !by.is_number() {
        return Err(not_numeric());
    }

    let result = match (&*target, by.as_i64()) {
        (Value::Null, _) => by.clone(),
        (current, Some(step)) if current.is_i64() => {
            let base = current.as_i64().ok_or_else(not_numeric)?;
            match base.checked_add(step) {
                Some(sum) => Value::from(sum),
                None => float_sum(base as f64, step as f64, path)?,
            }
        }
        (current, _) if current.is_number() => {
            let base = current.as_f64().ok_or_else(not_numeric)?;
            let step = by.as_f64().ok_or_else(not_numeric)?;
            float_sum(base, step, path)?
        }
        _ => return Err(not_numeric()),
    };

    *target = result;
    Ok(())
}

fn float_sum(a: f64, b: f64, path: &str) -> AuditResult<Value> {
    serde_json::Number::from_f64(a + b)
        .map(Value::Number)
        .ok_or_else(|| AuditError::InvalidArgument(format!("$inc on '{}' overflowed", path)))
}

fn push(target: &mut Value, item: &Value, path: &str) -> AuditResult<()> {
    match target {
        Value::Null => {
            *target = Value::Array(vec![item.clone()]);
            Ok(())
        }
        Value::Array(items) => {
            items.push(item.clone());
            Ok(())
        }
        _ => Err(AuditError::InvalidArgument(format!(
            "$push on '{}' requires an array",
            path
        ))),
    }
}
