//! Path access over the untyped JSON config tree.
//!
//! The config document is an arbitrary `serde_json::Value`. Rules only touch
//! the handful of paths they own, so everything here works on slices of keys
//! and leaves every other node exactly as it was loaded.

use crate::error::DocumentError;

use serde_json::{Map, Value};

/// Render a key path the way it appears in logs: `agents.defaults.workspace`.
pub fn dotted(path: &[&str]) -> String {
    path.join(".")
}

/// Follow `path` through nested objects.
pub fn get<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |node, segment| node.as_object()?.get(*segment))
}

/// Set the value at `path`, creating intermediate objects as needed.
///
/// Returns `Ok(false)` without touching the tree when the current value is
/// already equal. A `null` intermediate is replaced by an empty object; any
/// other non-object intermediate is an error, since replacing it would drop
/// operator data.
pub fn set(root: &mut Value, path: &[&str], value: Value) -> Result<bool, DocumentError> {
    let Some((leaf, parents)) = path.split_last() else {
        return Ok(false);
    };

    let mut node = root;
    for (depth, segment) in parents.iter().enumerate() {
        node = object_at(node, path, depth)?
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = object_at(node, path, parents.len())?;
    if map.get(*leaf) == Some(&value) {
        return Ok(false);
    }
    map.insert(leaf.to_string(), value);
    Ok(true)
}

fn object_at<'a>(
    node: &'a mut Value,
    path: &[&str],
    depth: usize,
) -> Result<&'a mut Map<String, Value>, DocumentError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => Ok(map),
        other => Err(DocumentError::NotAnObject {
            path: dotted(path),
            at: if depth == 0 {
                "<root>".to_string()
            } else {
                dotted(&path[..depth])
            },
            found: type_name(other),
        }),
    }
}

/// Short JSON type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
