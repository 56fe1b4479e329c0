//! Dot-notation addressing into JSON documents
//!
//! A path like `solutions.0.segments.1.carrier` walks object keys and, when
//! the current node is an array, zero-based indices. Numeric segments are
//! plain keys when the current node is an object.
//!
//! Every operation tolerates missing structure: lookups return `None`,
//! assignments become no-ops.

use serde_json::Value;

/// Separator between path segments
pub const SEPARATOR: char = '.';

/// Resolve `path` inside `root`
///
/// Returns `None` when a key is missing, an index is out of bounds, or a
/// segment lands on a scalar.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(SEPARATOR)
        .try_fold(root, |node, segment| step(node, segment))
}

/// Assign `value` at `path` inside `root`
///
/// All intermediate segments must already exist; nothing is created on the
/// way down. The last segment is inserted into an object parent or replaces
/// an in-bounds element of an array parent. Returns whether the assignment
/// happened.
pub fn set(root: &mut Value, path: &str, value: Value) -> bool {
    let (parent_path, last) = match path.rsplit_once(SEPARATOR) {
        Some((parent, last)) => (Some(parent), last),
        None => (None, path),
    };

    let parent = match parent_path {
        Some(parent_path) => {
            let mut node = root;
            for segment in parent_path.split(SEPARATOR) {
                node = match step_mut(node, segment) {
                    Some(next) => next,
                    None => return false,
                };
            }
            node
        }
        None => root,
    };

    match parent {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            true
        }
        Value::Array(items) => match last.parse::<usize>() {
            Ok(index) if index < items.len() => {
                items[index] = value;
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// List the path of every scalar leaf (string, number, boolean) under `root`
///
/// Objects contribute their keys in document order, arrays their indices.
/// Nulls and empty containers produce no paths.
pub fn flatten(root: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    match root {
        Value::Object(_) | Value::Array(_) => collect_leaves(root, None, &mut paths),
        _ => {}
    }
    paths
}

fn collect_leaves(node: &Value, prefix: Option<&str>, paths: &mut Vec<String>) {
    let join = |segment: &str| match prefix {
        Some(prefix) => format!("{}{}{}", prefix, SEPARATOR, segment),
        None => segment.to_string(),
    };

    match node {
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaves(child, Some(&join(key)), paths);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_leaves(child, Some(&join(&index.to_string())), paths);
            }
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            if let Some(path) = prefix {
                paths.push(path.to_string());
            }
        }
        Value::Null => {}
    }
}

fn step<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |index| items.get_mut(index)),
        _ => None,
    }
}

/// Render a JSON value the way it should appear inside a URL or header:
/// strings without quotes, everything else as compact JSON
pub fn to_plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
