//! Pure functions over configuration documents.

use std::path::Path;

use serde_json::{Map, Value};

/// Flag in a custom config file that selects merge instead of replace.
pub const PARTIAL_KEY: &str = "partial";

/// Name of the object whose string values are filesystem paths.
pub const PATHS_KEY: &str = "paths";

/// Recursively merge `overlay` onto `base`.
///
/// Objects merge key by key. Everything else (lists, scalars, and any type
/// mismatch) is replaced by the overlay value.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Apply a custom config document on top of the defaults.
///
/// A truthy top-level `partial` flag merges, anything else replaces. The flag
/// is removed from the result either way.
#[must_use]
pub fn layer(defaults: Value, custom: Value) -> Value {
    let mut custom = custom;
    let partial = match custom.as_object_mut() {
        Some(map) => map.remove(PARTIAL_KEY).is_some_and(|v| is_truthy(&v)),
        None => false,
    };

    if partial {
        deep_merge(defaults, custom)
    } else {
        custom
    }
}

/// Loose truthiness, so `"partial": 1` or `"partial": "yes"` also merge.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Make every relative path under any `paths` object absolute against `root`.
pub fn resolve_paths(value: &mut Value, root: &Path) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == PATHS_KEY {
                    absolutize(child, root);
                } else {
                    resolve_paths(child, root);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                resolve_paths(item, root);
            }
        }
        _ => {}
    }
}

fn absolutize(value: &mut Value, root: &Path) {
    match value {
        Value::String(s) => {
            if !s.is_empty() && Path::new(s.as_str()).is_relative() {
                *s = root.join(s.as_str()).to_string_lossy().into_owned();
            }
        }
        Value::Object(map) => {
            for child in map.values_mut() {
                absolutize(child, root);
            }
        }
        Value::Array(items) => {
            for item in items {
                absolutize(item, root);
            }
        }
        _ => {}
    }
}

/// Look up a dotted key such as `paths.workdir`.
///
/// An empty key returns the whole document.
#[must_use]
pub fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    if dotted.is_empty() {
        return Some(value);
    }
    dotted
        .split('.')
        .try_fold(value, |current, part| current.as_object()?.get(part))
}

/// Mutable access to a dotted key, creating intermediate objects as needed.
///
/// Non-object intermediates are replaced by empty objects.
pub fn lookup_or_insert<'a>(value: &'a mut Value, dotted: &str) -> &'a mut Value {
    let mut current = value;
    for part in dotted.split('.') {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(part.to_string()).or_insert(Value::Null),
            _ => unreachable!("replaced by an object above"),
        };
    }
    current
}

/// Every dotted key present in the document, objects included.
#[must_use]
pub fn dotted_keys(value: &Value) -> Vec<String> {
    fn walk(value: &Value, prefix: &str, out: &mut Vec<String>) {
        if let Value::Object(map) = value {
            for (key, child) in map {
                let dotted = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                out.push(dotted.clone());
                walk(child, &dotted, out);
            }
        }
    }

    let mut keys = Vec::new();
    walk(value, "", &mut keys);
    keys
}
