//! Field-name transcoding between the local (medial-capital) and remote
//! (underscore-delimited) conventions.
//!
//! The transform is total: it recurses through objects and arrays, passes
//! scalars and `null` through untouched, and returns non-object input
//! unchanged. Applying a direction twice equals applying it once, and the
//! identity field is never renamed.

use serde_json::Value;

// ============================================================================
// Public API
// ============================================================================

/// Transcode a record to the remote convention (`defaultVisualId` →
/// `default_visual_id`), recursively.
pub fn to_remote(value: &Value) -> Value {
    transcode_keys(value, &camel_to_snake)
}

/// Transcode a record to the local convention (`target_participants` →
/// `targetParticipants`), recursively.
pub fn to_local(value: &Value) -> Value {
    transcode_keys(value, &snake_to_camel)
}

/// Remove the listed top-level fields from an object. Non-object input is
/// returned unchanged.
pub fn strip_fields(value: &Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !fields.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

// ============================================================================
// Key walking
// ============================================================================

fn transcode_keys(value: &Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    // Identity values are never renamed. "id" has no case
                    // boundary so the rename would be a no-op anyway; the
                    // check keeps the invariant explicit.
                    let key = if k == "id" { k.clone() } else { rename(k) };
                    (key, transcode_keys(v, rename))
                })
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| transcode_keys(v, rename)).collect())
        }
        scalar => scalar.clone(),
    }
}

// ============================================================================
// Identifier conversion
// ============================================================================

/// `targetParticipants` → `target_participants`. Identifiers already in the
/// underscore convention contain no uppercase letters and pass through.
pub(crate) fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev.is_some() && prev != Some('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// `target_participants` → `targetParticipants`. Leading underscores are
/// preserved; identifiers already in the medial-capital convention contain
/// no underscores and pass through.
pub(crate) fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    let mut at_start = true;
    while let Some(c) = chars.next() {
        if c == '_' && !at_start {
            match chars.peek() {
                Some(next) if next.is_ascii_lowercase() => {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
        at_start = false;
    }
    out
}
