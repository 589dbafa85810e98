//! Deep merge for site configuration updates.
//!
//! Objects recurse field by field; arrays and scalars replace the existing
//! value entirely. Keys missing from the update are never touched.

use serde_json::Value;

use super::Document;

/// Merge `partial` into `document` section by section.
///
/// A section present on both sides with object values is merged
/// recursively. Any other combination (missing key, array, scalar, null)
/// replaces the section wholesale. New sections are appended after the
/// existing ones.
pub fn merge_document(document: &mut Document, partial: Document) {
    for (key, incoming) in partial {
        match document.get_mut(&key) {
            Some(existing) => deep_merge(existing, incoming),
            None => {
                document.insert(key, incoming);
            }
        }
    }
}

/// Merge `incoming` into `target` in place.
pub fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match target_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}
