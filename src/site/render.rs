//! Serializer for the site configuration module.
//!
//! The module is regenerated in full from the document on every write:
//! a header comment, then one `export const` statement per section.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;

use super::{is_identifier, is_reserved_word, Document};

const INDENT: &str = "  ";
const PROTO_KEY: &str = "__proto__";

/// Errors that prevent a document from being rendered as a module.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A section name that cannot appear after `export const`.
    #[error("Section name '{name}' is not a valid export name")]
    InvalidExportName { name: String },
}

/// Render the whole module text for `document`.
pub fn render_module(document: &Document, updated_at: DateTime<Utc>) -> Result<String, RenderError> {
    let mut out = String::new();
    out.push_str("// Site configuration\n");
    out.push_str(&format!(
        "// Last updated: {}\n",
        updated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    out.push_str("// Generated by the CMS admin. Manual edits are preserved only as data.\n");

    for (name, value) in document {
        if !is_identifier(name) || is_reserved_word(name) {
            return Err(RenderError::InvalidExportName { name: name.clone() });
        }
        out.push('\n');
        out.push_str("export const ");
        out.push_str(name);
        out.push_str(" = ");
        write_value(&mut out, value, 0);
        out.push_str(";\n");
    }

    Ok(out)
}

/// Render a single value as a literal, nested `level` steps deep.
pub fn render_value(value: &Value, level: usize) -> String {
    let mut out = String::new();
    write_value(&mut out, value, level);
    out
}

fn write_value(out: &mut String, value: &Value, level: usize) {
    match value {
        // JSON escaping for strings, numbers, booleans and null is valid literal syntax.
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            out.push_str(&value.to_string());
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, level + 1);
                write_value(out, item, level + 1);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, level);
            out.push(']');
        }
        Value::Object(fields) => {
            if fields.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            let count = fields.len();
            for (i, (key, field)) in fields.iter().enumerate() {
                push_indent(out, level + 1);
                write_key(out, key);
                out.push_str(": ");
                write_value(out, field, level + 1);
                if i + 1 < count {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, level);
            out.push('}');
        }
    }
}

fn write_key(out: &mut String, key: &str) {
    if key == PROTO_KEY {
        // A plain `__proto__:` sets the prototype; a computed key stays an own property.
        out.push('[');
        out.push_str(&Value::String(key.to_string()).to_string());
        out.push(']');
    } else if is_identifier(key) {
        out.push_str(key);
    } else {
        out.push_str(&Value::String(key.to_string()).to_string());
    }
}

fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}
