//! The site configuration document and its module-file representation.
//!
//! The site's content lives in one generated JavaScript module with one
//! `export const` per section. This module loads it into an ordered
//! document, merges partial updates into it and renders it back.

mod merge;
mod parse;
mod render;
mod store;
#[cfg(test)]
mod strategies;

pub use merge::{deep_merge, merge_document};
pub use parse::{parse_module, parse_value, ParseError};
pub use render::{render_module, render_value, RenderError};
pub use store::{ModuleStore, StoreError};

/// Ordered mapping from section name to section value.
pub type Document = serde_json::Map<String, serde_json::Value>;

const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
    "null", "package", "private", "protected", "public", "return", "static", "super", "switch",
    "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "with", "yield",
];

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// True when `name` can be written as a bare identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_continue),
        _ => false,
    }
}

/// True for words that cannot name a binding in module (strict mode) code.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}
