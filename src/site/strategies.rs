//! proptest generators for documents and values.

use proptest::prelude::*;
use serde_json::{Number, Value};

use super::{is_reserved_word, Document};

/// Any finite JSON scalar.
fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter_map("finite", Number::from_f64)
            .prop_map(Value::Number),
        any::<String>().prop_map(Value::String),
    ]
}

/// Any value: scalars, nested arrays and objects with arbitrary keys.
pub(crate) fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((any::<String>(), inner), 0..6)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

/// A name usable after `export const`.
pub(crate) fn section_name() -> impl Strategy<Value = String> {
    "[a-zA-Z_$][a-zA-Z0-9_$]{0,12}".prop_filter("reserved word", |name| !is_reserved_word(name))
}

pub(crate) fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec((section_name(), value()), 0..6)
        .prop_map(|sections| sections.into_iter().collect())
}
