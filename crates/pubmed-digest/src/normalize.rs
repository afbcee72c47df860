//! Shape normalization for XML-derived fields.
//!
//! A field that means "zero or more items" can arrive as `null`, a bare
//! scalar, a single mapping, or a list mixing scalars and mappings, depending
//! on how many elements the upstream record happened to carry. Call sites never
//! branch on the shape themselves; they pick one of the two rules here.
//!
//! - [`text_items`] for plain-text fields (identifiers, abstract segments)
//! - [`structured_items`] for fields whose items are themselves records
//!   (articles, article identifiers)

use serde_json::Value;

use crate::client::xml::TEXT_KEY;

/// Single textual value of a node.
///
/// Strings and numbers are returned as text, a mapping yields its `#text`
/// entry. Anything else (`null`, lists, mappings without text) is `None`.
#[must_use]
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get(TEXT_KEY).and_then(text_of),
        Value::Null | Value::Array(_) => None,
    }
}

fn item_text(value: &Value) -> String {
    text_of(value).unwrap_or_default()
}

/// Text rule: flatten a text-like field into trimmed, non-empty strings.
///
/// Order is preserved and nothing is deduplicated. `None` (absent key) and
/// `null` both yield an empty list.
#[must_use]
pub fn text_items(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(item_text).collect(),
        Some(single) => vec![item_text(single)],
    };

    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Structured rule: view a record-like field as a list of records.
///
/// A single mapping becomes a one-element list so that it is never iterated
/// field by field. A list passes through unchanged. `None`, `null` and bare
/// scalars yield an empty list.
#[must_use]
pub fn structured_items(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(map @ Value::Object(_)) => vec![map.clone()],
        _ => Vec::new(),
    }
}

/// Walk a path of mapping keys, returning `None` as soon as a step is missing.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.as_object()?.get(*key))
}
