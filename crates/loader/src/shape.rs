//! Shape detection for raw fragment JSON.
//!
//! A fragment is either a category object itself (`Direct`) or a wrapper
//! whose nested-categories map holds the category under its name
//! (`Wrapped`). A text `Summary` or an object `Components` marks the direct
//! shape; an object whose only category-like member is the nested map is a
//! wrapper.

use catalog_protocol::{nested_categories, CategoryNode, COMPONENTS_KEY, SUMMARY_KEY};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentShape<'a> {
    Direct(CategoryNode),
    Wrapped(&'a Map<String, Value>),
    Unrecognized,
}

#[must_use]
pub fn classify(raw: &Value) -> FragmentShape<'_> {
    let Some(map) = raw.as_object() else {
        return FragmentShape::Unrecognized;
    };

    let has_summary = map.get(SUMMARY_KEY).is_some_and(Value::is_string);
    let has_components = map.get(COMPONENTS_KEY).is_some_and(Value::is_object);
    if has_summary || has_components {
        return FragmentShape::Direct(CategoryNode::from_value(raw));
    }

    match nested_categories(map) {
        Some(wrapped) => FragmentShape::Wrapped(wrapped),
        None => FragmentShape::Unrecognized,
    }
}

/// Normalizes one fragment into the category it describes.
///
/// Returns `None` when the shape is not recognized or a wrapper does not
/// identify a single category; callers skip the fragment.
#[must_use]
pub fn normalize_fragment(raw: &Value, expected_tag: &str) -> Option<CategoryNode> {
    match classify(raw) {
        FragmentShape::Direct(node) => Some(node),
        FragmentShape::Wrapped(wrapped) => unwrap_category(wrapped, expected_tag),
        FragmentShape::Unrecognized => None,
    }
}

fn unwrap_category(wrapped: &Map<String, Value>, expected_tag: &str) -> Option<CategoryNode> {
    if let Some(value) = wrapped.get(expected_tag).filter(|value| !value.is_null()) {
        return Some(CategoryNode::from_value(value));
    }
    if wrapped.len() == 1 {
        return wrapped.values().next().map(CategoryNode::from_value);
    }
    None
}
