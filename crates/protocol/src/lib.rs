use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub mod names;
pub mod tags;

pub use names::{contains_query, names_match, normalize_name, strip_whitespace};
pub use tags::{FileNaming, Tag, TagList, ALL_TAG, JSON_EXTENSION, UNKNOWN_TAG};

pub const SUMMARY_KEY: &str = "Summary";
pub const CATEGORIES_KEY: &str = "Categorys";
// Older fragment producers spell the nested map in the singular.
pub const CATEGORIES_KEY_ALIAS: &str = "Category";
pub const COMPONENTS_KEY: &str = "Components";
pub const DESCRIPTION_KEY: &str = "Description";
pub const META_KEY: &str = "_meta";

/// Terminal catalog entry.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct ComponentLeaf {
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ComponentLeaf {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }

    /// Lenient conversion: anything that is not an object reads as a leaf
    /// without description.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            description: value
                .as_object()
                .and_then(|map| map.get(DESCRIPTION_KEY))
                .and_then(lenient_text),
        }
    }
}

impl<'de> Deserialize<'de> for ComponentLeaf {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// A named node of the catalog hierarchy.
///
/// All three fields are optional and absent fields stay `None` so that a
/// fragment can be passed through unchanged. Consumers treat `None` as empty.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct CategoryNode {
    #[serde(rename = "Summary", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(rename = "Categorys", skip_serializing_if = "Option::is_none")]
    pub children: Option<BTreeMap<String, CategoryNode>>,

    #[serde(rename = "Components", skip_serializing_if = "Option::is_none")]
    pub components: Option<BTreeMap<String, ComponentLeaf>>,
}

impl CategoryNode {
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn child(mut self, name: impl Into<String>, node: CategoryNode) -> Self {
        self.children
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), node);
        self
    }

    #[must_use]
    pub fn component(mut self, name: impl Into<String>, leaf: ComponentLeaf) -> Self {
        self.components
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), leaf);
        self
    }

    /// Builds a node from an arbitrary JSON value.
    ///
    /// Non-string scalars in text fields are stringified, other non-string
    /// values read as absent, and non-object children read as empty nodes.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        Self {
            summary: map.get(SUMMARY_KEY).and_then(lenient_text),
            children: nested_categories(map).map(|children| {
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), Self::from_value(child)))
                    .collect()
            }),
            components: map
                .get(COMPONENTS_KEY)
                .and_then(Value::as_object)
                .map(|components| {
                    components
                        .iter()
                        .map(|(name, leaf)| (name.clone(), ComponentLeaf::from_value(leaf)))
                        .collect()
                }),
        }
    }

    /// Child categories, with an absent map read as empty.
    pub fn children(&self) -> impl Iterator<Item = (&String, &CategoryNode)> {
        self.children.iter().flatten()
    }

    /// Components, with an absent map read as empty.
    pub fn components(&self) -> impl Iterator<Item = (&String, &ComponentLeaf)> {
        self.components.iter().flatten()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.children.as_ref().map_or(true, BTreeMap::is_empty)
            && self.components.as_ref().map_or(true, BTreeMap::is_empty)
    }

    /// Number of components in this node and every descendant.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.as_ref().map_or(0, BTreeMap::len)
            + self
                .children()
                .map(|(_, child)| child.component_count())
                .sum::<usize>()
    }
}

impl<'de> Deserialize<'de> for CategoryNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Diagnostic information about how a document was assembled.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct DocumentMeta {
    #[serde(default)]
    pub source: Vec<String>,
}

/// Root container handed to renderers.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct CatalogDocument {
    #[serde(rename = "Categorys", alias = "Category", default)]
    pub categories: BTreeMap<String, CategoryNode>,

    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<DocumentMeta>,
}

impl CatalogDocument {
    /// The "nothing to display" document.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(categories: BTreeMap<String, CategoryNode>, meta: Option<DocumentMeta>) -> Self {
        Self { categories, meta }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CategoryNode> {
        self.categories.get(name)
    }

    pub fn sources(&self) -> &[String] {
        self.meta
            .as_ref()
            .map(|meta| meta.source.as_slice())
            .unwrap_or_default()
    }
}

/// The nested-categories map of a raw JSON object, under either spelling.
pub fn nested_categories(map: &Map<String, Value>) -> Option<&Map<String, Value>> {
    map.get(CATEGORIES_KEY)
        .and_then(Value::as_object)
        .or_else(|| map.get(CATEGORIES_KEY_ALIAS).and_then(Value::as_object))
}

/// JSON schema of the canonical document.
#[must_use]
pub fn document_schema() -> schemars::Schema {
    schemars::schema_for!(CatalogDocument)
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn absent_fields_stay_absent() {
        let node = CategoryNode::from_value(&json!({ "Summary": "sound stuff" }));
        assert_eq!(node.summary.as_deref(), Some("sound stuff"));
        assert!(node.children.is_none());
        assert!(node.components.is_none());

        let raw = serde_json::to_value(&node).unwrap();
        assert_eq!(raw, json!({ "Summary": "sound stuff" }));
    }

    #[test]
    fn reads_singular_category_spelling() {
        let node = CategoryNode::from_value(&json!({
            "Category": { "Mixers": { "Summary": "mixing" } }
        }));
        let children = node.children.expect("children");
        assert_eq!(children["Mixers"].summary.as_deref(), Some("mixing"));
    }

    #[test]
    fn lenient_reading_of_malformed_members() {
        let node = CategoryNode::from_value(&json!({
            "Summary": 42,
            "Categorys": { "Broken": "not an object" },
            "Components": {
                "Speaker": { "Description": ["nope"] },
                "Flag": { "Description": true },
                "Bare": null
            }
        }));
        assert_eq!(node.summary.as_deref(), Some("42"));
        assert_eq!(node.children.as_ref().unwrap()["Broken"], CategoryNode::default());
        let components = node.components.unwrap();
        assert_eq!(components["Speaker"], ComponentLeaf::default());
        assert_eq!(components["Flag"].description.as_deref(), Some("true"));
        assert_eq!(components["Bare"], ComponentLeaf::default());
    }

    #[test]
    fn document_round_trips_through_wire_names() {
        let raw = json!({
            "Categorys": {
                "Audio": {
                    "Summary": "sound stuff",
                    "Components": { "Speaker": { "Description": "plays sound" } }
                }
            },
            "_meta": { "source": ["./Assets/components/Audio.json"] }
        });
        let doc: CatalogDocument = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(
            doc.sources().to_vec(),
            vec!["./Assets/components/Audio.json".to_string()]
        );
        assert_eq!(
            doc.get("Audio").unwrap().component_count(),
            1,
            "Speaker should be counted"
        );
        assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
    }

    #[test]
    fn empty_document_serializes_without_meta() {
        let raw = serde_json::to_value(CatalogDocument::empty()).unwrap();
        assert_eq!(raw, json!({ "Categorys": {} }));
    }

    #[test]
    fn empty_node_detection_treats_empty_maps_as_absent() {
        let node = CategoryNode {
            children: Some(BTreeMap::new()),
            components: Some(BTreeMap::new()),
            ..CategoryNode::default()
        };
        assert!(node.is_empty());
        assert!(!CategoryNode::with_summary("").is_empty());
    }

    #[test]
    fn schema_names_wire_fields() {
        let schema = serde_json::to_string(&document_schema()).unwrap();
        assert!(schema.contains("Categorys"));
        assert!(schema.contains("Description"));
    }
}
