use crate::query::Query;
use catalog_protocol::{CatalogDocument, CategoryNode, ComponentLeaf};
use std::collections::BTreeMap;

/// Prunes `node` (named `name`) down to what matches `query`.
///
/// Children are pruned first. Components are kept when their name or
/// description matches. The node survives when it matches by name or
/// summary, or when anything below it survived; a surviving node keeps its
/// summary and only carries non-empty `children`/`components`.
#[must_use]
pub fn prune_category(name: &str, node: &CategoryNode, query: &Query) -> Option<CategoryNode> {
    let children: BTreeMap<String, CategoryNode> = node
        .children()
        .filter_map(|(child_name, child)| {
            prune_category(child_name, child, query).map(|pruned| (child_name.clone(), pruned))
        })
        .collect();

    let components: BTreeMap<String, ComponentLeaf> = node
        .components()
        .filter(|(leaf_name, leaf)| {
            query.matches(leaf_name) || query.matches_opt(leaf.description.as_deref())
        })
        .map(|(leaf_name, leaf)| (leaf_name.clone(), leaf.clone()))
        .collect();

    let self_matches = query.matches(name) || query.matches_opt(node.summary.as_deref());
    if !self_matches && children.is_empty() && components.is_empty() {
        return None;
    }

    Some(CategoryNode {
        summary: node.summary.clone(),
        children: (!children.is_empty()).then_some(children),
        components: (!components.is_empty()).then_some(components),
    })
}

/// Filters every top-level category of `doc`. The input is left untouched
/// and `meta` is carried over.
#[must_use]
pub fn filter_document(doc: &CatalogDocument, query: &Query) -> CatalogDocument {
    let categories: BTreeMap<String, CategoryNode> = doc
        .categories
        .iter()
        .filter_map(|(name, node)| {
            prune_category(name, node, query).map(|pruned| (name.clone(), pruned))
        })
        .collect();
    log::debug!(
        "Query '{query}' kept {} of {} top-level categories",
        categories.len(),
        doc.len()
    );
    CatalogDocument::new(categories, doc.meta.clone())
}

/// Applies raw search-box text: blank text shows `original` unchanged.
#[must_use]
pub fn search(original: &CatalogDocument, raw: &str) -> CatalogDocument {
    match Query::parse(raw) {
        Ok(query) => filter_document(original, &query),
        Err(_) => original.clone(),
    }
}
