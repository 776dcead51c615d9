use catalog_protocol::{CatalogDocument, Tag};

/// Restricts `doc` to the top-level category named like `tag`.
///
/// The "all" tag keeps everything.
#[must_use]
pub fn select_tag(doc: &CatalogDocument, tag: &Tag) -> CatalogDocument {
    if tag.is_all() {
        return doc.clone();
    }
    let categories = doc
        .categories
        .iter()
        .filter(|(name, _)| tag.matches(name))
        .map(|(name, node)| (name.clone(), node.clone()))
        .collect();
    CatalogDocument::new(categories, doc.meta.clone())
}
