//! Viewer state as an explicit value.
//!
//! The original document and the current (possibly filtered) document are
//! held separately; every event produces a new view and never mutates either
//! document.

use crate::filter::filter_document;
use crate::query::Query;
use crate::selection::select_tag;
use catalog_protocol::{CatalogDocument, Tag};
use std::sync::Arc;

/// Input events coming from the presentation layer.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    SearchTextChanged(String),
    TagSelected(Tag),
    DocumentLoaded(CatalogDocument),
    ClearSearch,
}

#[derive(Debug, Clone)]
pub struct CatalogView {
    original: Arc<CatalogDocument>,
    current: Arc<CatalogDocument>,
    selected_tag: Tag,
    query: Option<Query>,
}

impl CatalogView {
    pub fn new(original: CatalogDocument) -> Self {
        let original = Arc::new(original);
        Self {
            current: Arc::clone(&original),
            original,
            selected_tag: Tag::all(),
            query: None,
        }
    }

    #[must_use]
    pub fn original(&self) -> &CatalogDocument {
        &self.original
    }

    #[must_use]
    pub fn current(&self) -> &CatalogDocument {
        &self.current
    }

    #[must_use]
    pub fn selected_tag(&self) -> &Tag {
        &self.selected_tag
    }

    #[must_use]
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    #[must_use]
    pub fn apply(&self, event: ViewEvent) -> Self {
        match event {
            ViewEvent::SearchTextChanged(text) => self.search_text_changed(&text),
            ViewEvent::TagSelected(tag) => self.tag_selected(tag),
            ViewEvent::DocumentLoaded(doc) => self.document_loaded(doc),
            ViewEvent::ClearSearch => self.clear_search(),
        }
    }

    #[must_use]
    pub fn search_text_changed(&self, text: &str) -> Self {
        match Query::parse(text) {
            Ok(query) => Self {
                current: Arc::new(filter_document(&self.original, &query)),
                query: Some(query),
                ..self.clone()
            },
            Err(_) => self.clear_search(),
        }
    }

    #[must_use]
    pub fn clear_search(&self) -> Self {
        Self {
            current: Arc::clone(&self.original),
            query: None,
            ..self.clone()
        }
    }

    /// Selecting the tag that is already active changes nothing.
    #[must_use]
    pub fn tag_selected(&self, tag: Tag) -> Self {
        if self.selected_tag.matches(tag.as_str()) {
            return self.clone();
        }
        Self {
            selected_tag: tag,
            ..self.clone()
        }
    }

    /// Replaces the original document and resets the search; the selected tag
    /// is kept.
    #[must_use]
    pub fn document_loaded(&self, doc: CatalogDocument) -> Self {
        let original = Arc::new(doc);
        Self {
            current: Arc::clone(&original),
            original,
            selected_tag: self.selected_tag.clone(),
            query: None,
        }
    }

    /// What the renderer should show: the current document narrowed to the
    /// selected tag.
    #[must_use]
    pub fn visible(&self) -> CatalogDocument {
        select_tag(&self.current, &self.selected_tag)
    }

    #[must_use]
    pub fn is_empty_state(&self) -> bool {
        self.visible().is_empty()
    }
}
