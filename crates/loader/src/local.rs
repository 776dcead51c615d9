//! Merging of user-chosen JSON files.
//!
//! Unparseable or unrecognized files are skipped and reported; the rest are
//! merged in input order, later entries overwriting earlier ones with the
//! same top-level name.

use crate::error::{LoaderError, Result};
use crate::outcome::SkipReason;
use crate::shape::{classify, FragmentShape};
use catalog_protocol::{
    CatalogDocument, CategoryNode, DocumentMeta, FileNaming, TagList, UNKNOWN_TAG,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A file chosen by the user: its name and raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or_else(|| path.display().to_string(), str::to_string);
        Ok(Self { name, content })
    }

    /// Reads every path concurrently; a failing path does not affect the
    /// others. Files come back in input order.
    pub async fn read_all(paths: &[PathBuf]) -> (Vec<LocalFile>, Vec<(PathBuf, LoaderError)>) {
        let handles: Vec<_> = paths
            .iter()
            .cloned()
            .map(|path| {
                let task_path = path.clone();
                (path, tokio::spawn(async move { LocalFile::read(task_path).await }))
            })
            .collect();

        let mut files = Vec::with_capacity(handles.len());
        let mut failures = Vec::new();
        for (path, handle) in handles {
            match handle.await {
                Ok(Ok(file)) => files.push(file),
                Ok(Err(err)) => failures.push((path, err)),
                Err(err) => failures.push((path, LoaderError::Other(err.to_string()))),
            }
        }
        (files, failures)
    }
}

/// Result of a local merge: the document plus every file that was skipped.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub document: CatalogDocument,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Merges already-read files into one document.
///
/// A direct-shape file lands under its resolved tag (or `Unknown`). A
/// wrapper holding exactly the resolved tag lands under that tag; any other
/// wrapper has all of its categories flattened into the top level.
#[must_use]
pub fn merge_local_files(files: &[LocalFile], tags: &TagList, naming: &FileNaming) -> MergeReport {
    let mut categories: BTreeMap<String, CategoryNode> = BTreeMap::new();
    let mut sources = Vec::new();
    let mut skipped = Vec::new();

    for file in files {
        let raw: Value = match serde_json::from_slice(&file.content) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("Skipping {}: {err}", file.name);
                skipped.push((file.name.clone(), SkipReason::Parse(err.to_string())));
                continue;
            }
        };
        let tag = naming.resolve_tag_from_file_name(&file.name, tags);

        let contributed = match classify(&raw) {
            FragmentShape::Direct(node) => {
                let key = tag.map_or_else(|| UNKNOWN_TAG.to_string(), |tag| tag.to_string());
                log::debug!("{} merged as category '{key}'", file.name);
                categories.insert(key, node);
                true
            }
            FragmentShape::Wrapped(wrapped) => {
                let exact = tag.as_ref().filter(|_| wrapped.len() == 1).and_then(|tag| {
                    wrapped
                        .get(tag.as_str())
                        .filter(|value| !value.is_null())
                        .map(|value| (tag, value))
                });
                if let Some((tag, value)) = exact {
                    categories.insert(tag.to_string(), CategoryNode::from_value(value));
                } else {
                    for (name, value) in wrapped {
                        categories.insert(name.clone(), CategoryNode::from_value(value));
                    }
                }
                !wrapped.is_empty()
            }
            FragmentShape::Unrecognized => {
                log::warn!("Skipping {}: unrecognized fragment shape", file.name);
                skipped.push((file.name.clone(), SkipReason::UnrecognizedShape));
                false
            }
        };
        if contributed {
            sources.push(file.name.clone());
        }
    }

    log::info!(
        "Merged {} local file(s) into {} categories ({} skipped)",
        files.len(),
        categories.len(),
        skipped.len()
    );

    let document = if categories.is_empty() {
        CatalogDocument::empty()
    } else {
        CatalogDocument::new(categories, Some(DocumentMeta { source: sources }))
    };
    MergeReport { document, skipped }
}

/// Reads `paths` concurrently and merges whatever could be read.
pub async fn merge_local_paths(
    paths: &[PathBuf],
    tags: &TagList,
    naming: &FileNaming,
) -> MergeReport {
    let (files, failures) = LocalFile::read_all(paths).await;
    let mut report = merge_local_files(&files, tags, naming);
    for (path, err) in failures {
        log::warn!("Skipping {}: {err}", path.display());
        report
            .skipped
            .push((path.display().to_string(), SkipReason::Fetch(err.to_string())));
    }
    report
}
