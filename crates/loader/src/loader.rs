use crate::error::Result;
use crate::outcome::{FragmentOutcome, SkipReason};
use crate::shape::normalize_fragment;
use crate::source::FragmentSource;
use catalog_protocol::{CatalogDocument, CategoryNode, DocumentMeta, Tag, TagList};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Loads one fragment per tag and merges them into a single document.
#[derive(Clone)]
pub struct Loader {
    source: Arc<dyn FragmentSource>,
}

/// Merged document plus the outcome of every per-tag attempt, in tag order.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub document: CatalogDocument,
    pub outcomes: Vec<FragmentOutcome>,
}

impl LoadReport {
    pub fn loaded(&self) -> impl Iterator<Item = &FragmentOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_loaded())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FragmentOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_loaded())
    }
}

impl Loader {
    pub fn new(source: impl FragmentSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_shared(source: Arc<dyn FragmentSource>) -> Self {
        Self { source }
    }

    pub async fn load_all(&self, tags: &TagList) -> Result<CatalogDocument> {
        Ok(self.load_all_with_report(tags).await?.document)
    }

    /// Fetches every tag except "all" concurrently.
    ///
    /// Per-fragment failures become `Skipped` outcomes; only an unusable
    /// source is returned as an error. The merge runs after every attempt has
    /// settled, and an empty merge yields [`CatalogDocument::empty`].
    pub async fn load_all_with_report(&self, tags: &TagList) -> Result<LoadReport> {
        self.source.check_available().await?;

        let handles: Vec<_> = tags
            .fetch_targets()
            .cloned()
            .map(|tag| {
                let source = Arc::clone(&self.source);
                let task_tag = tag.clone();
                let handle =
                    tokio::spawn(async move { fetch_fragment(source.as_ref(), task_tag).await });
                (tag, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (tag, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => FragmentOutcome::Skipped {
                    source: self.source.describe(&tag),
                    tag,
                    reason: SkipReason::TaskFailed(err.to_string()),
                },
            };
            if let FragmentOutcome::Skipped { tag, reason, .. } = &outcome {
                log::debug!("Skipping fragment for '{tag}': {reason}");
            }
            outcomes.push(outcome);
        }

        let document = merge_outcomes(&outcomes);
        log::info!(
            "Loaded {} of {} fragments ({} categories)",
            outcomes.iter().filter(|outcome| outcome.is_loaded()).count(),
            outcomes.len(),
            document.len()
        );
        Ok(LoadReport { document, outcomes })
    }
}

async fn fetch_fragment(source: &dyn FragmentSource, tag: Tag) -> FragmentOutcome {
    let origin = source.describe(&tag);
    match source.fetch(&tag).await {
        Ok(bytes) => settle(tag, origin, &bytes),
        Err(err) => FragmentOutcome::Skipped {
            tag,
            source: origin,
            reason: SkipReason::Fetch(err.to_string()),
        },
    }
}

fn settle(tag: Tag, source: String, bytes: &[u8]) -> FragmentOutcome {
    let raw: Value = match serde_json::from_slice(bytes) {
        Ok(raw) => raw,
        Err(err) => {
            return FragmentOutcome::Skipped {
                tag,
                source,
                reason: SkipReason::Parse(err.to_string()),
            }
        }
    };
    match normalize_fragment(&raw, tag.as_str()) {
        Some(node) => FragmentOutcome::Loaded { tag, source, node },
        None => FragmentOutcome::Skipped {
            tag,
            source,
            reason: SkipReason::UnrecognizedShape,
        },
    }
}

fn merge_outcomes(outcomes: &[FragmentOutcome]) -> CatalogDocument {
    let mut categories: BTreeMap<String, CategoryNode> = BTreeMap::new();
    let mut sources = Vec::new();
    for outcome in outcomes {
        if let FragmentOutcome::Loaded { tag, source, node } = outcome {
            categories.insert(tag.to_string(), node.clone());
            sources.push(source.clone());
        }
    }
    if categories.is_empty() {
        return CatalogDocument::empty();
    }
    CatalogDocument::new(categories, Some(DocumentMeta { source: sources }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct MemorySource {
        fragments: HashMap<String, std::result::Result<&'static str, &'static str>>,
        available: bool,
    }

    impl MemorySource {
        fn new(entries: &[(&str, std::result::Result<&'static str, &'static str>)]) -> Self {
            Self {
                fragments: entries
                    .iter()
                    .map(|(tag, body)| (tag.to_string(), *body))
                    .collect(),
                available: true,
            }
        }
    }

    #[async_trait]
    impl FragmentSource for MemorySource {
        fn describe(&self, tag: &Tag) -> String {
            format!("mem://{tag}")
        }

        async fn check_available(&self) -> Result<()> {
            if self.available {
                Ok(())
            } else {
                Err(LoaderError::SourceUnavailable("offline".to_string()))
            }
        }

        async fn fetch(&self, tag: &Tag) -> Result<Vec<u8>> {
            match self.fragments.get(tag.as_str()) {
                Some(Ok(body)) => Ok(body.as_bytes().to_vec()),
                Some(Err(message)) => Err(LoaderError::Other(message.to_string())),
                None => Err(LoaderError::MissingFragment(tag.to_string())),
            }
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl FragmentSource for PanickingSource {
        fn describe(&self, tag: &Tag) -> String {
            tag.to_string()
        }

        async fn fetch(&self, tag: &Tag) -> Result<Vec<u8>> {
            if tag.as_str() == "Audio" {
                panic!("transport blew up");
            }
            Ok(br#"{"Summary":"fine"}"#.to_vec())
        }
    }

    fn five_tags() -> TagList {
        TagList::new(["all", "Audio", "Physics", "Cloud", "Data", "Misc"]).unwrap()
    }

    #[tokio::test]
    async fn failed_fragments_are_absorbed() {
        let source = MemorySource::new(&[
            ("Audio", Ok(r#"{"Summary":"sound stuff"}"#)),
            ("Physics", Ok(r#"{"Categorys":{"Physics":{"Summary":"forces"}}}"#)),
            ("Cloud", Err("connection refused")),
            ("Data", Ok("{ truncated")),
            ("Misc", Ok(r#"{"Name":"misc"}"#)),
        ]);
        let report = Loader::new(source)
            .load_all_with_report(&five_tags())
            .await
            .unwrap();

        let names: Vec<_> = report.document.categories.keys().cloned().collect();
        assert_eq!(names, vec!["Audio".to_string(), "Physics".to_string()]);
        assert_eq!(
            report.document.sources().to_vec(),
            vec!["mem://Audio".to_string(), "mem://Physics".to_string()]
        );

        let reasons: Vec<_> = report
            .skipped()
            .map(|outcome| (outcome.tag().to_string(), outcome.skip_reason().cloned()))
            .collect();
        assert_eq!(reasons.len(), 3);
        assert!(matches!(reasons[0].1, Some(SkipReason::Fetch(_))));
        assert!(matches!(reasons[1].1, Some(SkipReason::Parse(_))));
        assert_eq!(reasons[2].1, Some(SkipReason::UnrecognizedShape));
    }

    #[tokio::test]
    async fn all_tag_is_never_fetched() {
        let source = MemorySource::new(&[("all", Ok(r#"{"Summary":"everything"}"#))]);
        let report = Loader::new(source)
            .load_all_with_report(&five_tags())
            .await
            .unwrap();
        assert!(report.outcomes.iter().all(|outcome| !outcome.tag().is_all()));
        assert_eq!(report.outcomes.len(), 5);
    }

    #[tokio::test]
    async fn total_failure_yields_empty_document() {
        let source = MemorySource::new(&[]);
        let doc = Loader::new(source).load_all(&five_tags()).await.unwrap();
        assert_eq!(doc, CatalogDocument::empty());
    }

    #[tokio::test]
    async fn unavailable_source_is_an_error() {
        let mut source = MemorySource::new(&[("Audio", Ok(r#"{"Summary":"x"}"#))]);
        source.available = false;
        let err = Loader::new(source).load_all(&five_tags()).await.unwrap_err();
        assert!(matches!(err, LoaderError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn panicking_fetch_does_not_stall_siblings() {
        let tags = TagList::new(["Audio", "Physics"]).unwrap();
        let report = Loader::new(PanickingSource)
            .load_all_with_report(&tags)
            .await
            .unwrap();
        assert_eq!(report.document.len(), 1);
        assert!(report.document.get("Physics").is_some());
        assert!(matches!(
            report.outcomes[0].skip_reason(),
            Some(SkipReason::TaskFailed(_))
        ));
    }
}
