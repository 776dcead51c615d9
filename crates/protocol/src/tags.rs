use crate::names::{names_match, normalize_name, strip_whitespace};
use anyhow::{bail, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Synthetic tag meaning "no tag filter".
pub const ALL_TAG: &str = "all";
/// Merge key for local files whose name resolves to no tag.
pub const UNKNOWN_TAG: &str = "Unknown";
pub const JSON_EXTENSION: &str = ".json";

const DEFAULT_TAGS: &[&str] = &[
    ALL_TAG,
    "Assets",
    "Audio",
    "Cloud",
    "Common UI",
    "Data",
    "Debug",
    "Generators",
    "Input",
    "Interaction",
    "Localization",
    "Locomotion",
    "Media",
    "Metadata",
    "Misc",
    "Network",
    "Permissions",
    "Physics",
    "ProtoFlux",
    "Radiant UI",
    "Relations",
    "Rendering",
    "Tools",
    "Transform",
    "UI",
    "UIX",
    "Uncategorized",
    "Userspace",
    "Wizards",
];

/// A category label as shown in the tag bar.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[must_use]
    pub fn all() -> Self {
        Self(ALL_TAG.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        names_match(&self.0, ALL_TAG)
    }

    /// Case-insensitive comparison against a category name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        names_match(&self.0, name)
    }

    /// The label with whitespace removed, as embedded in file names.
    #[must_use]
    pub fn stripped(&self) -> String {
        strip_whitespace(&self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Ordered tag enumeration, always containing the synthetic "all" tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagList {
    tags: Vec<Tag>,
}

impl TagList {
    /// Builds a tag list from labels.
    ///
    /// "all" is prepended when missing. Labels must be non-empty and distinct
    /// once whitespace is removed, otherwise two tags would share a file name.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags: Vec<Tag> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for label in labels {
            let label = label.into();
            if label.trim().is_empty() {
                bail!("tag labels must not be empty");
            }
            let key = normalize_name(&strip_whitespace(&label));
            if !seen.insert(key) {
                bail!("duplicate tag label '{label}'");
            }
            tags.push(Tag::new(label));
        }
        if !tags.iter().any(Tag::is_all) {
            tags.insert(0, Tag::all());
        }
        Ok(Self { tags })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Every tag that has a fragment of its own, i.e. all but "all".
    pub fn fetch_targets(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|tag| !tag.is_all())
    }

    /// Case-insensitive lookup of a label.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.matches(label))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TagList {
    fn default() -> Self {
        Self {
            tags: DEFAULT_TAGS.iter().map(|label| Tag::from(*label)).collect(),
        }
    }
}

/// File naming convention for per-tag fragments: `<prefix><Tag>.json` with
/// whitespace removed from the tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNaming {
    prefix: String,
}

impl FileNaming {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn file_name_for_tag(&self, tag: &Tag) -> String {
        format!("{}{}{JSON_EXTENSION}", self.prefix, tag.stripped())
    }

    /// Maps a file name back to a tag of `tags`.
    ///
    /// Only the last path component is considered. An exact
    /// (case-insensitive) match against [`Self::file_name_for_tag`] wins;
    /// otherwise the `.json` extension and the naming prefix are removed and
    /// the rest is compared with each whitespace-stripped label.
    #[must_use]
    pub fn resolve_tag_from_file_name(&self, file_name: &str, tags: &TagList) -> Option<Tag> {
        let base = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file_name);
        let lower = base.to_lowercase();

        if let Some(tag) = tags
            .fetch_targets()
            .find(|tag| self.file_name_for_tag(tag).to_lowercase() == lower)
        {
            return Some(tag.clone());
        }

        let stem = lower.strip_suffix(JSON_EXTENSION)?;
        let prefix = self.prefix.to_lowercase();
        let stem = stem.strip_prefix(prefix.as_str()).unwrap_or(stem);
        if stem.is_empty() {
            return None;
        }
        tags.fetch_targets()
            .find(|tag| tag.stripped().to_lowercase() == stem)
            .cloned()
    }
}
