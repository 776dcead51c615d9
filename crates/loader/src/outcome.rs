use catalog_protocol::{CategoryNode, Tag};
use std::fmt;

/// Why a fragment contributed nothing to the merged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Fetch(String),
    Parse(String),
    UnrecognizedShape,
    TaskFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fetch(err) => write!(f, "fetch failed: {err}"),
            SkipReason::Parse(err) => write!(f, "invalid JSON: {err}"),
            SkipReason::UnrecognizedShape => f.write_str("unrecognized fragment shape"),
            SkipReason::TaskFailed(err) => write!(f, "fetch task failed: {err}"),
        }
    }
}

/// Terminal state of one per-tag load attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentOutcome {
    Loaded {
        tag: Tag,
        source: String,
        node: CategoryNode,
    },
    Skipped {
        tag: Tag,
        source: String,
        reason: SkipReason,
    },
}

impl FragmentOutcome {
    #[must_use]
    pub fn tag(&self) -> &Tag {
        match self {
            FragmentOutcome::Loaded { tag, .. } | FragmentOutcome::Skipped { tag, .. } => tag,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            FragmentOutcome::Loaded { source, .. } | FragmentOutcome::Skipped { source, .. } => {
                source
            }
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, FragmentOutcome::Loaded { .. })
    }

    #[must_use]
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            FragmentOutcome::Skipped { reason, .. } => Some(reason),
            FragmentOutcome::Loaded { .. } => None,
        }
    }
}
