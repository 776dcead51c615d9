use anyhow::{anyhow, Context, Result};
use catalog_protocol::{FileNaming, TagList};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_SOURCE: &str = "./Assets/components/";
pub const DEFAULT_OPEN_DEPTH: usize = 2;
pub const MAX_OPEN_DEPTH: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    source: Option<String>,
    tags: Option<Vec<String>>,
    file_prefix: Option<String>,
    open_depth: Option<i64>,
}

/// Effective viewer settings after merging the config file with defaults.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub source: String,
    pub tags: TagList,
    pub naming: FileNaming,
    pub open_depth: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            tags: TagList::default(),
            naming: FileNaming::default(),
            open_depth: DEFAULT_OPEN_DEPTH,
        }
    }
}

impl CatalogConfig {
    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_bytes(&bytes)
                    .with_context(|| format!("Invalid config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_raw(parse_raw(bytes)?)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let defaults = Self::default();
        let tags = match raw.tags {
            Some(labels) => TagList::new(labels)?,
            None => defaults.tags,
        };
        let naming = raw
            .file_prefix
            .map(FileNaming::with_prefix)
            .unwrap_or(defaults.naming);
        let source = raw
            .source
            .filter(|source| !source.trim().is_empty())
            .unwrap_or(defaults.source);
        Ok(Self {
            source,
            tags,
            naming,
            open_depth: raw
                .open_depth
                .map_or(defaults.open_depth, clamp_open_depth),
        })
    }
}

pub fn clamp_open_depth(depth: i64) -> usize {
    usize::try_from(depth.max(0))
        .unwrap_or(MAX_OPEN_DEPTH)
        .min(MAX_OPEN_DEPTH)
}

fn parse_raw(bytes: &[u8]) -> Result<RawConfig> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!("Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}")
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML config to JSON: {err}"))?
        }
    };
    serde_json::from_value(value).map_err(|err| anyhow!("Config parse error: {err}"))
}
