use crate::error::{LoaderError, Result};
use crate::local::LocalFile;
use async_trait::async_trait;
use catalog_protocol::{FileNaming, Tag, TagList};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};

/// Where per-tag fragments come from.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Identifier of the fragment for `tag`, recorded in document meta.
    fn describe(&self, tag: &Tag) -> String;

    /// Fails when the source cannot be used at all, as opposed to a single
    /// fragment being missing.
    async fn check_available(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, tag: &Tag) -> Result<Vec<u8>>;
}

/// Fragments stored as `<base>/<file_name_for_tag>`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    base: PathBuf,
    naming: FileNaming,
}

impl DirectorySource {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            naming: FileNaming::default(),
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: FileNaming) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn path_for(&self, tag: &Tag) -> PathBuf {
        self.base.join(self.naming.file_name_for_tag(tag))
    }
}

#[async_trait]
impl FragmentSource for DirectorySource {
    fn describe(&self, tag: &Tag) -> String {
        self.path_for(tag).display().to_string()
    }

    async fn check_available(&self) -> Result<()> {
        match tokio::fs::metadata(&self.base).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(LoaderError::SourceUnavailable(format!(
                "{} is not a directory",
                self.base.display()
            ))),
            Err(err) => Err(LoaderError::SourceUnavailable(format!(
                "{}: {err}",
                self.base.display()
            ))),
        }
    }

    async fn fetch(&self, tag: &Tag) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.path_for(tag)).await?)
    }
}

/// Fragments served over HTTP relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    naming: FileNaming,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client,
            base_url,
            naming: FileNaming::default(),
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: FileNaming) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn parsed_base(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| LoaderError::InvalidBaseUrl(format!("{}: {err}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoaderError::InvalidBaseUrl(format!(
                "{}: unsupported scheme '{}'",
                self.base_url,
                url.scheme()
            )));
        }
        Ok(url)
    }

    fn url_for(&self, tag: &Tag) -> Result<Url> {
        let file_name = self.naming.file_name_for_tag(tag);
        self.parsed_base()?
            .join(&file_name)
            .map_err(|err| LoaderError::InvalidBaseUrl(format!("{file_name}: {err}")))
    }
}

#[async_trait]
impl FragmentSource for HttpSource {
    fn describe(&self, tag: &Tag) -> String {
        format!("{}{}", self.base_url, self.naming.file_name_for_tag(tag))
    }

    async fn check_available(&self) -> Result<()> {
        self.parsed_base().map(|_| ())
    }

    async fn fetch(&self, tag: &Tag) -> Result<Vec<u8>> {
        let url = self.url_for(tag)?;
        let response = self
            .client
            .get(url.clone())
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// User-chosen files matched to tags by file name.
#[derive(Debug, Clone)]
pub struct LocalFileSet {
    files: Vec<LocalFile>,
    tags: TagList,
    naming: FileNaming,
}

impl LocalFileSet {
    pub fn new(files: Vec<LocalFile>, tags: TagList) -> Self {
        Self {
            files,
            tags,
            naming: FileNaming::default(),
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: FileNaming) -> Self {
        self.naming = naming;
        self
    }

    // Later files win when several resolve to the same tag.
    fn file_for(&self, tag: &Tag) -> Option<&LocalFile> {
        self.files.iter().rev().find(|file| {
            self.naming
                .resolve_tag_from_file_name(&file.name, &self.tags)
                .is_some_and(|resolved| resolved == *tag)
        })
    }
}

#[async_trait]
impl FragmentSource for LocalFileSet {
    fn describe(&self, tag: &Tag) -> String {
        self.file_for(tag)
            .map(|file| file.name.clone())
            .unwrap_or_else(|| self.naming.file_name_for_tag(tag))
    }

    async fn fetch(&self, tag: &Tag) -> Result<Vec<u8>> {
        self.file_for(tag)
            .map(|file| file.content.clone())
            .ok_or_else(|| LoaderError::MissingFragment(tag.to_string()))
    }
}
