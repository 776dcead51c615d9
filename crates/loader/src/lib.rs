//! # Catalog Loader
//!
//! Builds one canonical [`CatalogDocument`](catalog_protocol::CatalogDocument)
//! out of per-tag JSON fragments.
//!
//! ## Pipeline
//!
//! ```text
//! TagList (minus "all")
//!     │
//!     ├──> FragmentSource (directory | HTTP | chosen files), one task per tag
//!     │      └─> raw bytes or a skip reason
//!     │
//!     ├──> Shape classification (direct | wrapped | unrecognized)
//!     │      └─> CategoryNode or a skip reason
//!     │
//!     └──> Merge by tag once every task has settled
//!            └─> CatalogDocument (empty when nothing loaded)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use catalog_loader::{DirectorySource, Loader};
//! use catalog_protocol::TagList;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let loader = Loader::new(DirectorySource::new("./Assets/components"));
//!     let doc = loader.load_all(&TagList::default()).await?;
//!
//!     println!("Loaded {} categories", doc.len());
//!     Ok(())
//! }
//! ```

mod error;
mod loader;
mod local;
mod outcome;
mod shape;
mod source;

pub use error::{LoaderError, Result};
pub use loader::{LoadReport, Loader};
pub use local::{merge_local_files, merge_local_paths, LocalFile, MergeReport};
pub use outcome::{FragmentOutcome, SkipReason};
pub use shape::{classify, normalize_fragment, FragmentShape};
pub use source::{DirectorySource, FragmentSource, HttpSource, LocalFileSet};
