mod error;
mod filter;
mod query;
mod selection;
mod view;

pub use error::{Result, SearchError};
pub use filter::{filter_document, prune_category, search};
pub use query::Query;
pub use selection::select_tag;
pub use view::{CatalogView, ViewEvent};
