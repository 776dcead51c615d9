use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoaderError>;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Fragment source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("No fragment provided for tag '{0}'")]
    MissingFragment(String),

    #[error("{0}")]
    Other(String),
}
