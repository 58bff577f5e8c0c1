//! Error types for assignsync.

use thiserror::Error;

/// Errors that can occur while syncing a feed into Notion.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not fetch calendar feed: {0}")]
    Fetch(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Could not read existing records: {0}")]
    StoreRead(String),

    #[error("Could not create record: {0}")]
    StoreWrite(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<::config::ConfigError> for SyncError {
    fn from(err: ::config::ConfigError) -> Self {
        SyncError::Config(err.to_string())
    }
}

/// Result type alias for assignsync operations.
pub type SyncResult<T> = Result<T, SyncError>;
