//! Error types for the tracker CLI.

use std::path::PathBuf;

/// All errors that can occur during tracker operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("data file error: {path}: {source}")]
    Data {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse data file: {0}")]
    DataParse(#[from] serde_json::Error),

    #[error("invalid position: {0}")]
    Validation(#[from] folio::ValidationError),

    #[error("share error: {0}")]
    Share(#[from] folio::ShareError),

    #[error("quote error: {0}")]
    Quote(String),

    #[error("no quote provider configured — set quotes.api_key in config.toml")]
    NoProvider,

    #[error("aborted: {0}")]
    Aborted(String),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
