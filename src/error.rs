//! Error types for the I/O edges of the crate.
//!
//! The analytics functions themselves are total; only loading, configuration
//! and export can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unsupported input: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
