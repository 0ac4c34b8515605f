use thiserror::Error;

use crate::app::ports::TransportError;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Failed to reshape export: {0}")]
    Reshape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
