//! Error types for shop-core.

use thiserror::Error;

/// Errors raised while loading configuration or building a request context.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config content could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    /// Config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    ConfigWrite(String),

    /// Request line could not be interpreted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::ConfigParse(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::ConfigParse(e.to_string())
    }
}
