//! Listing error types.

use http::StatusCode;
use thiserror::Error;

/// Errors raised while translating, executing or rendering a listing query.
#[derive(Error, Debug)]
pub enum ListingError {
    /// A query parameter failed validation.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// No listing matched, or the search service returned nothing.
    #[error("No listing found")]
    NotFound,

    /// No search backend capable of running the query is available.
    #[error("Search backend unavailable")]
    BackendUnavailable,

    /// Listings are only served to GET requests.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// The search backend failed or answered with something unreadable.
    #[error("Search backend error: {0}")]
    Backend(String),

    /// Configuration could not be applied.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ListingError {
    /// Create a validation error.
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        ListingError::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// HTTP status the error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            ListingError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ListingError::NotFound | ListingError::BackendUnavailable => StatusCode::NOT_FOUND,
            ListingError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ListingError::Backend(_) => StatusCode::BAD_GATEWAY,
            ListingError::Config(_) | ListingError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for ListingError {
    fn from(e: serde_json::Error) -> Self {
        ListingError::Serialization(e.to_string())
    }
}
