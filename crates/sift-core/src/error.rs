//! Error types for relevance query synthesis.
//!
//! Every failure in this crate is a deterministic configuration or schema
//! problem. Nothing here performs I/O beyond schema introspection, so no
//! error is ever worth retrying.

use thiserror::Error;

/// Main error type for the sift library.
#[derive(Debug, Error)]
pub enum SiftError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid join for table {table}: {message}")]
    InvalidJoin { table: String, message: String },

    // Schema errors
    #[error("Schema introspection failed for {table}: {message}")]
    Schema {
        table: String,
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;

impl From<serde_json::Error> for SiftError {
    fn from(err: serde_json::Error) -> Self {
        SiftError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for SiftError {
    fn from(err: rusqlite::Error) -> Self {
        SiftError::Schema {
            table: String::new(),
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl SiftError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SiftError::Config {
            message: message.into(),
        }
    }

    /// Create a schema error for a table with an optional database cause.
    pub fn schema(
        table: impl Into<String>,
        message: impl Into<String>,
        source: Option<rusqlite::Error>,
    ) -> Self {
        SiftError::Schema {
            table: table.into(),
            message: message.into(),
            source,
        }
    }

    /// Whether the error stems from the entity's search configuration
    /// (including the schema it falls back to) rather than from parsing input.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SiftError::Config { .. } | SiftError::InvalidJoin { .. } | SiftError::Schema { .. }
        )
    }
}
