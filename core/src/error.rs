use std::error::Error as StdError;

use schemata_types::ModelError;
use thiserror::Error;

/// Boxed driver error carried through [`ConnectionError`]
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure reported by the connection layer
///
/// Passed through unchanged; nothing in this crate retries.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConnectionError {
    /// Five-character SQLSTATE, when the driver reports one
    pub sql_state: Option<String>,
    pub message: String,
    #[source]
    pub source: Option<BoxError>,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sql_state: None,
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_sql_state(self, sql_state: impl Into<String>) -> Self {
        Self {
            sql_state: Some(sql_state.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_source(self, source: impl Into<BoxError>) -> Self {
        Self {
            source: Some(source.into()),
            ..self
        }
    }

    /// SQLSTATE 42S02 / 42S22 style check
    #[must_use]
    pub fn has_sql_state(&self, state: &str) -> bool {
        self.sql_state.as_deref() == Some(state)
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    /// The engine or server version cannot report or apply what was asked
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The engine returned metadata that cannot be interpreted
    #[error("Malformed metadata for table '{table}': {message}")]
    MalformedMetadata { table: String, message: String },

    /// Identifier rejected before quoting
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Argument rejected before any SQL was produced
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error from the connection layer
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
}

impl SchemaError {
    pub fn not_supported(what: impl Into<String>) -> Self {
        SchemaError::NotSupported(what.into())
    }

    pub fn malformed(table: impl ToString, message: impl Into<String>) -> Self {
        SchemaError::MalformedMetadata {
            table: table.to_string(),
            message: message.into(),
        }
    }

    /// Attach a table name to a model invariant violation
    pub fn from_model(table: impl ToString, err: ModelError) -> Self {
        Self::malformed(table, err.to_string())
    }

    #[must_use]
    pub const fn is_not_supported(&self) -> bool {
        matches!(self, SchemaError::NotSupported(_))
    }
}

/// Result type for introspection and DDL operations
pub type Result<T> = std::result::Result<T, SchemaError>;
