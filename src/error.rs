//! Error types for the SQLite MCP Server.
//!
//! This module defines the semantic error taxonomy used across the gateway.
//! Driver messages are passed through verbatim so callers see exactly what
//! SQLite reported.

use thiserror::Error;

/// Domain-specific errors for the SQLite MCP Server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database file could not be opened or created
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// SQL text matched a disallowed pattern and was never executed
    #[error("Statement rejected: {0}")]
    ValidationRejected(String),

    /// A read-only entry point received text classified as mutating
    #[error("Operation not allowed: {0}")]
    OperationNotAllowed(String),

    /// Driver-level failure during prepare/bind/execute
    #[error("Database error: {0}")]
    Database(String),

    /// A statement failed mid-batch; the driver rolled the batch back
    #[error("Transaction aborted at statement {index}: {message} (statement: {statement})")]
    TransactionAborted {
        /// 1-based position of the failing statement.
        index: usize,
        statement: String,
        message: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation rejection.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::ValidationRejected(msg.into())
    }

    /// Create an operation-not-allowed error.
    pub fn not_allowed(msg: impl Into<String>) -> Self {
        Self::OperationNotAllowed(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error stems from the request rather than the server.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationRejected(_) | Self::OperationNotAllowed(_) | Self::InvalidInput(_)
        )
    }
}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::CannotOpen =>
            {
                ServerError::connection_with_source("unable to open database file", e)
            }
            _ => ServerError::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_maps_to_database() {
        let err = rusqlite::Error::InvalidQuery;
        assert!(matches!(ServerError::from(err), ServerError::Database(_)));
    }

    #[test]
    fn test_caller_error_detection() {
        assert!(ServerError::rejected("no").is_caller_error());
        assert!(ServerError::not_allowed("no").is_caller_error());
        assert!(!ServerError::database("boom").is_caller_error());
        assert!(!ServerError::connection("boom").is_caller_error());
    }

    #[test]
    fn test_transaction_aborted_display() {
        let err = ServerError::TransactionAborted {
            index: 2,
            statement: "INSERT INTO missing(a) VALUES (1)".to_string(),
            message: "no such table: missing".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("statement 2"));
        assert!(text.contains("no such table"));
    }
}
