use thiserror::Error;

/// Error type for daors operations
#[derive(Debug, Error)]
pub enum DaoError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column '{column}' holds {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unsupported column type '{type_name}' for column '{column}'")]
    UnsupportedType { column: String, type_name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DaoError {
    /// True when the storage could not be reached at all, as opposed to a
    /// statement that reached storage and was refused.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, DaoError::ConnectionFailed(_))
    }
}

/// Result type alias for daors operations
pub type Result<T> = std::result::Result<T, DaoError>;
