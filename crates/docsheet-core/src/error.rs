//! Error types for docsheet

use thiserror::Error;

/// Core error type for document store operations
#[derive(Error, Debug)]
pub enum DocsheetError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Connection is closed")]
    Closed,
}

/// Result type alias for docsheet operations
pub type Result<T> = std::result::Result<T, DocsheetError>;
