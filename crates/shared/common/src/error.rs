//! Unified error handling for repositories and store bindings.
//!
//! Provides a single error type shared by:
//! - Store bindings (MongoDB driver, in-memory store)
//! - Repositories (read-path propagation, write-path logging)

use thiserror::Error;

/// MongoDB server code for a unique index violation
#[cfg(feature = "database")]
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Setup
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    // Store errors
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[cfg(feature = "database")]
    #[error("Failed to encode document: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[cfg(feature = "database")]
    #[error("Failed to decode document: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Document failed validation: {0}")]
    DocumentValidation(String),

    #[error("Operation was cancelled")]
    Cancelled,

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get a stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) if self.is_duplicate_key() => "DUPLICATE_KEY",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            #[cfg(feature = "database")]
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            #[cfg(feature = "database")]
            AppError::Deserialization(_) => "DESERIALIZATION_ERROR",
            AppError::DuplicateKey(_) => "DUPLICATE_KEY",
            AppError::DocumentValidation(_) => "DOCUMENT_VALIDATION_ERROR",
            AppError::Cancelled => "CANCELLED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the error was caused by a unique key violation
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            AppError::DuplicateKey(_) => true,
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                use mongodb::error::{ErrorKind, WriteFailure};

                matches!(
                    e.kind.as_ref(),
                    ErrorKind::Write(WriteFailure::WriteError(write_error))
                        if write_error.code == DUPLICATE_KEY_CODE
                )
            }
            _ => false,
        }
    }

    /// Check if the error was caused by a cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn duplicate_key(key: impl Into<String>) -> Self {
        AppError::DuplicateKey(key.into())
    }

    pub fn document_validation(msg: impl Into<String>) -> Self {
        AppError::DocumentValidation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
