//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Unified error handling for store bindings and repositories
//! - Store configuration
//! - The error logging sink and tracing setup

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::{AppError, AppResult};
pub use logging::{init_tracing, ErrorLogger, TracingErrorLogger};

#[cfg(any(test, feature = "test-utils"))]
pub use logging::MockErrorLogger;
