//! Logging sink for write-path failures and tracing setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AppError;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Sink receiving errors that repositories absorb instead of returning.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ErrorLogger: Send + Sync {
    /// Record a failed operation
    fn log_error(&self, error: &AppError);
}

/// [`ErrorLogger`] emitting one `tracing` error event per failure.
#[derive(Debug, Clone)]
pub struct TracingErrorLogger {
    component: String,
}

impl TracingErrorLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }
}

impl Default for TracingErrorLogger {
    fn default() -> Self {
        Self::new("repository")
    }
}

impl ErrorLogger for TracingErrorLogger {
    fn log_error(&self, error: &AppError) {
        tracing::error!(
            component = %self.component,
            code = error.code(),
            error = %error,
            "Store operation failed"
        );
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_directive`. Does nothing if a
/// subscriber is already installed.
pub fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_logger_accepts_errors() {
        init_tracing("debug");

        let logger = TracingErrorLogger::new("persons");
        logger.log_error(&AppError::Cancelled);
        logger.log_error(&AppError::internal("boom"));
    }

    #[test]
    fn test_mock_logger_records_calls() {
        let mut logger = MockErrorLogger::new();
        logger
            .expect_log_error()
            .withf(|error| error.is_cancelled())
            .times(1)
            .return_const(());

        logger.log_error(&AppError::Cancelled);
    }
}
