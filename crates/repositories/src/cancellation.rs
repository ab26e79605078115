//! Cancellation of in-flight store calls.

use std::future::Future;

pub use tokio_util::sync::CancellationToken;

use common::{AppError, AppResult};

/// Await `operation` unless `cancel` fires first.
///
/// When the token is triggered before the operation completes, the operation
/// future is dropped and [`AppError::Cancelled`] is returned. A token that is
/// already cancelled wins even if the operation is immediately ready.
pub async fn with_cancellation<F, T>(cancel: Option<&CancellationToken>, operation: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(AppError::Cancelled),
                result = operation => result,
            }
        }
        None => operation.await,
    }
}
