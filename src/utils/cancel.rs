//! Cooperative cancellation for collaborator calls.

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::sources::ServiceError;

/// Race `fut` against `cancel`.
///
/// Returns [`ServiceError::Cancelled`] without polling `fut` when the token is
/// already cancelled, and as soon as it fires otherwise. The in-flight future
/// is dropped at that point.
pub async fn run_cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    if cancel.is_cancelled() {
        return Err(ServiceError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ServiceError::Cancelled),
        res = fut => res,
    }
}
