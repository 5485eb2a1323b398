//! Timeout and error-kind discipline for object-store calls.

use std::future::Future;
use std::time::Duration;

use dbox_core::error::{AppError, ErrorKind};
use dbox_core::result::AppResult;

/// Run one object-store call under `limit`.
///
/// A timeout is reported as `kind`, the failure kind of the step. Errors
/// from the call keep their kind when it is meaningful to the caller
/// (missing object, bad key, taken key); anything else is re-tagged as
/// `kind` so each step fails with the kind that names it.
pub async fn bounded<T, F>(limit: Duration, kind: ErrorKind, step: &str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(retag(err, kind)),
        Err(_) => Err(AppError::new(
            kind,
            format!("{step} timed out after {}ms", limit.as_millis()),
        )),
    }
}

fn retag(err: AppError, kind: ErrorKind) -> AppError {
    match err.kind {
        ErrorKind::ObjectNotFound | ErrorKind::Validation | ErrorKind::Conflict => err,
        _ => err.into_kind(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_step_kind() {
        let err = bounded(
            Duration::from_secs(1),
            ErrorKind::ObjectStoreDeleteFailed,
            "delete a.txt",
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObjectStoreDeleteFailed);
        assert!(err.message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_retags_generic_failures_only() {
        let err = bounded::<(), _>(
            Duration::from_secs(1),
            ErrorKind::ObjectStoreWriteFailed,
            "copy",
            async { Err(AppError::internal("connection reset")) },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObjectStoreWriteFailed);

        let err = bounded::<(), _>(
            Duration::from_secs(1),
            ErrorKind::ObjectStoreWriteFailed,
            "copy",
            async { Err(AppError::object_not_found("a.txt")) },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObjectNotFound);
    }
}
