use std::time::Duration;

use tracing::{field::display, Span};

use crate::domain::idempotency::IdempotencyGuard;

type CleanupResult<T> = std::result::Result<T, anyhow::Error>;

#[tracing::instrument(skip_all)]
pub async fn run_worker_until_stopped(
    guard: IdempotencyGuard,
    interval: Duration,
) -> CleanupResult<()> {
    worker_loop(&guard, interval).await
}

#[tracing::instrument(skip_all)]
async fn worker_loop(guard: &IdempotencyGuard, interval: Duration) -> CleanupResult<()> {
    loop {
        match try_execute_task(guard).await {
            Ok(_) => {
                tokio::time::sleep(interval).await;
            }
            Err(_) => {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

/// Deletes every expired idempotency record once and returns how many went away.
#[tracing::instrument(skip_all, fields(purged = tracing::field::Empty), err)]
pub async fn try_execute_task(guard: &IdempotencyGuard) -> CleanupResult<u64> {
    let purged = guard.purge_expired().await?;
    Span::current().record("purged", &display(purged));
    if purged > 0 {
        tracing::info!(purged, "expired idempotency records removed");
    }
    Ok(purged)
}
