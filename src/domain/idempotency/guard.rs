use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{field::display, Span};
use uuid::Uuid;

use super::{
    ClaimOutcome, Cutoffs, Fingerprint, IdempotencyError, IdempotencyStore, RecordKey,
    RecordStatus, ResponseSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Lifetime of a completed record.
    pub ttl: Duration,
    /// Lifetime of a claim whose operation never reported back.
    pub in_progress_ttl: Duration,
}

impl ExpiryPolicy {
    pub fn cutoffs(&self, now: DateTime<Utc>) -> Cutoffs {
        Cutoffs {
            completed_before: cutoff(now, self.ttl),
            in_progress_before: cutoff(now, self.in_progress_ttl),
        }
    }
}

fn cutoff(now: DateTime<Utc>, age: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(age)
        .ok()
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// How a duplicate request behaves while the original is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug)]
pub struct Execution {
    pub response: ResponseSnapshot,
    /// False for the execution that actually ran the operation.
    pub replayed: bool,
}

#[derive(Debug)]
pub enum GuardError<E> {
    Rejected(IdempotencyError),
    /// The operation itself failed; the key was released.
    Operation(E),
}

impl<E> From<IdempotencyError> for GuardError<E> {
    fn from(e: IdempotencyError) -> Self {
        GuardError::Rejected(e)
    }
}

enum NextAction {
    ContinueProcessing(Uuid),
    ReturnSavedResponse(ResponseSnapshot),
}

/// Runs operations at most once per [`RecordKey`].
#[derive(Clone)]
pub struct IdempotencyGuard {
    store: Arc<dyn IdempotencyStore>,
    expiry: ExpiryPolicy,
    wait: WaitPolicy,
}

impl IdempotencyGuard {
    pub fn new(store: Arc<dyn IdempotencyStore>, expiry: ExpiryPolicy, wait: WaitPolicy) -> Self {
        Self {
            store,
            expiry,
            wait,
        }
    }

    /// Runs `operation` unless a live record exists for `key`, in which case the
    /// recorded response is returned instead.
    ///
    /// A failed operation releases the key before its error is handed back, so a
    /// retry with the same key executes again.
    #[tracing::instrument(
        name = "idempotent execution",
        skip_all,
        fields(scope = %key.scope(), idempotency_key = %key.key().as_ref(), replayed = tracing::field::Empty)
    )]
    pub async fn execute<F, Fut, E>(
        &self,
        key: RecordKey,
        fingerprint: Option<Fingerprint>,
        operation: F,
    ) -> Result<Execution, GuardError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResponseSnapshot, E>>,
    {
        let lease = match self.try_processing(&key, fingerprint.as_ref()).await? {
            NextAction::ContinueProcessing(lease) => lease,
            NextAction::ReturnSavedResponse(response) => {
                Span::current().record("replayed", &display(true));
                return Ok(Execution {
                    response,
                    replayed: true,
                });
            }
        };
        Span::current().record("replayed", &display(false));

        match operation().await {
            Ok(response) => {
                match self.store.complete(&key, lease, &response).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::warn!("idempotency record was taken over before the operation completed")
                    }
                    Err(e) => {
                        tracing::error!(error.cause_chain = ?e, error.message = %e, "fail to save the response")
                    }
                }
                Ok(Execution {
                    response,
                    replayed: false,
                })
            }
            Err(e) => {
                if let Err(store_error) = self.store.release(&key, lease).await {
                    tracing::error!(
                        error.cause_chain = ?store_error,
                        error.message = %store_error,
                        "fail to release the idempotency key after a failed operation"
                    );
                }
                Err(GuardError::Operation(e))
            }
        }
    }

    async fn try_processing(
        &self,
        key: &RecordKey,
        fingerprint: Option<&Fingerprint>,
    ) -> Result<NextAction, IdempotencyError> {
        let started = Instant::now();
        loop {
            let now = Utc::now();
            let outcome = self
                .store
                .try_claim(key, fingerprint, now, self.expiry.cutoffs(now))
                .await
                .map_err(IdempotencyError::Store)?;
            let record = match outcome {
                ClaimOutcome::Claimed(lease) => return Ok(NextAction::ContinueProcessing(lease)),
                ClaimOutcome::Existing(record) => record,
            };
            if record.fingerprint.as_ref() != fingerprint {
                return Err(IdempotencyError::KeyConflict);
            }
            if record.status == RecordStatus::Completed {
                let response = record.response.ok_or_else(|| {
                    IdempotencyError::Store(anyhow::anyhow!("a saved response expected"))
                })?;
                return Ok(NextAction::ReturnSavedResponse(response));
            }
            if started.elapsed() >= self.wait.max_wait {
                return Err(IdempotencyError::ConcurrentInProgress);
            }
            tracing::debug!("waiting for the in-progress request with the same key");
            tokio::time::sleep(self.wait.poll_interval).await;
        }
    }

    /// Deletes every record the expiry policy considers dead.
    pub async fn purge_expired(&self) -> Result<u64, anyhow::Error> {
        let now = Utc::now();
        self.store.purge_expired(self.expiry.cutoffs(now)).await
    }
}
