//! Idempotent execution of mutating requests.
//!
//! A request carrying an idempotency key is executed at most once per
//! [`RecordKey`] (scope + key). The first execution claims the key, runs the
//! operation and records its response; retries are answered from the record.

mod fingerprint;
mod guard;
mod persistence;
mod record;
mod store;

pub use fingerprint::Fingerprint;
pub use guard::{Execution, ExpiryPolicy, GuardError, IdempotencyGuard, WaitPolicy};
pub use persistence::PostgresIdempotencyStore;
pub use record::{HeaderPair, IdempotencyRecord, RecordKey, RecordStatus, ResponseSnapshot};
pub use store::{ClaimOutcome, Cutoffs, IdempotencyStore, InMemoryIdempotencyStore};

const MAX_LENGTH: usize = 255;

#[derive(thiserror::Error, Debug)]
pub enum IdempotencyError {
    #[error("the X-Idempotency-Key header is required")]
    MissingKey,

    #[error("the idempotency key must be at most {MAX_LENGTH} bytes long")]
    InvalidKey,

    #[error("the idempotency key was already used with a different request payload")]
    KeyConflict,

    #[error("a request with the same idempotency key is still being processed")]
    ConcurrentInProgress,

    #[error("fail to access the idempotency store")]
    Store(#[source] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Parses the raw header value; an absent or blank header is a missing key.
    pub fn parse(raw: Option<&str>) -> Result<Self, IdempotencyError> {
        match raw {
            None => Err(IdempotencyError::MissingKey),
            Some(s) => Self::try_from(s.to_owned()),
        }
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdempotencyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim().is_empty() {
            return Err(IdempotencyError::MissingKey);
        }
        if s.len() > MAX_LENGTH {
            return Err(IdempotencyError::InvalidKey);
        }
        Ok(Self(s))
    }
}

impl From<IdempotencyKey> for String {
    fn from(k: IdempotencyKey) -> String {
        k.0
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
