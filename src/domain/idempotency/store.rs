use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::{Fingerprint, IdempotencyRecord, RecordKey, RecordStatus, ResponseSnapshot};

/// Records created before these instants are expired and count as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoffs {
    pub completed_before: DateTime<Utc>,
    pub in_progress_before: DateTime<Utc>,
}

#[derive(Debug)]
pub enum ClaimOutcome {
    /// The caller now owns the key and must complete or release it with this lease.
    Claimed(Uuid),
    Existing(IdempotencyRecord),
}

/// Storage for idempotency records.
///
/// `try_claim` is the only synchronisation point: for a given key at most one
/// caller can observe `Claimed` until the record is released or expires.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn try_claim(
        &self,
        key: &RecordKey,
        fingerprint: Option<&Fingerprint>,
        now: DateTime<Utc>,
        cutoffs: Cutoffs,
    ) -> Result<ClaimOutcome, anyhow::Error>;

    /// Attaches the response and marks the record completed. Returns false when
    /// the lease no longer owns an in-progress record.
    async fn complete(
        &self,
        key: &RecordKey,
        lease: Uuid,
        response: &ResponseSnapshot,
    ) -> Result<bool, anyhow::Error>;

    /// Drops an in-progress record so the key can be retried.
    async fn release(&self, key: &RecordKey, lease: Uuid) -> Result<bool, anyhow::Error>;

    async fn purge_expired(&self, cutoffs: Cutoffs) -> Result<u64, anyhow::Error>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryIdempotencyStore {
    records: Arc<DashMap<RecordKey, IdempotencyRecord>>,
}

impl InMemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &RecordKey) -> Option<IdempotencyRecord> {
        self.records.get(key).map(|record| record.clone())
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn try_claim(
        &self,
        key: &RecordKey,
        fingerprint: Option<&Fingerprint>,
        now: DateTime<Utc>,
        cutoffs: Cutoffs,
    ) -> Result<ClaimOutcome, anyhow::Error> {
        let lease = Uuid::new_v4();
        let fresh = IdempotencyRecord::in_progress(key.clone(), fingerprint.cloned(), lease, now);
        // the entry holds the shard lock until it is dropped
        let outcome = match self.records.entry(key.clone()) {
            Entry::Occupied(mut entry) if entry.get().is_expired(&cutoffs) => {
                entry.insert(fresh);
                ClaimOutcome::Claimed(lease)
            }
            Entry::Occupied(entry) => ClaimOutcome::Existing(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(fresh);
                ClaimOutcome::Claimed(lease)
            }
        };
        Ok(outcome)
    }

    async fn complete(
        &self,
        key: &RecordKey,
        lease: Uuid,
        response: &ResponseSnapshot,
    ) -> Result<bool, anyhow::Error> {
        let Some(mut record) = self.records.get_mut(key) else {
            return Ok(false);
        };
        if record.lease != lease || record.status != RecordStatus::InProgress {
            return Ok(false);
        }
        record.status = RecordStatus::Completed;
        record.response = Some(response.clone());
        Ok(true)
    }

    async fn release(&self, key: &RecordKey, lease: Uuid) -> Result<bool, anyhow::Error> {
        let removed = self.records.remove_if(key, |_, record| {
            record.lease == lease && record.status == RecordStatus::InProgress
        });
        Ok(removed.is_some())
    }

    async fn purge_expired(&self, cutoffs: Cutoffs) -> Result<u64, anyhow::Error> {
        let mut purged = 0;
        self.records.retain(|_, record| {
            let expired = record.is_expired(&cutoffs);
            if expired {
                purged += 1;
            }
            !expired
        });
        Ok(purged)
    }
}
