use std::str::FromStr;

use chrono::{DateTime, Utc};
use poem::{http::StatusCode, Response};
use uuid::Uuid;

use super::{Cutoffs, Fingerprint, IdempotencyKey};

/// Where an idempotency key lives: the same key under two scopes names two
/// unrelated records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    scope: String,
    key: IdempotencyKey,
}

impl RecordKey {
    pub fn new(scope: impl Into<String>, key: IdempotencyKey) -> Self {
        Self {
            scope: scope.into(),
            key,
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn key(&self) -> &IdempotencyKey {
        &self.key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    InProgress,
    Completed,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::InProgress => "in_progress",
            RecordStatus::Completed => "completed",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(RecordStatus::InProgress),
            "completed" => Ok(RecordStatus::Completed),
            other => Err(anyhow::anyhow!("unknown idempotency record status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPair {
    pub name: String,
    pub value: Vec<u8>,
}

/// The response of the first execution, replayed verbatim to retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub status: StatusCode,
    pub headers: Vec<HeaderPair>,
    pub body: Vec<u8>,
}

impl ResponseSnapshot {
    // we assume the memory can hold the whole body
    pub async fn capture(resp: Response) -> poem::Result<Self> {
        let status = resp.status();
        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| HeaderPair {
                name: name.as_str().to_owned(),
                value: value.as_bytes().to_owned(),
            })
            .collect();
        let body = resp.into_body().into_bytes().await?;
        Ok(Self {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
    pub key: RecordKey,
    pub fingerprint: Option<Fingerprint>,
    pub status: RecordStatus,
    /// Identifies the claim currently owning an in-progress record.
    pub lease: Uuid,
    pub response: Option<ResponseSnapshot>,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    pub fn in_progress(
        key: RecordKey,
        fingerprint: Option<Fingerprint>,
        lease: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            fingerprint,
            status: RecordStatus::InProgress,
            lease,
            response: None,
            created_at,
        }
    }

    pub fn is_expired(&self, cutoffs: &Cutoffs) -> bool {
        let cutoff = match self.status {
            RecordStatus::InProgress => cutoffs.in_progress_before,
            RecordStatus::Completed => cutoffs.completed_before,
        };
        self.created_at < cutoff
    }
}
