use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poem::http::StatusCode;
use sea_orm::DatabaseConnection;
use sqlx::{postgres::PgHasArrayType, PgPool, Row};
use uuid::Uuid;

use super::{
    ClaimOutcome, Cutoffs, Fingerprint, HeaderPair, IdempotencyRecord, IdempotencyStore,
    RecordKey, ResponseSnapshot,
};

// a claim can lose the race to a concurrent release between the insert and the select
const CLAIM_ATTEMPTS: usize = 3;

#[derive(Debug, sqlx::Type)]
#[sqlx(type_name = "header_pair")]
struct HeaderPairRecord {
    name: String,
    value: Vec<u8>,
}

impl PgHasArrayType for HeaderPairRecord {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_header_pair")
    }
}

/// Idempotency records in the `idempotency` table.
///
/// The primary key on `(scope, idempotency_key)` makes the claim an atomic
/// `insert .. on conflict`; an expired row is overwritten by the same statement.
#[derive(Clone)]
pub struct PostgresIdempotencyStore {
    db: DatabaseConnection,
}

impl PostgresIdempotencyStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn pool(&self) -> &PgPool {
        self.db.get_postgres_connection_pool()
    }

    #[tracing::instrument(skip_all)]
    async fn get_saved_record(
        &self,
        key: &RecordKey,
    ) -> Result<Option<IdempotencyRecord>, anyhow::Error> {
        let row = sqlx::query(
            r#"
            select
                request_fingerprint,
                status,
                lease,
                resp_status_code,
                resp_headers,
                resp_body,
                created_at
            from idempotency
            where
                scope = $1 and
                idempotency_key = $2
            "#,
        )
        .bind(key.scope())
        .bind(key.key().as_ref())
        .fetch_optional(self.pool())
        .await?;
        let Some(r) = row else {
            return Ok(None);
        };

        let status: String = r.try_get("status")?;
        let resp_status_code: Option<i16> = r.try_get("resp_status_code")?;
        let resp_headers: Option<Vec<HeaderPairRecord>> = r.try_get("resp_headers")?;
        let resp_body: Option<Vec<u8>> = r.try_get("resp_body")?;
        let response = match (resp_status_code, resp_body) {
            (Some(code), Some(body)) => {
                let status = StatusCode::from_u16(code.try_into()?)?;
                let headers = resp_headers
                    .unwrap_or_default()
                    .into_iter()
                    .map(|HeaderPairRecord { name, value }| HeaderPair { name, value })
                    .collect();
                Some(ResponseSnapshot {
                    status,
                    headers,
                    body,
                })
            }
            _ => None,
        };
        let fingerprint: Option<String> = r.try_get("request_fingerprint")?;

        Ok(Some(IdempotencyRecord {
            key: key.clone(),
            fingerprint: fingerprint.map(Fingerprint::from_stored),
            status: status.parse()?,
            lease: r.try_get("lease")?,
            response,
            created_at: r.try_get("created_at")?,
        }))
    }
}

#[async_trait]
impl IdempotencyStore for PostgresIdempotencyStore {
    #[tracing::instrument(skip(self, fingerprint, cutoffs))]
    async fn try_claim(
        &self,
        key: &RecordKey,
        fingerprint: Option<&Fingerprint>,
        now: DateTime<Utc>,
        cutoffs: Cutoffs,
    ) -> Result<ClaimOutcome, anyhow::Error> {
        let lease = Uuid::new_v4();
        for _ in 0..CLAIM_ATTEMPTS {
            let num_inserted_rows = sqlx::query(
                r#"
                insert into idempotency (
                    scope,
                    idempotency_key,
                    request_fingerprint,
                    status,
                    lease,
                    created_at
                    )
                values ($1, $2, $3, 'in_progress', $4, $5)
                on conflict (scope, idempotency_key) do update
                set
                    request_fingerprint = excluded.request_fingerprint,
                    status              = excluded.status,
                    lease               = excluded.lease,
                    created_at          = excluded.created_at,
                    resp_status_code    = null,
                    resp_headers        = null,
                    resp_body           = null
                where
                    (idempotency.status = 'completed' and idempotency.created_at < $6) or
                    (idempotency.status = 'in_progress' and idempotency.created_at < $7)
                "#,
            )
            .bind(key.scope())
            .bind(key.key().as_ref())
            .bind(fingerprint.map(Fingerprint::as_str))
            .bind(lease)
            .bind(now)
            .bind(cutoffs.completed_before)
            .bind(cutoffs.in_progress_before)
            .execute(self.pool())
            .await
            .context("fail to claim the idempotency key")?
            .rows_affected();
            if num_inserted_rows > 0 {
                return Ok(ClaimOutcome::Claimed(lease));
            }
            if let Some(record) = self.get_saved_record(key).await? {
                return Ok(ClaimOutcome::Existing(record));
            }
        }
        anyhow::bail!("the idempotency key kept changing hands while it was being claimed")
    }

    #[tracing::instrument(skip(self, response))]
    async fn complete(
        &self,
        key: &RecordKey,
        lease: Uuid,
        response: &ResponseSnapshot,
    ) -> Result<bool, anyhow::Error> {
        let status = i16::try_from(response.status.as_u16())?;
        let headers: Vec<HeaderPairRecord> = response
            .headers
            .iter()
            .map(|h| HeaderPairRecord {
                name: h.name.clone(),
                value: h.value.clone(),
            })
            .collect();
        let num_updated_rows = sqlx::query(
            r#"
            UPDATE idempotency
            SET
                status            = 'completed',
                resp_status_code  = $4,
                resp_headers      = $5,
                resp_body         = $6
            WHERE
                scope            = $1 AND
                idempotency_key  = $2 AND
                lease            = $3 AND
                status           = 'in_progress'
            "#,
        )
        .bind(key.scope())
        .bind(key.key().as_ref())
        .bind(lease)
        .bind(status)
        .bind(headers)
        .bind(response.body.as_slice())
        .execute(self.pool())
        .await
        .context("fail to save the response")?
        .rows_affected();
        Ok(num_updated_rows > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn release(&self, key: &RecordKey, lease: Uuid) -> Result<bool, anyhow::Error> {
        let num_deleted_rows = sqlx::query(
            r#"
            delete from idempotency
            where
                scope = $1 and
                idempotency_key = $2 and
                lease = $3 and
                status = 'in_progress'
            "#,
        )
        .bind(key.scope())
        .bind(key.key().as_ref())
        .bind(lease)
        .execute(self.pool())
        .await
        .context("fail to release the idempotency key")?
        .rows_affected();
        Ok(num_deleted_rows > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn purge_expired(&self, cutoffs: Cutoffs) -> Result<u64, anyhow::Error> {
        let purged = sqlx::query(
            r#"
            delete from idempotency
            where
                (status = 'completed' and created_at < $1) or
                (status = 'in_progress' and created_at < $2)
            "#,
        )
        .bind(cutoffs.completed_before)
        .bind(cutoffs.in_progress_before)
        .execute(self.pool())
        .await
        .context("fail to purge expired idempotency records")?
        .rows_affected();
        Ok(purged)
    }
}
