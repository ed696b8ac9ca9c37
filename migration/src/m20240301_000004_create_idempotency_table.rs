use sea_orm_migration::{prelude::*, sea_orm::ConnectionTrait};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE TYPE header_pair AS (
                name TEXT,
                value BYTEA
                );",
        )
        .await?;
        // response columns stay NULL while the request is in progress
        db.execute_unprepared(
            r#"create table idempotency (
                scope TEXT NOT NULL,
                idempotency_key TEXT NOT NULL,
                request_fingerprint TEXT,
                status TEXT NOT NULL,
                lease uuid NOT NULL,
                resp_status_code SMALLINT,
                resp_headers header_pair[],
                resp_body BYTEA,
                created_at timestamptz NOT NULL,
                PRIMARY KEY(scope, idempotency_key)
                );"#,
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX idempotency_created_at_idx ON idempotency (status, created_at);",
        )
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS idempotency;")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS header_pair;")
            .await?;
        Ok(())
    }
}
