use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::PgPool;
use tracing::info;

use crate::configuration::RelationalDBSettings;

pub async fn get_database_connection(sql: &RelationalDBSettings) -> Result<DatabaseConnection> {
    info!(
        host = %sql.host,
        port = sql.port,
        database = %sql.name,
        "connecting to db"
    );

    let pg_options = sql.options_with_db();
    let pool = PgPool::connect_with(pg_options).await?;
    let db = SqlxPostgresConnector::from_sqlx_postgres_pool(pool);
    Ok(db)
}
