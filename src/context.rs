use std::sync::Arc;

use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;

use crate::configuration::{Configuration, IdempotencySettings};
use crate::domain::idempotency::{
    IdempotencyGuard, IdempotencyStore, InMemoryIdempotencyStore, PostgresIdempotencyStore,
};
use crate::domain::{Game, Genre, Studio};
use crate::repository::{InMemoryRepository, PostgresRepository, Repository};
use crate::startup::get_database_connection;

/// Everything the handlers share.
#[derive(Clone)]
pub struct StateContext {
    pub studios: Arc<dyn Repository<Studio>>,
    pub genres: Arc<dyn Repository<Genre>>,
    pub games: Arc<dyn Repository<Game>>,
    pub idempotency: IdempotencyGuard,
}

impl StateContext {
    pub async fn new(conf: &Configuration) -> Result<Self, anyhow::Error> {
        match &conf.db {
            Some(db_settings) => {
                let db = get_database_connection(db_settings).await?;
                Migrator::up(&db, None)
                    .await
                    .context("fail to run migrations")?;
                Ok(Self::with_database(db, &conf.idempotency))
            }
            None => {
                tracing::warn!("no database configured, records are kept in memory");
                Ok(Self::in_memory(&conf.idempotency))
            }
        }
    }

    pub fn with_database(db: DatabaseConnection, settings: &IdempotencySettings) -> Self {
        let repository = Arc::new(PostgresRepository::new(db.clone()));
        Self {
            studios: repository.clone(),
            genres: repository.clone(),
            games: repository,
            idempotency: guard(Arc::new(PostgresIdempotencyStore::new(db)), settings),
        }
    }

    pub fn in_memory(settings: &IdempotencySettings) -> Self {
        Self::with_idempotency_store(Arc::new(InMemoryIdempotencyStore::new()), settings)
    }

    /// In-memory repositories guarded by the given store.
    pub fn with_idempotency_store(
        store: Arc<dyn IdempotencyStore>,
        settings: &IdempotencySettings,
    ) -> Self {
        Self {
            studios: Arc::new(InMemoryRepository::new()),
            genres: Arc::new(InMemoryRepository::new()),
            games: Arc::new(InMemoryRepository::new()),
            idempotency: guard(store, settings),
        }
    }
}

fn guard(store: Arc<dyn IdempotencyStore>, settings: &IdempotencySettings) -> IdempotencyGuard {
    IdempotencyGuard::new(store, settings.expiry_policy(), settings.wait_policy())
}
