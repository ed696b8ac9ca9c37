use std::time::Duration;

use config::{Config, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::domain::idempotency::{ExpiryPolicy, WaitPolicy};

#[derive(Deserialize, Debug, Clone)]
pub struct Configuration {
    pub host: String,
    pub app_port: u16,
    pub log_level: Option<String>,
    /// Without a database section the service keeps everything in memory.
    pub db: Option<RelationalDBSettings>,
    #[serde(default)]
    pub idempotency: IdempotencySettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RelationalDBSettings {
    pub username: String,
    pub password: Secret<String>,
    pub port: u16,
    pub host: String,
    pub name: String,
}

impl RelationalDBSettings {
    pub fn options_without_db(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
    }

    pub fn options_with_db(&self) -> PgConnectOptions {
        self.options_without_db().database(&self.name)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct IdempotencySettings {
    /// How long a completed response stays replayable.
    pub ttl_secs: u64,
    /// How long an unfinished claim blocks its key before it is considered abandoned.
    pub in_progress_ttl_secs: u64,
    /// How long a duplicate request waits for the original to finish; 0 fails fast.
    pub max_wait_ms: u64,
    pub poll_interval_ms: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for IdempotencySettings {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            in_progress_ttl_secs: 60,
            max_wait_ms: 5_000,
            poll_interval_ms: 25,
            cleanup_interval_secs: 60,
        }
    }
}

impl IdempotencySettings {
    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy {
            ttl: Duration::from_secs(self.ttl_secs),
            in_progress_ttl: Duration::from_secs(self.in_progress_ttl_secs),
        }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            max_wait: Duration::from_millis(self.max_wait_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

pub fn get_configuration() -> Result<Configuration, config::ConfigError> {
    get_test_configuration("config/prod")
}

pub fn get_test_configuration(path: &str) -> Result<Configuration, config::ConfigError> {
    let conf = Config::builder()
        .set_default("log_level", Some("DEBUG"))?
        .set_default("host", "127.0.0.1")?
        .set_default("app_port", 8000)?
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("app")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;
    conf.try_deserialize()
}
