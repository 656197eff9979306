use crate::config::parameter::ParameterError;
use crate::config::logging::Environment;
use crate::config::settings::DatabaseConfig;
use async_trait::async_trait;
use sqlx::{pool::PoolOptions, Error, Pool, Postgres};
use std::time::Duration;
use tracing::info;

pub struct Database {
    pool: Pool<Postgres>,
}

#[async_trait]
pub trait DatabaseTrait {
    async fn init(config: &DatabaseConfig, environment: Environment) -> Result<Self, Error>
    where
        Self: Sized;
    async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError>;
    fn get_pool(&self) -> &Pool<Postgres>;
}

#[async_trait]
impl DatabaseTrait for Database {
    async fn init(config: &DatabaseConfig, environment: Environment) -> Result<Self, Error> {
        let database_url = config.url.as_deref().ok_or_else(|| {
            Error::Configuration(Box::new(ParameterError::Missing("DATABASE_URL".to_string())))
        })?;

        let pool = PoolOptions::<Postgres>::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .max_lifetime(Duration::from_secs(config.max_lifetime_seconds))
            .connect(database_url)
            .await?;

        // Pool sizing is only worth logging outside production
        if environment != Environment::Production {
            info!(
                "Database pool configured: max={}, min={}, acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s",
                config.max_connections,
                config.min_connections,
                config.acquire_timeout_seconds,
                config.idle_timeout_seconds,
                config.max_lifetime_seconds
            );
        } else {
            info!("Database pool configured successfully");
        }

        Ok(Self { pool })
    }

    async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}
