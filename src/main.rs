use crate::config::database::{self, DatabaseTrait};
use crate::config::parameter::Parameters;
use crate::config::settings::{AppConfig, StorageBackend};
use crate::repository::Stores;
use crate::service::clock::SystemClock;
use std::sync::Arc;
use tracing::{error, info, warn};

mod config;
mod dto;
mod entity;
mod error;
mod handler;
mod middleware;
mod repository;
mod response;
mod routes;
mod service;
mod state;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration first: the log level and environment come from it
    let parameters = Parameters::from_env();
    let config = AppConfig::from_parameters(&parameters)?;

    config::logging::init(config.environment, config.log_level);
    info!("Starting address book API...");
    match parameters.env_file() {
        Some(path) => info!("Loaded environment file: {:?}", path),
        None => warn!("No .env file found, using system environment variables"),
    }
    if config.jwt.uses_default_secret() {
        warn!("SECURITY: JWT_SECRET not set, using the built-in development secret");
    }
    info!("Configuration initialized with {} parameters", parameters.len());

    let stores = match config.storage {
        StorageBackend::Postgres => {
            let connection = match database::Database::init(&config.database, config.environment).await {
                Ok(conn) => {
                    info!("Database connection established successfully");
                    conn
                }
                Err(e) => {
                    error!("Failed to initialize database: {}", e);
                    return Err(e.into());
                }
            };

            if let Err(e) = connection.migrate().await {
                error!("Failed to run database migrations: {}", e);
                return Err(e.into());
            }

            Stores::postgres(Arc::new(connection))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data will not survive a restart");
            Stores::in_memory()
        }
    };

    let host = config.server.bind_address();
    info!("Server will bind to: {}", host);

    let app = routes::root::routes(&config, stores, Arc::new(SystemClock));

    let listener = match tokio::net::TcpListener::bind(&host).await {
        Ok(listener) => {
            info!("Server successfully bound to {}", host);
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", host, e);
            return Err(e.into());
        }
    };

    info!("Server starting...");
    match axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        Ok(_) => {
            info!("Server shutdown gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Server error: {}", e);
            Err(e.into())
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, initiating graceful shutdown..."),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
