use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod sync;

pub use database::DatabaseConfig;
pub use sync::SyncConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            sync: SyncConfig::from_env()?,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(AppError::Configuration(
                "Database max connections must be greater than 0".to_string(),
            ));
        }

        if self.sync.retry_base_delay_ms == 0 {
            return Err(AppError::Configuration(
                "Retry base delay must be greater than 0".to_string(),
            ));
        }

        if self.sync.retry_max_delay_ms < self.sync.retry_base_delay_ms {
            return Err(AppError::Configuration(
                "Retry max delay must not be below the base delay".to_string(),
            ));
        }

        if self.sync.queue_path.as_os_str().is_empty() {
            return Err(AppError::Configuration(
                "Offline queue path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
