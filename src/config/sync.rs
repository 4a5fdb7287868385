use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Offline queue and replay settings
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Location of the durable offline queue file
    pub queue_path: PathBuf,
    /// Failed attempts tolerated before an action is abandoned
    pub max_retries: u32,
    /// Backoff before retry n is `base * 2^(n-1)`, capped below
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self> {
        Ok(SyncConfig {
            queue_path: env::var("OFFLINE_QUEUE_PATH")
                .unwrap_or_else(|_| "offline_queue.json".to_string())
                .into(),
            max_retries: env::var("OFFLINE_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| AppError::Configuration("Invalid OFFLINE_MAX_RETRIES".to_string()))?,
            retry_base_delay_ms: env::var("OFFLINE_RETRY_BASE_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| {
                    AppError::Configuration("Invalid OFFLINE_RETRY_BASE_DELAY_MS".to_string())
                })?,
            retry_max_delay_ms: env::var("OFFLINE_RETRY_MAX_DELAY_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| {
                    AppError::Configuration("Invalid OFFLINE_RETRY_MAX_DELAY_MS".to_string())
                })?,
        })
    }
}
