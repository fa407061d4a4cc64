use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::datasource::ans::DEFAULT_ANS_URL;
use crate::datasource::bridge::DEFAULT_BRIDGE_URL;
use crate::datasource::ledger::{DEFAULT_NETWORK, DEFAULT_LEDGER_URL};
use crate::transactions::{DCA_PROGRAM_ID, DEFAULT_CHAIN_ID, DEFAULT_FEE};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub ledger_api_url: String,
    pub ledger_network: String,
    pub ans_api_url: String,
    pub bridge_api_url: String,
    /// Signer relay. `None` runs with custody disconnected.
    pub custody_url: Option<String>,
    pub program_id: String,
    pub chain_id: String,
    pub fee_microcredits: u64,
    pub fee_private: bool,
    pub block_poll_interval: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let custody_url = env_map
            .get("CUSTODY_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let fee_microcredits = match env_map.get("FEE_MICROCREDITS") {
            Some(s) => s.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "FEE_MICROCREDITS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?,
            None => DEFAULT_FEE,
        };

        let fee_private = match env_map
            .get("FEE_PRIVATE")
            .map(|s| s.as_str())
            .unwrap_or("false")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "FEE_PRIVATE".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let poll_ms = env_map
            .get("BLOCK_POLL_INTERVAL_MS")
            .map(|s| s.as_str())
            .unwrap_or("30000")
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "BLOCK_POLL_INTERVAL_MS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            ledger_api_url: string_or(&env_map, "LEDGER_API_URL", DEFAULT_LEDGER_URL),
            ledger_network: string_or(&env_map, "LEDGER_NETWORK", DEFAULT_NETWORK),
            ans_api_url: string_or(&env_map, "ANS_API_URL", DEFAULT_ANS_URL),
            bridge_api_url: string_or(&env_map, "BRIDGE_API_URL", DEFAULT_BRIDGE_URL),
            custody_url,
            program_id: string_or(&env_map, "PROGRAM_ID", DCA_PROGRAM_ID),
            chain_id: string_or(&env_map, "CHAIN_ID", DEFAULT_CHAIN_ID),
            fee_microcredits,
            fee_private,
            block_poll_interval: Duration::from_millis(poll_ms),
        })
    }
}

fn string_or(env_map: &HashMap<String, String>, key: &str, default: &str) -> String {
    env_map
        .get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}
