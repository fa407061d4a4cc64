//! Block explorer client for ledger queries.

use super::{DataSourceError, LedgerClient};
use crate::domain::BlockHeight;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_LEDGER_URL: &str = "https://api.explorer.provable.com/v1";
pub const DEFAULT_NETWORK: &str = "testnet";

/// Ledger collaborator backed by the public explorer REST API.
#[derive(Debug, Clone)]
pub struct ExplorerLedgerClient {
    client: Client,
    base_url: String,
    network: String,
    max_elapsed: Duration,
}

impl ExplorerLedgerClient {
    pub fn new(base_url: String, network: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            network,
            max_elapsed: Duration::from_secs(30),
        }
    }

    /// Bound the total time spent retrying transient failures.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, DataSourceError> {
        let url = format!("{}/{}/{}", self.base_url, self.network, path);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self.client.get(&url).send().await.map_err(|e| {
                backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
            })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl LedgerClient for ExplorerLedgerClient {
    async fn latest_height(&self) -> Result<BlockHeight, DataSourceError> {
        let body = self.get_json("latest/height").await?;
        let height = parse_height(&body)?;
        debug!("Latest block height: {}", height);
        Ok(height)
    }
}

// The explorer answers with a bare number; some deployments quote it.
fn parse_height(body: &serde_json::Value) -> Result<BlockHeight, DataSourceError> {
    let raw = match body {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    raw.and_then(|h| u32::try_from(h).ok())
        .map(BlockHeight::new)
        .ok_or_else(|| DataSourceError::ParseError(format!("Invalid block height: {}", body)))
}
