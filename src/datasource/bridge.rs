//! Bridge packet history client and its best-effort wrapper.

use super::http::get_optional_json;
use super::{BridgeApi, DataSourceError};
use crate::domain::registry::{BRIDGE_CHAINS, BRIDGE_TOKENS};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_BRIDGE_URL: &str =
    "https://aleobridge-be-development.b08qlu4v33brq.us-east-1.cs.amazonlightsail.com/v1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl fmt::Display for PacketFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketFilter::All => write!(f, "all"),
            PacketFilter::Completed => write!(f, "completed"),
            PacketFilter::Pending => write!(f, "pending"),
        }
    }
}

impl FromStr for PacketFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(PacketFilter::All),
            "completed" => Ok(PacketFilter::Completed),
            "pending" => Ok(PacketFilter::Pending),
            other => Err(format!("must be all, completed, or pending, got {}", other)),
        }
    }
}

/// Paging and filter parameters for packet listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketQuery {
    pub filter: PacketFilter,
    pub page: u32,
    pub limit: u32,
    /// Only sent when greater than zero.
    pub min_signature_count: u32,
}

impl Default for PacketQuery {
    fn default() -> Self {
        Self {
            filter: PacketFilter::All,
            page: 1,
            limit: 10,
            min_signature_count: 0,
        }
    }
}

impl PacketQuery {
    fn params(&self, with_signatures: bool) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("filter", self.filter.to_string()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if with_signatures && self.min_signature_count > 0 {
            params.push(("min_signature_count", self.min_signature_count.to_string()));
        }
        params
    }
}

/// One bridge packet. Fields the API adds beyond these are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketData {
    #[serde(default)]
    pub packet_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub destination_address: String,
    #[serde(default)]
    pub source_address: String,
    #[serde(default)]
    pub destination_chain: String,
    #[serde(default)]
    pub source_chain: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signatures: Option<u32>,
    /// Epoch seconds, or the string `pending`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketPage {
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub data: Vec<PacketData>,
}

impl PacketPage {
    pub fn empty(page: u32) -> Self {
        Self {
            total_items: 0,
            total_pages: 0,
            current_page: u64::from(page),
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: PacketPage,
}

/// Static bridge status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatus {
    pub is_operational: bool,
    pub transfer_limit: String,
    pub supported_tokens: Vec<String>,
    pub supported_chains: Vec<String>,
}

/// HTTP client for the bridge packet API.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    client: Client,
    base_url: String,
}

impl BridgeClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_page(
        &self,
        url: &str,
        params: &[(&str, String)],
        page: u32,
    ) -> Result<PacketPage, DataSourceError> {
        let body: Option<Envelope> = get_optional_json(&self.client, url, params).await?;
        Ok(body.map(|e| e.data).unwrap_or_else(|| PacketPage::empty(page)))
    }
}

#[async_trait]
impl BridgeApi for BridgeClient {
    async fn packets_by_wallet(
        &self,
        wallet: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError> {
        let url = format!("{}/packet/wallet/{}", self.base_url, wallet);
        self.fetch_page(&url, &query.params(false), query.page).await
    }

    async fn packets_by_wallet_and_chain(
        &self,
        wallet: &str,
        chain_id: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError> {
        let url = format!("{}/packet/{}/{}", self.base_url, wallet, chain_id);
        self.fetch_page(&url, &query.params(false), query.page).await
    }

    async fn packets_by_chain(
        &self,
        chain_id: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError> {
        let url = format!("{}/packet/{}", self.base_url, chain_id);
        self.fetch_page(&url, &query.params(true), query.page).await
    }
}

/// Packet listings for display. Failures are logged and read as an empty page.
#[derive(Debug, Clone)]
pub struct BridgeService {
    inner: Arc<dyn BridgeApi>,
}

impl BridgeService {
    pub fn new(inner: Arc<dyn BridgeApi>) -> Self {
        Self { inner }
    }

    /// Pick the listing that matches which of `wallet` / `chain_id` are given.
    pub async fn packets(
        &self,
        wallet: Option<&str>,
        chain_id: Option<&str>,
        query: &PacketQuery,
    ) -> PacketPage {
        let result = match (wallet, chain_id) {
            (Some(w), Some(c)) => self.inner.packets_by_wallet_and_chain(w, c, query).await,
            (Some(w), None) => self.inner.packets_by_wallet(w, query).await,
            (None, Some(c)) => self.inner.packets_by_chain(c, query).await,
            (None, None) => return PacketPage::empty(query.page),
        };
        result.unwrap_or_else(|e| {
            warn!("Error fetching bridge packets: {}", e);
            PacketPage::empty(query.page)
        })
    }

    pub fn status(&self) -> BridgeStatus {
        BridgeStatus {
            is_operational: true,
            transfer_limit: "100000".to_string(),
            supported_tokens: BRIDGE_TOKENS.iter().map(|(t, _)| t.to_string()).collect(),
            supported_chains: BRIDGE_CHAINS.iter().map(|c| c.chain_id.to_string()).collect(),
        }
    }
}
