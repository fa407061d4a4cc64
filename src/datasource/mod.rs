//! External collaborators: ledger, custody, name service and bridge.

use crate::domain::{BlockHeight, WalletRecord};
use crate::transactions::TransactionRequest;
use async_trait::async_trait;
use std::fmt;

pub mod ans;
pub mod bridge;
pub mod custody;
mod http;
pub mod ledger;
pub mod mock;

pub use ans::{AnsClient, AnsService, NameBalance};
pub use bridge::{
    BridgeClient, BridgeService, BridgeStatus, PacketData, PacketFilter, PacketPage, PacketQuery,
};
pub use custody::{DisconnectedCustody, RelayCustody};
pub use ledger::ExplorerLedgerClient;
pub use mock::{MockBridge, MockCustody, MockLedger, MockNameService};

/// Ledger network queries.
#[async_trait]
pub trait LedgerClient: Send + Sync + fmt::Debug {
    /// Latest block height known to the network.
    async fn latest_height(&self) -> Result<BlockHeight, DataSourceError>;
}

/// The component holding keys: signs and broadcasts requests, and exposes
/// the records it holds.
#[async_trait]
pub trait CustodySigner: Send + Sync + fmt::Debug {
    /// Sign and broadcast `request`, returning the transaction id.
    async fn request_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<String, DataSourceError>;

    /// Records of `program` held by the connected account.
    async fn request_records(&self, program: &str) -> Result<Vec<WalletRecord>, DataSourceError>;
}

/// Name-service lookups. `Ok(None)` means "not registered".
#[async_trait]
pub trait NameService: Send + Sync + fmt::Debug {
    async fn primary_name(&self, address: &str) -> Result<Option<String>, DataSourceError>;

    async fn address_of(&self, name: &str) -> Result<Option<String>, DataSourceError>;

    async fn name_from_hash(&self, name_hash: &str)
        -> Result<Option<NameBalance>, DataSourceError>;

    async fn resolver_content(
        &self,
        name: &str,
        category: &str,
    ) -> Result<Option<String>, DataSourceError>;
}

/// Bridge packet history. A 404 is an empty page, not an error.
#[async_trait]
pub trait BridgeApi: Send + Sync + fmt::Debug {
    async fn packets_by_wallet(
        &self,
        wallet: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError>;

    async fn packets_by_wallet_and_chain(
        &self,
        wallet: &str,
        chain_id: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError>;

    async fn packets_by_chain(
        &self,
        chain_id: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError>;
}

/// Error type for collaborator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// No custody collaborator is attached
    NotConnected,
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::NotConnected => write!(f, "Not connected"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
