//! In-memory collaborators for testing without network calls.

use super::{
    BridgeApi, CustodySigner, DataSourceError, LedgerClient, NameBalance, NameService, PacketPage,
    PacketQuery,
};
use crate::domain::{BlockHeight, WalletRecord};
use crate::transactions::TransactionRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Ledger whose height is set by the test.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    height: Arc<AtomicU32>,
    failing: Arc<AtomicBool>,
}

impl MockLedger {
    pub fn new(height: u32) -> Self {
        let ledger = Self::default();
        ledger.set_height(height);
        ledger
    }

    pub fn set_height(&self, height: u32) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Make every query fail with a network error until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn latest_height(&self) -> Result<BlockHeight, DataSourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataSourceError::NetworkError("mock ledger offline".to_string()));
        }
        Ok(BlockHeight::new(self.height.load(Ordering::SeqCst)))
    }
}

/// Custody that records submitted requests and hands back sequential ids.
#[derive(Debug, Clone)]
pub struct MockCustody {
    connected: Arc<AtomicBool>,
    records: Arc<Mutex<Vec<WalletRecord>>>,
    submitted: Arc<Mutex<Vec<TransactionRequest>>>,
    next_tx: Arc<AtomicU64>,
}

impl MockCustody {
    pub fn new() -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(true)),
            records: Arc::new(Mutex::new(Vec::new())),
            submitted: Arc::new(Mutex::new(Vec::new())),
            next_tx: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn disconnected() -> Self {
        let custody = Self::new();
        custody.set_connected(false);
        custody
    }

    pub fn with_record(self, record: WalletRecord) -> Self {
        self.push_record(record);
        self
    }

    pub fn with_records(self, records: Vec<WalletRecord>) -> Self {
        for record in records {
            self.push_record(record);
        }
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn push_record(&self, record: WalletRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    /// Requests accepted so far, in submission order.
    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.submitted
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn ensure_connected(&self) -> Result<(), DataSourceError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DataSourceError::NotConnected)
        }
    }
}

impl Default for MockCustody {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CustodySigner for MockCustody {
    async fn request_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<String, DataSourceError> {
        self.ensure_connected()?;
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        self.submitted
            .lock()
            .map_err(|e| DataSourceError::Other(e.to_string()))?
            .push(request.clone());
        Ok(format!("at1mock{:04}", n))
    }

    async fn request_records(&self, _program: &str) -> Result<Vec<WalletRecord>, DataSourceError> {
        self.ensure_connected()?;
        self.records
            .lock()
            .map(|r| r.clone())
            .map_err(|e| DataSourceError::Other(e.to_string()))
    }
}

/// Name service backed by fixed maps.
#[derive(Debug, Clone, Default)]
pub struct MockNameService {
    primary_names: HashMap<String, String>,
    addresses: HashMap<String, String>,
    hashes: HashMap<String, NameBalance>,
    resolvers: HashMap<(String, String), String>,
}

impl MockNameService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as the primary name of `address`, in both directions.
    pub fn with_primary_name(mut self, address: &str, name: &str) -> Self {
        self.primary_names
            .insert(address.to_string(), name.to_string());
        self.addresses.insert(name.to_string(), address.to_string());
        self
    }

    pub fn with_name_hash(mut self, hash: &str, name: &str) -> Self {
        self.hashes.insert(
            hash.to_string(),
            NameBalance {
                name: name.to_string(),
                balance: serde_json::Value::Null,
            },
        );
        self
    }

    pub fn with_resolver(mut self, name: &str, category: &str, content: &str) -> Self {
        self.resolvers.insert(
            (name.to_string(), category.to_string()),
            content.to_string(),
        );
        self
    }
}

#[async_trait]
impl NameService for MockNameService {
    async fn primary_name(&self, address: &str) -> Result<Option<String>, DataSourceError> {
        Ok(self.primary_names.get(address).cloned())
    }

    async fn address_of(&self, name: &str) -> Result<Option<String>, DataSourceError> {
        Ok(self.addresses.get(name).cloned())
    }

    async fn name_from_hash(
        &self,
        name_hash: &str,
    ) -> Result<Option<NameBalance>, DataSourceError> {
        Ok(self.hashes.get(name_hash).cloned())
    }

    async fn resolver_content(
        &self,
        name: &str,
        category: &str,
    ) -> Result<Option<String>, DataSourceError> {
        Ok(self
            .resolvers
            .get(&(name.to_string(), category.to_string()))
            .cloned())
    }
}

/// Bridge API returning canned pages keyed by wallet or chain.
#[derive(Debug, Clone, Default)]
pub struct MockBridge {
    pages: HashMap<String, PacketPage>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wallet_page(mut self, wallet: &str, page: PacketPage) -> Self {
        self.pages.insert(format!("wallet:{}", wallet), page);
        self
    }

    pub fn with_chain_page(mut self, chain_id: &str, page: PacketPage) -> Self {
        self.pages.insert(format!("chain:{}", chain_id), page);
        self
    }

    fn page(&self, key: String, query: &PacketQuery) -> PacketPage {
        self.pages
            .get(&key)
            .cloned()
            .unwrap_or_else(|| PacketPage::empty(query.page))
    }
}

#[async_trait]
impl BridgeApi for MockBridge {
    async fn packets_by_wallet(
        &self,
        wallet: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError> {
        Ok(self.page(format!("wallet:{}", wallet), query))
    }

    async fn packets_by_wallet_and_chain(
        &self,
        wallet: &str,
        chain_id: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError> {
        let mut page = self.page(format!("wallet:{}", wallet), query);
        page.data.retain(|p| p.source_chain == chain_id || p.destination_chain == chain_id);
        page.total_items = page.data.len() as u64;
        Ok(page)
    }

    async fn packets_by_chain(
        &self,
        chain_id: &str,
        query: &PacketQuery,
    ) -> Result<PacketPage, DataSourceError> {
        Ok(self.page(format!("chain:{}", chain_id), query))
    }
}
