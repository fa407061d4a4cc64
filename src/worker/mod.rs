//! Background worker: owns the ledger and custody collaborators and answers
//! correlated requests one at a time.
//!
//! ```text
//! WorkerHandle ──mpsc(Envelope)──▶ worker task ──▶ LedgerClient / CustodySigner
//!      ▲                                │
//!      └──────────oneshot(WorkerReply)──┘
//! ```

mod poller;

pub use poller::BlockHeightPoller;

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::datasource::{CustodySigner, DataSourceError, LedgerClient};
use crate::domain::{BlockHeight, WalletRecord};
use crate::transactions::TransactionRequest;

/// Envelopes buffered before callers start waiting on send.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerRequest {
    BlockHeight,
    Submit(TransactionRequest),
    Records { program: String },
}

impl WorkerRequest {
    fn kind(&self) -> &'static str {
        match self {
            WorkerRequest::BlockHeight => "block_height",
            WorkerRequest::Submit(_) => "submit",
            WorkerRequest::Records { .. } => "records",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerResponse {
    BlockHeight(BlockHeight),
    Submitted { tx_id: String },
    Records(Vec<WalletRecord>),
}

#[derive(Debug)]
pub struct WorkerReply {
    pub correlation_id: Uuid,
    pub result: Result<WorkerResponse, DataSourceError>,
}

#[derive(Debug)]
pub struct Envelope {
    pub correlation_id: Uuid,
    pub request: WorkerRequest,
    pub reply: oneshot::Sender<WorkerReply>,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker has stopped")]
    Stopped,
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error("unexpected reply to request {0}")]
    Unexpected(Uuid),
}

/// Cloneable sender side of the worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<Envelope>,
}

impl WorkerHandle {
    /// Start the worker task.
    pub fn spawn(
        ledger: Arc<dyn LedgerClient>,
        custody: Arc<dyn CustodySigner>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(run(rx, ledger, custody));
        (Self { tx }, task)
    }

    pub async fn block_height(&self) -> Result<BlockHeight, WorkerError> {
        let correlation_id = Uuid::new_v4();
        match self.call(correlation_id, WorkerRequest::BlockHeight).await? {
            WorkerResponse::BlockHeight(height) => Ok(height),
            _ => Err(WorkerError::Unexpected(correlation_id)),
        }
    }

    /// Hand `request` to custody for signing and broadcast; returns the tx id.
    pub async fn submit(&self, request: TransactionRequest) -> Result<String, WorkerError> {
        let correlation_id = Uuid::new_v4();
        match self.call(correlation_id, WorkerRequest::Submit(request)).await? {
            WorkerResponse::Submitted { tx_id } => Ok(tx_id),
            _ => Err(WorkerError::Unexpected(correlation_id)),
        }
    }

    pub async fn records(&self, program: &str) -> Result<Vec<WalletRecord>, WorkerError> {
        let correlation_id = Uuid::new_v4();
        let request = WorkerRequest::Records {
            program: program.to_string(),
        };
        match self.call(correlation_id, request).await? {
            WorkerResponse::Records(records) => Ok(records),
            _ => Err(WorkerError::Unexpected(correlation_id)),
        }
    }

    async fn call(
        &self,
        correlation_id: Uuid,
        request: WorkerRequest,
    ) -> Result<WorkerResponse, WorkerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                correlation_id,
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| WorkerError::Stopped)?;

        let reply = reply_rx.await.map_err(|_| WorkerError::Stopped)?;
        if reply.correlation_id != correlation_id {
            return Err(WorkerError::Unexpected(correlation_id));
        }
        Ok(reply.result?)
    }
}

async fn run(
    mut rx: mpsc::Receiver<Envelope>,
    ledger: Arc<dyn LedgerClient>,
    custody: Arc<dyn CustodySigner>,
) {
    info!("Worker started");
    while let Some(envelope) = rx.recv().await {
        let Envelope {
            correlation_id,
            request,
            reply,
        } = envelope;
        let kind = request.kind();
        debug!(%correlation_id, kind, "worker request");

        let result = handle(request, ledger.as_ref(), custody.as_ref()).await;
        if let Err(e) = &result {
            warn!(%correlation_id, kind, "worker request failed: {}", e);
        }

        if reply
            .send(WorkerReply {
                correlation_id,
                result,
            })
            .is_err()
        {
            debug!(%correlation_id, "caller went away before the reply");
        }
    }
    info!("Worker stopped");
}

async fn handle(
    request: WorkerRequest,
    ledger: &dyn LedgerClient,
    custody: &dyn CustodySigner,
) -> Result<WorkerResponse, DataSourceError> {
    match request {
        WorkerRequest::BlockHeight => ledger.latest_height().await.map(WorkerResponse::BlockHeight),
        WorkerRequest::Submit(tx) => custody
            .request_transaction(&tx)
            .await
            .map(|tx_id| WorkerResponse::Submitted { tx_id }),
        WorkerRequest::Records { program } => custody
            .request_records(&program)
            .await
            .map(WorkerResponse::Records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{MockCustody, MockLedger};
    use crate::domain::WalletRecord;
    use crate::transactions::{Transition, DEFAULT_CHAIN_ID, DEFAULT_FEE};

    fn request_from(address: &str) -> TransactionRequest {
        TransactionRequest {
            address: address.to_string(),
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            transitions: vec![Transition {
                program: "p.aleo".to_string(),
                function_name: "f".to_string(),
                inputs: vec![],
            }],
            fee: DEFAULT_FEE,
            fee_private: false,
        }
    }

    #[tokio::test]
    async fn test_block_height_round_trip() {
        let ledger = MockLedger::new(4242);
        let (handle, _task) = WorkerHandle::spawn(Arc::new(ledger), Arc::new(MockCustody::new()));
        assert_eq!(handle.block_height().await.unwrap(), BlockHeight::new(4242));
    }

    #[tokio::test]
    async fn test_records_are_forwarded() {
        let custody = MockCustody::new()
            .with_record(WalletRecord::new("DCAPosition", "{ interval: 5u32 }", false));
        let (handle, _task) = WorkerHandle::spawn(Arc::new(MockLedger::new(1)), Arc::new(custody));
        let records = handle.records("zk_dca_arcane_finance.aleo").await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_disconnected_custody_surfaces_not_connected() {
        let (handle, _task) = WorkerHandle::spawn(
            Arc::new(MockLedger::new(1)),
            Arc::new(MockCustody::disconnected()),
        );
        match handle.submit(request_from("aleo1a")).await {
            Err(WorkerError::DataSource(DataSourceError::NotConnected)) => {}
            other => panic!("Expected NotConnected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_submissions_reply_to_their_own_caller() {
        let custody = MockCustody::new();
        let (handle, _task) =
            WorkerHandle::spawn(Arc::new(MockLedger::new(1)), Arc::new(custody.clone()));

        let callers: Vec<_> = (0..8)
            .map(|i| {
                let handle = handle.clone();
                let address = format!("aleo1caller{}", i);
                tokio::spawn(async move {
                    let tx_id = handle.submit(request_from(&address)).await.unwrap();
                    (address, tx_id)
                })
            })
            .collect();

        let results = futures::future::join_all(callers).await;
        let submitted = custody.submitted();
        assert_eq!(submitted.len(), 8);

        for result in results {
            let (address, tx_id) = result.unwrap();
            // MockCustody numbers ids from 1 in submission order.
            let n: usize = tx_id.trim_start_matches("at1mock").parse().unwrap();
            assert_eq!(submitted[n - 1].address, address);
        }
    }

    #[tokio::test]
    async fn test_stopped_worker() {
        let (handle, task) =
            WorkerHandle::spawn(Arc::new(MockLedger::new(1)), Arc::new(MockCustody::new()));
        task.abort();
        let _ = task.await;
        match handle.block_height().await {
            Err(WorkerError::Stopped) => {}
            other => panic!("Expected Stopped, got {:?}", other),
        }
    }
}
