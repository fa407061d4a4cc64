//! Ties the position book, request builder, worker and journal together.
//!
//! Lifecycle checks always run before a request is built, and a request is
//! only handed to custody after the position has been reserved, so a second
//! submission for the same position is refused while one is in flight.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::{ActivityKind, NewActivity, Repository};
use crate::domain::{Address, BlockHeight, CreatePositionParams, Operation, Outcome, Position};
use crate::engine::{reconcile, PositionBook, ReconcileReport};
use crate::error::DcaError;
use crate::transactions::{TransactionBuilder, TransactionRequest};
use crate::worker::WorkerHandle;

/// A request accepted by custody, with the position it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub position: Position,
    pub transaction_id: String,
    pub request: TransactionRequest,
}

pub struct PositionManager {
    book: Mutex<PositionBook>,
    builder: TransactionBuilder,
    worker: WorkerHandle,
    height: watch::Receiver<Option<BlockHeight>>,
    repo: Arc<Repository>,
}

impl PositionManager {
    pub fn new(
        builder: TransactionBuilder,
        worker: WorkerHandle,
        height: watch::Receiver<Option<BlockHeight>>,
        repo: Arc<Repository>,
    ) -> Self {
        Self {
            book: Mutex::new(PositionBook::new()),
            builder,
            worker,
            height,
            repo,
        }
    }

    /// Latest polled height, or a fresh ledger query before the first poll lands.
    pub async fn current_height(&self) -> Result<BlockHeight, DcaError> {
        let polled = *self.height.borrow();
        match polled {
            Some(height) => Ok(height),
            None => Ok(self.worker.block_height().await?),
        }
    }

    pub async fn create(
        &self,
        owner: Address,
        params: CreatePositionParams,
    ) -> Result<Submission, DcaError> {
        params.validate()?;
        let height = self.current_height().await?;
        let request = self.builder.create_position(&owner, &params, height)?;

        let transaction_id = match self.worker.submit(request.clone()).await {
            Ok(tx_id) => tx_id,
            Err(e) => {
                let err = DcaError::from(e);
                self.journal(NewActivity::new(
                    ActivityKind::Failed,
                    format!("Error creating position: {}", err),
                ))
                .await;
                return Err(err);
            }
        };

        let id = Uuid::new_v4().simple().to_string();
        let position =
            Position::new_pending(id, owner, &params, height, transaction_id.clone())?;
        self.book.lock().await.insert(position.clone())?;

        info!(id = %position.id, tx = %transaction_id, "create_position submitted");
        self.journal(
            NewActivity::new(
                ActivityKind::CreateSubmitted,
                format!(
                    "Created DCA position: {} x{} every {} blocks",
                    position.input_amount, position.executions_remaining, position.interval
                ),
            )
            .position(&position.id)
            .tx(Some(&transaction_id)),
        )
        .await;

        Ok(Submission {
            position,
            transaction_id,
            request,
        })
    }

    pub async fn confirm_create(
        &self,
        id: &str,
        record: Option<String>,
    ) -> Result<Position, DcaError> {
        let position = self.book.lock().await.confirm_create(id, record)?;
        self.journal(
            NewActivity::new(ActivityKind::CreateConfirmed, "Position creation confirmed")
                .position(id),
        )
        .await;
        Ok(position)
    }

    pub async fn reject_create(&self, id: &str) -> Result<Position, DcaError> {
        let position = self.book.lock().await.reject_create(id)?;
        self.journal(
            NewActivity::new(ActivityKind::CreateRejected, "Position creation rejected")
                .position(id)
                .tx(position.pending_tx_id()),
        )
        .await;
        Ok(position)
    }

    /// Submit one execution. `current_height` defaults to the latest known height.
    pub async fn execute(
        &self,
        id: &str,
        token_record: &str,
        current_height: Option<BlockHeight>,
    ) -> Result<Submission, DcaError> {
        let height = match current_height {
            Some(height) => height,
            None => self.current_height().await?,
        };

        let request = {
            let mut book = self.book.lock().await;
            let position = book
                .get(id)
                .ok_or_else(|| DcaError::NotFound(id.to_string()))?;
            position.ensure_executable(height)?;
            let record = position.record.clone().unwrap_or_default();
            let request =
                self.builder
                    .execute_position(&position.owner, &record, token_record, height)?;
            book.reserve(id, Operation::Execute)?;
            request
        };

        self.submit_reserved(id, Operation::Execute, request).await
    }

    pub async fn settle_execute(&self, id: &str, outcome: Outcome) -> Result<Position, DcaError> {
        self.settle(id, Operation::Execute, outcome).await
    }

    pub async fn cancel(&self, id: &str) -> Result<Submission, DcaError> {
        let request = {
            let mut book = self.book.lock().await;
            let position = book
                .get(id)
                .ok_or_else(|| DcaError::NotFound(id.to_string()))?;
            position.ensure_cancellable()?;
            let record = position.record.clone().unwrap_or_default();
            let request = self.builder.cancel_position(&position.owner, &record)?;
            book.reserve(id, Operation::Cancel)?;
            request
        };

        self.submit_reserved(id, Operation::Cancel, request).await
    }

    pub async fn settle_cancel(&self, id: &str, outcome: Outcome) -> Result<Position, DcaError> {
        self.settle(id, Operation::Cancel, outcome).await
    }

    /// Rebuild the confirmed set from the records custody holds for `owner`.
    pub async fn reconcile(&self, owner: &Address) -> Result<ReconcileReport, DcaError> {
        let records = self.worker.records(self.builder.program_id()).await?;
        let report = reconcile(owner, &records);
        self.book
            .lock()
            .await
            .replace_reconciled(owner, report.positions.clone());

        if !report.issues.is_empty() {
            warn!(issues = report.issues.len(), "records with unreadable fields");
        }
        self.journal(NewActivity::new(
            ActivityKind::Reconciled,
            format!(
                "Reconciled {} positions from {} records ({} with unreadable fields)",
                report.positions.len(),
                records.len(),
                report.issues.len()
            ),
        ))
        .await;
        Ok(report)
    }

    /// The active set.
    pub async fn positions(&self) -> Vec<Position> {
        self.book.lock().await.active().into_iter().cloned().collect()
    }

    pub async fn all_positions(&self) -> Vec<Position> {
        self.book.lock().await.all().to_vec()
    }

    pub async fn position(&self, id: &str) -> Result<Position, DcaError> {
        self.book
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DcaError::NotFound(id.to_string()))
    }

    async fn submit_reserved(
        &self,
        id: &str,
        operation: Operation,
        request: TransactionRequest,
    ) -> Result<Submission, DcaError> {
        let transaction_id = match self.worker.submit(request.clone()).await {
            Ok(tx_id) => tx_id,
            Err(e) => {
                self.book.lock().await.release(id);
                let err = DcaError::from(e);
                self.journal(
                    NewActivity::new(
                        ActivityKind::Failed,
                        format!("Error submitting {}: {}", operation, err),
                    )
                    .position(id),
                )
                .await;
                return Err(err);
            }
        };

        let position = {
            let mut book = self.book.lock().await;
            book.attach_tx(id, transaction_id.clone())?;
            book.get(id)
                .cloned()
                .ok_or_else(|| DcaError::NotFound(id.to_string()))?
        };

        info!(id, %operation, tx = %transaction_id, "request submitted");
        let kind = match operation {
            Operation::Cancel => ActivityKind::CancelSubmitted,
            _ => ActivityKind::ExecuteSubmitted,
        };
        self.journal(
            NewActivity::new(kind, format!("Submitted {} for position {}", operation, id))
                .position(id)
                .tx(Some(&transaction_id)),
        )
        .await;

        Ok(Submission {
            position,
            transaction_id,
            request,
        })
    }

    async fn settle(
        &self,
        id: &str,
        operation: Operation,
        outcome: Outcome,
    ) -> Result<Position, DcaError> {
        let (position, tx_id) = {
            let mut book = self.book.lock().await;
            let tx_id = book
                .get(id)
                .and_then(|p| p.pending_tx_id())
                .map(str::to_string);
            (book.settle(id, operation, &outcome)?, tx_id)
        };

        let message = match &outcome {
            Outcome::Confirmed { .. } => format!(
                "{} confirmed; position is {} with {} executions remaining",
                operation, position.state, position.executions_remaining
            ),
            Outcome::Failed { reason } => format!("{} failed: {}", operation, reason),
        };
        let kind = match operation {
            Operation::Cancel => ActivityKind::CancelSettled,
            _ => ActivityKind::ExecuteSettled,
        };
        self.journal(
            NewActivity::new(kind, message)
                .position(id)
                .tx(tx_id.as_deref()),
        )
        .await;
        Ok(position)
    }

    /// Journal writes never fail the operation they describe.
    async fn journal(&self, entry: NewActivity) {
        if let Err(e) = self.repo.insert_activity(&entry).await {
            error!(kind = %entry.kind, "Failed to write activity: {}", e);
        }
    }
}
