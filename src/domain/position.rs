//! DCA position: a recurring scheduled swap and its lifecycle markers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::primitives::{Address, BlockHeight};
use crate::error::DcaError;

/// Parameters chosen when opening a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionParams {
    pub input_token_id: u64,
    pub input_amount: u64,
    pub output_token_id: u64,
    /// Blocks between permitted executions.
    pub interval: u32,
    pub executions_remaining: u32,
    /// Slippage floor per execution.
    pub min_output_amount: u64,
}

impl CreatePositionParams {
    /// Every numeric parameter must be strictly positive.
    pub fn validate(&self) -> Result<(), DcaError> {
        let checks: [(&str, u64); 6] = [
            ("inputTokenId", self.input_token_id),
            ("inputAmount", self.input_amount),
            ("outputTokenId", self.output_token_id),
            ("interval", u64::from(self.interval)),
            ("executionsRemaining", u64::from(self.executions_remaining)),
            ("minOutputAmount", self.min_output_amount),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(DcaError::InvalidArgument(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionState {
    Active,
    /// All executions consumed. Terminal.
    Exhausted,
    /// Cancelled by its owner. Terminal.
    Cancelled,
    /// Rebuilt from a record that could not be classified.
    Unknown,
}

impl PositionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PositionState::Exhausted | PositionState::Cancelled)
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionState::Active => write!(f, "active"),
            PositionState::Exhausted => write!(f, "exhausted"),
            PositionState::Cancelled => write!(f, "cancelled"),
            PositionState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Whether the ledger has accepted the create transaction yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confirmation {
    /// Local projection only; the ledger record does not exist yet.
    Pending,
    Confirmed,
}

/// Program operation on a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Execute,
    Cancel,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Execute => write!(f, "execute"),
            Operation::Cancel => write!(f, "cancel"),
        }
    }
}

/// An operation submitted to custody and not yet settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InFlight {
    pub operation: Operation,
    /// Set once custody has accepted the request.
    pub tx_id: Option<String>,
}

/// Result of a submitted execute or cancel as observed on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    /// Accepted on-chain. Carries the replacement record, if custody returned one.
    Confirmed {
        #[serde(default)]
        record: Option<String>,
    },
    Failed {
        #[serde(default)]
        reason: String,
    },
}

/// A scheduled recurring swap tracked by the manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Local identifier; not stable across reconciliations.
    pub id: String,
    pub owner: Address,
    pub input_token_id: u64,
    pub output_token_id: u64,
    pub input_amount: u64,
    pub interval: u32,
    pub executions_remaining: u32,
    pub min_output_amount: u64,
    pub next_execution_height: BlockHeight,
    /// Reference copy of the custody-held record.
    pub record: Option<String>,
    pub state: PositionState,
    pub confirmation: Confirmation,
    pub in_flight: Option<InFlight>,
}

impl Position {
    /// Local projection of a position whose create request was just submitted.
    pub fn new_pending(
        id: String,
        owner: Address,
        params: &CreatePositionParams,
        current_height: BlockHeight,
        tx_id: String,
    ) -> Result<Self, DcaError> {
        params.validate()?;
        let next_execution_height = current_height.advance(params.interval).ok_or_else(|| {
            DcaError::InvalidArgument(format!(
                "interval {} from height {} overflows the block height",
                params.interval, current_height
            ))
        })?;
        Ok(Position {
            id,
            owner,
            input_token_id: params.input_token_id,
            output_token_id: params.output_token_id,
            input_amount: params.input_amount,
            interval: params.interval,
            executions_remaining: params.executions_remaining,
            min_output_amount: params.min_output_amount,
            next_execution_height,
            record: None,
            state: PositionState::Active,
            confirmation: Confirmation::Pending,
            in_flight: Some(InFlight {
                operation: Operation::Create,
                tx_id: Some(tx_id),
            }),
        })
    }

    pub fn is_active(&self) -> bool {
        self.state == PositionState::Active
    }

    pub fn is_pending(&self) -> bool {
        self.confirmation == Confirmation::Pending
    }

    /// Transaction id of the operation awaiting settlement, if any.
    pub fn pending_tx_id(&self) -> Option<&str> {
        self.in_flight.as_ref().and_then(|f| f.tx_id.as_deref())
    }
}
