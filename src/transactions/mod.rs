//! Transaction requests handed to the custody collaborator for signing.
//!
//! Requests follow the wallet-adapter shape: one transition naming a program
//! function and its ordered, type-tagged textual inputs, plus the fee.

use serde::{Deserialize, Serialize};

pub mod bridge;
pub mod builder;

pub use bridge::{BridgePayload, BridgeTransferParams};
pub use builder::TransactionBuilder;

pub const DCA_PROGRAM_ID: &str = "zk_dca_arcane_finance.aleo";
pub const DEFAULT_CHAIN_ID: &str = "testnetbeta";
/// Fee per request, in microcredits.
pub const DEFAULT_FEE: u64 = 1_000_000;

pub const FN_CREATE_POSITION: &str = "create_position";
pub const FN_EXECUTE_DCA: &str = "execute_dca";
pub const FN_CANCEL_POSITION: &str = "cancel_position";

/// A single program call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub program: String,
    pub function_name: String,
    pub inputs: Vec<String>,
}

/// Opaque, externally-submittable transaction descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub address: String,
    pub chain_id: String,
    pub transitions: Vec<Transition>,
    pub fee: u64,
    pub fee_private: bool,
}

impl TransactionRequest {
    /// Function name of the first transition.
    pub fn function_name(&self) -> Option<&str> {
        self.transitions.first().map(|t| t.function_name.as_str())
    }

    /// Inputs of the first transition.
    pub fn inputs(&self) -> &[String] {
        self.transitions
            .first()
            .map(|t| t.inputs.as_slice())
            .unwrap_or(&[])
    }
}

/// `u64`-tagged literal for amounts and token ids.
pub fn typed_u64(value: u64) -> String {
    format!("{}u64", value)
}

/// `u32`-tagged literal for block heights, intervals and counters.
pub fn typed_u32(value: u32) -> String {
    format!("{}u32", value)
}
