//! Pure construction of create / execute / cancel requests.

use tracing::debug;

use super::{
    typed_u32, typed_u64, TransactionRequest, Transition, DCA_PROGRAM_ID, DEFAULT_CHAIN_ID,
    DEFAULT_FEE, FN_CANCEL_POSITION, FN_CREATE_POSITION, FN_EXECUTE_DCA,
};
use crate::config::Config;
use crate::domain::{Address, BlockHeight, CreatePositionParams};
use crate::error::DcaError;

/// Builds transaction requests for the DCA program.
///
/// Performs no I/O; every precondition failure is an `InvalidArgument`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBuilder {
    program_id: String,
    chain_id: String,
    fee: u64,
    fee_private: bool,
}

impl TransactionBuilder {
    pub fn new(program_id: String, chain_id: String, fee: u64, fee_private: bool) -> Self {
        Self {
            program_id,
            chain_id,
            fee,
            fee_private,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.program_id.clone(),
            config.chain_id.clone(),
            config.fee_microcredits,
            config.fee_private,
        )
    }

    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    /// `create_position` with seven tagged inputs in program order.
    pub fn create_position(
        &self,
        owner: &Address,
        params: &CreatePositionParams,
        block_height: BlockHeight,
    ) -> Result<TransactionRequest, DcaError> {
        params.validate()?;

        let inputs = vec![
            typed_u64(params.input_token_id),
            typed_u64(params.input_amount),
            typed_u64(params.output_token_id),
            typed_u32(params.interval),
            typed_u32(params.executions_remaining),
            typed_u64(params.min_output_amount),
            typed_u32(block_height.as_u32()),
        ];

        debug!(owner = %owner, height = %block_height, "building create_position request");
        Ok(self.request(owner, FN_CREATE_POSITION, inputs))
    }

    /// `execute_dca` spending the position record and a token record.
    pub fn execute_position(
        &self,
        owner: &Address,
        position_record: &str,
        token_record: &str,
        block_height: BlockHeight,
    ) -> Result<TransactionRequest, DcaError> {
        require_record("position record", position_record)?;
        require_record("token record", token_record)?;

        let inputs = vec![
            position_record.to_string(),
            token_record.to_string(),
            typed_u32(block_height.as_u32()),
        ];

        debug!(owner = %owner, height = %block_height, "building execute_dca request");
        Ok(self.request(owner, FN_EXECUTE_DCA, inputs))
    }

    /// `cancel_position` with the position record as its only input.
    pub fn cancel_position(
        &self,
        owner: &Address,
        position_record: &str,
    ) -> Result<TransactionRequest, DcaError> {
        require_record("position record", position_record)?;

        debug!(owner = %owner, "building cancel_position request");
        Ok(self.request(
            owner,
            FN_CANCEL_POSITION,
            vec![position_record.to_string()],
        ))
    }

    fn request(&self, owner: &Address, function_name: &str, inputs: Vec<String>) -> TransactionRequest {
        TransactionRequest {
            address: owner.as_str().to_string(),
            chain_id: self.chain_id.clone(),
            transitions: vec![Transition {
                program: self.program_id.clone(),
                function_name: function_name.to_string(),
                inputs,
            }],
            fee: self.fee,
            fee_private: self.fee_private,
        }
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new(
            DCA_PROGRAM_ID.to_string(),
            DEFAULT_CHAIN_ID.to_string(),
            DEFAULT_FEE,
            false,
        )
    }
}

// Records come from custody; an empty one means the caller skipped that step.
fn require_record(what: &str, record: &str) -> Result<(), DcaError> {
    if record.trim().is_empty() {
        return Err(DcaError::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(())
}
