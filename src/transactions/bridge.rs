//! Bridge transfer payloads between the native chain and EVM chains.

use serde::{Deserialize, Serialize};

use crate::domain::registry::{self, ALEO_CHAIN_ID, ALEO_TOKEN_SERVICE};
use crate::domain::{validate_address, ChainKind};
use crate::error::DcaError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTransferParams {
    pub source_chain_id: String,
    pub destination_chain_id: String,
    /// ERC20 address, native token id, or `ETH` for the EVM native coin.
    pub token_address: String,
    /// Smallest-unit amount.
    pub amount: String,
    pub receiver: String,
}

/// Payload to hand to the wallet of the source chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BridgePayload {
    #[serde(rename_all = "camelCase")]
    Aleo {
        program: String,
        function: String,
        inputs: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Evm {
        to: String,
        value: String,
        data: String,
        method: String,
        chain_id: String,
    },
}

impl BridgeTransferParams {
    /// Build the source-chain payload for this transfer.
    pub fn payload(&self) -> Result<BridgePayload, DcaError> {
        let receiver_kind = if self.destination_chain_id == ALEO_CHAIN_ID {
            ChainKind::Native
        } else {
            ChainKind::Evm
        };
        if !validate_address(&self.receiver, receiver_kind) {
            return Err(DcaError::InvalidArgument(format!(
                "invalid {} receiver address",
                receiver_kind
            )));
        }

        if self.source_chain_id == ALEO_CHAIN_ID {
            return Ok(BridgePayload::Aleo {
                program: ALEO_TOKEN_SERVICE.to_string(),
                function: "transfer".to_string(),
                inputs: vec![
                    self.token_address.clone(),
                    self.amount.clone(),
                    self.receiver.clone(),
                    self.destination_chain_id.clone(),
                ],
            });
        }

        let target = registry::evm_token_service(&self.source_chain_id).ok_or_else(|| {
            DcaError::InvalidArgument(format!(
                "unsupported source chain: {}",
                self.source_chain_id
            ))
        })?;

        if self.token_address.eq_ignore_ascii_case("eth") {
            Ok(BridgePayload::Evm {
                to: target.to_string(),
                value: self.amount.clone(),
                data: format!("0x{}", hex::encode(self.receiver.as_bytes())),
                method: "transfer(string)".to_string(),
                chain_id: self.source_chain_id.clone(),
            })
        } else {
            let packed = format!("{}{}{}", self.token_address, self.amount, self.receiver);
            Ok(BridgePayload::Evm {
                to: target.to_string(),
                value: "0".to_string(),
                data: format!("0x{}", hex::encode(packed.as_bytes())),
                method: "transfer(address,uint256,string)".to_string(),
                chain_id: self.source_chain_id.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::{ETH_SEPOLIA_CHAIN_ID, EVM_TOKEN_SERVICE};

    fn aleo_receiver() -> String {
        format!("aleo1{}", "r".repeat(58))
    }

    fn evm_receiver() -> String {
        format!("0x{}", "b".repeat(40))
    }

    #[test]
    fn test_evm_native_coin_to_aleo() {
        let params = BridgeTransferParams {
            source_chain_id: ETH_SEPOLIA_CHAIN_ID.to_string(),
            destination_chain_id: ALEO_CHAIN_ID.to_string(),
            token_address: "ETH".to_string(),
            amount: "1000".to_string(),
            receiver: aleo_receiver(),
        };

        match params.payload().unwrap() {
            BridgePayload::Evm {
                to,
                value,
                data,
                method,
                chain_id,
            } => {
                assert_eq!(to, EVM_TOKEN_SERVICE);
                assert_eq!(value, "1000");
                assert_eq!(data, format!("0x{}", hex::encode(aleo_receiver())));
                assert_eq!(method, "transfer(string)");
                assert_eq!(chain_id, ETH_SEPOLIA_CHAIN_ID);
            }
            other => panic!("Expected EVM payload, got {:?}", other),
        }
    }

    #[test]
    fn test_erc20_carries_zero_value() {
        let params = BridgeTransferParams {
            source_chain_id: ETH_SEPOLIA_CHAIN_ID.to_string(),
            destination_chain_id: ALEO_CHAIN_ID.to_string(),
            token_address: "0xtoken".to_string(),
            amount: "5".to_string(),
            receiver: aleo_receiver(),
        };
        match params.payload().unwrap() {
            BridgePayload::Evm { value, method, .. } => {
                assert_eq!(value, "0");
                assert_eq!(method, "transfer(address,uint256,string)");
            }
            other => panic!("Expected EVM payload, got {:?}", other),
        }
    }

    #[test]
    fn test_aleo_to_evm_uses_token_service_program() {
        let params = BridgeTransferParams {
            source_chain_id: ALEO_CHAIN_ID.to_string(),
            destination_chain_id: ETH_SEPOLIA_CHAIN_ID.to_string(),
            token_address: "vUSDC".to_string(),
            amount: "42".to_string(),
            receiver: evm_receiver(),
        };
        match params.payload().unwrap() {
            BridgePayload::Aleo {
                program,
                function,
                inputs,
            } => {
                assert_eq!(program, ALEO_TOKEN_SERVICE);
                assert_eq!(function, "transfer");
                assert_eq!(inputs.len(), 4);
                assert_eq!(inputs[3], ETH_SEPOLIA_CHAIN_ID);
            }
            other => panic!("Expected Aleo payload, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_receiver_of_wrong_kind() {
        let params = BridgeTransferParams {
            source_chain_id: ETH_SEPOLIA_CHAIN_ID.to_string(),
            destination_chain_id: ALEO_CHAIN_ID.to_string(),
            token_address: "ETH".to_string(),
            amount: "1".to_string(),
            receiver: evm_receiver(),
        };
        assert!(matches!(params.payload(), Err(DcaError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_unknown_source_chain() {
        let params = BridgeTransferParams {
            source_chain_id: "1".to_string(),
            destination_chain_id: ALEO_CHAIN_ID.to_string(),
            token_address: "ETH".to_string(),
            amount: "1".to_string(),
            receiver: aleo_receiver(),
        };
        assert!(matches!(params.payload(), Err(DcaError::InvalidArgument(_))));
    }
}
