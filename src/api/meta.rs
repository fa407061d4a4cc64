//! Chain height, registries and input validation.

use crate::api::AppState;
use crate::domain::registry::{ChainInfo, TokenInfo, BRIDGE_CHAINS, DCA_TOKENS};
use crate::domain::{self, ChainKind};
use crate::error::AppError;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightResponse {
    pub block_height: u32,
}

pub async fn get_height(State(state): State<AppState>) -> Result<Json<HeightResponse>, AppError> {
    let height = state.manager.current_height().await?;
    Ok(Json(HeightResponse {
        block_height: height.as_u32(),
    }))
}

pub async fn get_tokens() -> Json<&'static [TokenInfo]> {
    Json(DCA_TOKENS)
}

pub async fn get_chains() -> Json<&'static [ChainInfo]> {
    Json(BRIDGE_CHAINS)
}

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub address: String,
    /// `native` (default) or `evm`.
    pub chain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
}

pub async fn validate_address(
    Query(params): Query<AddressQuery>,
) -> Result<Json<ValidationResponse>, AppError> {
    let chain = match params.chain.as_deref() {
        Some(c) => ChainKind::from_str(c).map_err(AppError::BadRequest)?,
        None => ChainKind::Native,
    };
    Ok(Json(ValidationResponse {
        valid: domain::validate_address(&params.address, chain),
    }))
}

pub async fn validate_amount(Query(params): Query<AmountQuery>) -> Json<ValidationResponse> {
    Json(ValidationResponse {
        valid: domain::validate_amount(&params.value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_address_defaults_to_native() {
        let Json(body) = validate_address(Query(AddressQuery {
            address: "0x0000000000000000000000000000000000000001".to_string(),
            chain: None,
        }))
        .await
        .unwrap();
        assert!(!body.valid);

        let Json(body) = validate_address(Query(AddressQuery {
            address: "0x0000000000000000000000000000000000000001".to_string(),
            chain: Some("evm".to_string()),
        }))
        .await
        .unwrap();
        assert!(body.valid);
    }

    #[tokio::test]
    async fn test_validate_address_unknown_chain() {
        let result = validate_address(Query(AddressQuery {
            address: "x".to_string(),
            chain: Some("solana".to_string()),
        }))
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_validate_amount() {
        let Json(body) = validate_amount(Query(AmountQuery {
            value: "1.5".to_string(),
        }))
        .await;
        assert!(body.valid);
        let Json(body) = validate_amount(Query(AmountQuery {
            value: "-1".to_string(),
        }))
        .await;
        assert!(!body.valid);
    }

    #[tokio::test]
    async fn test_registries() {
        let Json(tokens) = get_tokens().await;
        assert_eq!(tokens.len(), 4);
        let Json(chains) = get_chains().await;
        assert_eq!(chains.len(), 4);
    }
}
