use crate::api::AppState;
use crate::datasource::{BridgeStatus, PacketFilter, PacketPage, PacketQuery};
use crate::error::AppError;
use crate::transactions::{BridgePayload, BridgeTransferParams};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketsQuery {
    pub wallet: Option<String>,
    pub chain_id: Option<String>,
    pub filter: Option<PacketFilter>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub min_signature_count: Option<u32>,
}

pub async fn status(State(state): State<AppState>) -> Json<BridgeStatus> {
    Json(state.bridge.status())
}

pub async fn packets(
    Query(params): Query<PacketsQuery>,
    State(state): State<AppState>,
) -> Result<Json<PacketPage>, AppError> {
    if params.wallet.is_none() && params.chain_id.is_none() {
        return Err(AppError::BadRequest(
            "wallet or chainId is required".into(),
        ));
    }
    let defaults = PacketQuery::default();
    let query = PacketQuery {
        filter: params.filter.unwrap_or(defaults.filter),
        page: params.page.unwrap_or(defaults.page).max(1),
        limit: params.limit.unwrap_or(defaults.limit),
        min_signature_count: params
            .min_signature_count
            .unwrap_or(defaults.min_signature_count),
    };

    let page = state
        .bridge
        .packets(params.wallet.as_deref(), params.chain_id.as_deref(), &query)
        .await;
    Ok(Json(page))
}

/// Build the source-chain payload for a transfer. Nothing is submitted.
pub async fn transfer(
    Json(body): Json<BridgeTransferParams>,
) -> Result<Json<BridgePayload>, AppError> {
    Ok(Json(body.payload()?))
}
