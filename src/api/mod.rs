pub mod activity;
pub mod ans;
pub mod bridge;
pub mod health;
pub mod meta;
pub mod positions;

use crate::datasource::{AnsService, BridgeService};
use crate::db::Repository;
use crate::orchestration::PositionManager;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<PositionManager>,
    pub ans: AnsService,
    pub bridge: BridgeService,
    pub repo: Arc<Repository>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/height", get(meta::get_height))
        .route("/v1/tokens", get(meta::get_tokens))
        .route("/v1/chains", get(meta::get_chains))
        .route("/v1/validate/address", get(meta::validate_address))
        .route("/v1/validate/amount", get(meta::validate_amount))
        .route(
            "/v1/positions",
            get(positions::list_positions).post(positions::create_position),
        )
        .route("/v1/positions/reconcile", post(positions::reconcile))
        .route("/v1/positions/:id", get(positions::get_position))
        .route("/v1/positions/:id/confirm", post(positions::confirm_create))
        .route("/v1/positions/:id/reject", post(positions::reject_create))
        .route("/v1/positions/:id/execute", post(positions::execute))
        .route(
            "/v1/positions/:id/execute/settle",
            post(positions::settle_execute),
        )
        .route("/v1/positions/:id/cancel", post(positions::cancel))
        .route(
            "/v1/positions/:id/cancel/settle",
            post(positions::settle_cancel),
        )
        .route("/v1/ans/primary/:address", get(ans::primary_name))
        .route("/v1/ans/address/:name", get(ans::address_of))
        .route("/v1/ans/hash/:hash", get(ans::name_from_hash))
        .route("/v1/ans/resolver", get(ans::resolver))
        .route("/v1/ans/display/:address", get(ans::display))
        .route("/v1/bridge/status", get(bridge::status))
        .route("/v1/bridge/packets", get(bridge::packets))
        .route("/v1/bridge/transfer", post(bridge::transfer))
        .route("/v1/activity", get(activity::recent))
        .layer(cors)
        .with_state(state)
}
