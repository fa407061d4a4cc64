//! Name-service lookups. Unregistered or unreachable names read as `null`.

use crate::api::AppState;
use crate::datasource::NameBalance;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct NameResponse {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayResponse {
    pub address: String,
    pub display: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolverQuery {
    pub name: String,
    pub category: String,
}

pub async fn primary_name(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Json<NameResponse> {
    Json(NameResponse {
        name: state.ans.primary_name(&address).await,
    })
}

pub async fn address_of(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Json<AddressResponse> {
    Json(AddressResponse {
        address: state.ans.address_of(&name).await,
    })
}

pub async fn name_from_hash(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Json<Option<NameBalance>> {
    Json(state.ans.name_from_hash(&hash).await)
}

pub async fn resolver(
    Query(params): Query<ResolverQuery>,
    State(state): State<AppState>,
) -> Json<ContentResponse> {
    Json(ContentResponse {
        content: state
            .ans
            .resolver_content(&params.name, &params.category)
            .await,
    })
}

/// Display form of an address: its primary name (with avatar) or a truncation.
pub async fn display(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Json<DisplayResponse> {
    let (display, avatar) = match state.ans.primary_name(&address).await {
        Some(name) => {
            let avatar = state.ans.avatar(&name).await;
            (name, avatar)
        }
        None => (state.ans.format_address(&address).await, None),
    };
    Json(DisplayResponse {
        address,
        display,
        avatar,
    })
}
