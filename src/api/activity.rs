use crate::api::AppState;
use crate::db::Activity;
use crate::error::AppError;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub activity: Vec<Activity>,
}

pub async fn recent(
    Query(params): Query<ActivityQuery>,
    State(state): State<AppState>,
) -> Result<Json<ActivityResponse>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let activity = state.repo.recent_activity(limit).await?;
    Ok(Json(ActivityResponse { activity }))
}
