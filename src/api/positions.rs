use crate::api::AppState;
use crate::domain::registry::format_token;
use crate::domain::{Address, BlockHeight, CreatePositionParams, Outcome, Position};
use crate::engine::ReconcileReport;
use crate::error::AppError;
use crate::orchestration::Submission;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Include terminal, pending and unclassified positions.
    pub all: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionRequest {
    pub owner: String,
    #[serde(flatten)]
    pub params: CreatePositionParams,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub record: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub token_record: String,
    pub current_height: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub owner: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    #[serde(flatten)]
    pub position: Position,
    pub input_token: String,
    pub output_token: String,
}

impl From<Position> for PositionDto {
    fn from(position: Position) -> Self {
        Self {
            input_token: format_token(position.input_token_id),
            output_token: format_token(position.output_token_id),
            position,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    pub positions: Vec<PositionDto>,
}

fn parse_owner(owner: &str) -> Result<Address, AppError> {
    Address::from_str(owner).map_err(|_| AppError::BadRequest("Invalid owner address".into()))
}

pub async fn list_positions(
    Query(params): Query<ListQuery>,
    State(state): State<AppState>,
) -> Json<PositionsResponse> {
    let positions = if params.all.unwrap_or(false) {
        state.manager.all_positions().await
    } else {
        state.manager.positions().await
    };
    Json(PositionsResponse {
        positions: positions.into_iter().map(PositionDto::from).collect(),
    })
}

pub async fn get_position(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PositionDto>, AppError> {
    let position = state.manager.position(&id).await?;
    Ok(Json(position.into()))
}

pub async fn create_position(
    State(state): State<AppState>,
    Json(body): Json<CreatePositionRequest>,
) -> Result<(StatusCode, Json<Submission>), AppError> {
    let owner = parse_owner(&body.owner)?;
    let submission = state.manager.create(owner, body.params).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn confirm_create(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Option<Json<ConfirmRequest>>,
) -> Result<Json<PositionDto>, AppError> {
    let record = body.and_then(|Json(b)| b.record);
    let position = state.manager.confirm_create(&id, record).await?;
    Ok(Json(position.into()))
}

pub async fn reject_create(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PositionDto>, AppError> {
    let position = state.manager.reject_create(&id).await?;
    Ok(Json(position.into()))
}

pub async fn execute(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<ExecuteRequest>,
) -> Result<Json<Submission>, AppError> {
    let submission = state
        .manager
        .execute(&id, &body.token_record, body.current_height.map(BlockHeight::new))
        .await?;
    Ok(Json(submission))
}

pub async fn settle_execute(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(outcome): Json<Outcome>,
) -> Result<Json<PositionDto>, AppError> {
    let position = state.manager.settle_execute(&id, outcome).await?;
    Ok(Json(position.into()))
}

pub async fn cancel(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Submission>, AppError> {
    Ok(Json(state.manager.cancel(&id).await?))
}

pub async fn settle_cancel(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(outcome): Json<Outcome>,
) -> Result<Json<PositionDto>, AppError> {
    let position = state.manager.settle_cancel(&id, outcome).await?;
    Ok(Json(position.into()))
}

pub async fn reconcile(
    State(state): State<AppState>,
    Json(body): Json<ReconcileRequest>,
) -> Result<Json<ReconcileReport>, AppError> {
    let owner = parse_owner(&body.owner)?;
    Ok(Json(state.manager.reconcile(&owner).await?))
}
