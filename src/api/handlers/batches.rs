//! Batch minting and code redemption handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{BatchQuery, BatchSummaryDto, CreateBatchRequest, RedeemRequest, whole_points};
use crate::app_state::AppState;
use crate::domain::LoyaltyBatch;
use crate::error::{ErrorResponse, LedgerError};
use crate::service::RedemptionOutcome;

/// `POST /batches` — Mint a batch of codes.
///
/// # Errors
///
/// Returns [`LedgerError`] on invalid value or quantity.
#[utoipa::path(
    post,
    path = "/api/v1/batches",
    tag = "Batches",
    summary = "Create batch",
    description = "Mints `quantity` unique codes in `XXXX-XXXX` form, each worth `points_per_code`.",
    request_body = CreateBatchRequest,
    responses(
        (status = 201, description = "Batch with its codes", body = LoyaltyBatch),
        (status = 400, description = "Invalid value or quantity", body = ErrorResponse),
    )
)]
pub async fn create_batch(
    State(state): State<AppState>,
    Json(req): Json<CreateBatchRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let points = whole_points(req.points_per_code)?;
    let batch = state
        .redemption
        .create_batch(req.name, points, req.quantity, req.store_id)
        .await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// `GET /batches` — List batches.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
#[utoipa::path(
    get,
    path = "/api/v1/batches",
    tag = "Batches",
    summary = "List batches",
    description = "Returns batch summaries newest first, optionally only one store's.",
    params(BatchQuery),
    responses(
        (status = 200, description = "Batch summaries", body = Vec<BatchSummaryDto>),
    )
)]
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    let batches = state
        .redemption
        .list_batches(query.store_id.as_deref())
        .await?;
    let summaries: Vec<BatchSummaryDto> = batches.iter().map(BatchSummaryDto::from).collect();
    Ok(Json(summaries))
}

/// `GET /batches/:id` — Batch with codes.
///
/// # Errors
///
/// Returns [`LedgerError::BatchNotFound`] if the id is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/batches/{id}",
    tag = "Batches",
    summary = "Get batch",
    params(("id" = String, Path, description = "Batch id")),
    responses(
        (status = 200, description = "Batch with its codes", body = LoyaltyBatch),
        (status = 404, description = "Batch not found", body = ErrorResponse),
    )
)]
pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.redemption.get_batch(&id).await?))
}

/// `POST /batches/:id/printed` — Mark a batch printed.
///
/// # Errors
///
/// Returns [`LedgerError`] if the batch is unknown or expired.
#[utoipa::path(
    post,
    path = "/api/v1/batches/{id}/printed",
    tag = "Batches",
    summary = "Mark batch printed",
    params(("id" = String, Path, description = "Batch id")),
    responses(
        (status = 200, description = "Updated batch", body = LoyaltyBatch),
        (status = 404, description = "Batch not found", body = ErrorResponse),
        (status = 409, description = "Batch expired", body = ErrorResponse),
    )
)]
pub async fn mark_printed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.redemption.mark_printed(&id).await?))
}

/// `POST /redemptions` — Redeem a code.
///
/// Refused redemptions are a `200` with `success: false`.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
#[utoipa::path(
    post,
    path = "/api/v1/redemptions",
    tag = "Redemptions",
    summary = "Redeem code",
    description = "Consumes a code exactly once and credits its value to the member, if given. Precondition failures return `success: false` with a reason.",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Redemption outcome", body = RedemptionOutcome),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn redeem_code(
    State(state): State<AppState>,
    Json(req): Json<RedeemRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let outcome = state
        .redemption
        .redeem_code(&req.code, req.store_id.as_deref(), req.member_id.as_deref())
        .await?;
    Ok(Json(outcome))
}

/// Batch and redemption routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/batches", get(list_batches).post(create_batch))
        .route("/batches/{id}", get(get_batch))
        .route("/batches/{id}/printed", post(mark_printed))
        .route("/redemptions", post(redeem_code))
}
