//! Payout administration handlers.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::PayoutQuery;
use crate::app_state::AppState;
use crate::domain::PayoutRequest;
use crate::error::{ErrorResponse, LedgerError};

/// `GET /payouts` — List payout requests.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
#[utoipa::path(
    get,
    path = "/api/v1/payouts",
    tag = "Payouts",
    summary = "List payouts",
    description = "Returns payout requests newest first, optionally filtered by status.",
    params(PayoutQuery),
    responses(
        (status = 200, description = "Payout requests", body = Vec<PayoutRequest>),
    )
)]
pub async fn list_payouts(
    State(state): State<AppState>,
    Query(query): Query<PayoutQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.ledger.list_payouts(query.status).await?))
}

/// `POST /payouts/:id/complete` — Mark a payout as transferred.
///
/// # Errors
///
/// Returns [`LedgerError`] if the payout is unknown or not Pending.
#[utoipa::path(
    post,
    path = "/api/v1/payouts/{id}/complete",
    tag = "Payouts",
    summary = "Complete payout",
    params(("id" = String, Path, description = "Payout id")),
    responses(
        (status = 200, description = "Completed payout", body = PayoutRequest),
        (status = 404, description = "Payout not found", body = ErrorResponse),
        (status = 409, description = "Payout already settled", body = ErrorResponse),
    )
)]
pub async fn complete_payout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.ledger.complete_payout(&id).await?))
}

/// `POST /payouts/:id/reject` — Reject a payout and refund the points.
///
/// # Errors
///
/// Returns [`LedgerError`] if the payout is unknown or not Pending.
#[utoipa::path(
    post,
    path = "/api/v1/payouts/{id}/reject",
    tag = "Payouts",
    summary = "Reject payout",
    description = "Rejects a Pending payout and credits the withdrawn points back to the member.",
    params(("id" = String, Path, description = "Payout id")),
    responses(
        (status = 200, description = "Rejected payout", body = PayoutRequest),
        (status = 404, description = "Payout not found", body = ErrorResponse),
        (status = 409, description = "Payout already settled", body = ErrorResponse),
    )
)]
pub async fn reject_payout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.ledger.reject_payout(&id).await?))
}

/// Payout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payouts", get(list_payouts))
        .route("/payouts/{id}/complete", post(complete_payout))
        .route("/payouts/{id}/reject", post(reject_payout))
}
