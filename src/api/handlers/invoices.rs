//! Invoice submission and review handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    InvoiceQuery, RejectInvoiceRequest, SubmitInvoiceRequest, UpdateInvoiceAmountRequest,
};
use crate::app_state::AppState;
use crate::domain::InvoiceRequest;
use crate::error::{ErrorResponse, LedgerError};

/// `POST /invoices` — Submit a bill for review.
///
/// # Errors
///
/// Returns [`LedgerError`] on invalid fields or an unknown customer.
#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    tag = "Invoices",
    summary = "Submit invoice",
    request_body = SubmitInvoiceRequest,
    responses(
        (status = 201, description = "Pending invoice", body = InvoiceRequest),
        (status = 400, description = "Invalid invoice", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    )
)]
pub async fn submit_invoice(
    State(state): State<AppState>,
    Json(req): Json<SubmitInvoiceRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let invoice = state.invoices.submit_invoice(req.into()).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// `GET /invoices` — List invoices.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    tag = "Invoices",
    summary = "List invoices",
    description = "Returns invoices newest first, optionally only one store's.",
    params(InvoiceQuery),
    responses(
        (status = 200, description = "Invoices", body = Vec<InvoiceRequest>),
    )
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(
        state
            .invoices
            .list_invoices(query.store_name.as_deref())
            .await?,
    ))
}

/// `PUT /invoices/:id/amount` — Correct a pending invoice amount.
///
/// # Errors
///
/// Returns [`LedgerError`] if the invoice is unknown, reviewed, or the
/// amount is malformed.
#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}/amount",
    tag = "Invoices",
    summary = "Update invoice amount",
    params(("id" = String, Path, description = "Invoice id")),
    request_body = UpdateInvoiceAmountRequest,
    responses(
        (status = 200, description = "Updated invoice", body = InvoiceRequest),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Invoice not found", body = ErrorResponse),
        (status = 409, description = "Invoice already reviewed", body = ErrorResponse),
    )
)]
pub async fn update_amount(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateInvoiceAmountRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.invoices.update_amount(&id, req.amount).await?))
}

/// `POST /invoices/:id/approve` — Approve and credit.
///
/// # Errors
///
/// Returns [`LedgerError`] if the invoice is unknown, reviewed, or worth no
/// points.
#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/approve",
    tag = "Invoices",
    summary = "Approve invoice",
    description = "Credits floor(amount × points-per-rupee) to the member, attributed to the issuing store, and marks the invoice Approved.",
    params(("id" = String, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Approved invoice", body = InvoiceRequest),
        (status = 400, description = "Amount earns no points", body = ErrorResponse),
        (status = 404, description = "Invoice not found", body = ErrorResponse),
        (status = 409, description = "Invoice already reviewed", body = ErrorResponse),
    )
)]
pub async fn approve_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.invoices.approve(&id).await?))
}

/// `POST /invoices/:id/reject` — Reject without credit.
///
/// # Errors
///
/// Returns [`LedgerError`] if the invoice is unknown or reviewed.
#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/reject",
    tag = "Invoices",
    summary = "Reject invoice",
    params(("id" = String, Path, description = "Invoice id")),
    request_body = RejectInvoiceRequest,
    responses(
        (status = 200, description = "Rejected invoice", body = InvoiceRequest),
        (status = 404, description = "Invoice not found", body = ErrorResponse),
        (status = 409, description = "Invoice already reviewed", body = ErrorResponse),
    )
)]
pub async fn reject_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RejectInvoiceRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.invoices.reject(&id, req.reason).await?))
}

/// Invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(submit_invoice))
        .route("/invoices/{id}/amount", put(update_amount))
        .route("/invoices/{id}/approve", post(approve_invoice))
        .route("/invoices/{id}/reject", post(reject_invoice))
}
