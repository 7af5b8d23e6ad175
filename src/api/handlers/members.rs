//! Member handlers: registration, lookup, point adjustments and payouts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AdjustPointsRequest, CreatePayoutRequest, MemberListResponse, PaginationParams,
    RegisterMemberRequest, whole_points,
};
use crate::app_state::AppState;
use crate::domain::{Member, Transaction};
use crate::error::{ErrorResponse, LedgerError};

/// `GET /members` — List members.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
#[utoipa::path(
    get,
    path = "/api/v1/members",
    tag = "Members",
    summary = "List members",
    description = "Returns a paginated list of members ordered by registration time.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated member list", body = MemberListResponse),
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, LedgerError> {
    let members = state.ledger.get_all_members().await?;
    let (data, pagination) = params.paginate(members);
    Ok(Json(MemberListResponse { data, pagination }))
}

/// `POST /members` — Register a member.
///
/// # Errors
///
/// Returns [`LedgerError::MemberExists`] for a known phone number.
#[utoipa::path(
    post,
    path = "/api/v1/members",
    tag = "Members",
    summary = "Register a member",
    description = "Creates a member with zero balances. The phone number becomes the member id.",
    request_body = RegisterMemberRequest,
    responses(
        (status = 201, description = "Member registered", body = Member),
        (status = 400, description = "Invalid name or phone", body = ErrorResponse),
        (status = 409, description = "Phone already registered", body = ErrorResponse),
    )
)]
pub async fn register_member(
    State(state): State<AppState>,
    Json(req): Json<RegisterMemberRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let member = state
        .ledger
        .register_member(&req.name, req.email.as_deref(), &req.phone)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// `GET /members/:id` — Member by id or phone.
///
/// # Errors
///
/// Returns [`LedgerError::MemberNotFound`] if nothing matches.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}",
    tag = "Members",
    summary = "Get member",
    description = "Returns a member with balances and full transaction history. Accepts the member id or phone number.",
    params(("id" = String, Path, description = "Member id or phone")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found", body = ErrorResponse),
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.ledger.get_member(&id).await?))
}

/// `GET /members/by-phone/:phone` — Member by phone.
///
/// # Errors
///
/// Returns [`LedgerError::MemberNotFound`] if no member has that phone.
#[utoipa::path(
    get,
    path = "/api/v1/members/by-phone/{phone}",
    tag = "Members",
    summary = "Find member by phone",
    params(("phone" = String, Path, description = "Registered phone number")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found", body = ErrorResponse),
    )
)]
pub async fn get_member_by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.ledger.get_member_by_phone(&phone).await?))
}

/// `POST /members/:id/points` — Credit or debit a member.
///
/// # Errors
///
/// Returns [`LedgerError`] on invalid amount, unknown member or overdraft.
#[utoipa::path(
    post,
    path = "/api/v1/members/{id}/points",
    tag = "Members",
    summary = "Adjust points",
    description = "Credits (`add`) or debits (`redeem`) a member. With a `store_id` the per-store sub-balance moves too.",
    params(("id" = String, Path, description = "Member id or phone")),
    request_body = AdjustPointsRequest,
    responses(
        (status = 200, description = "Updated member", body = Member),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 422, description = "Insufficient balance", body = ErrorResponse),
    )
)]
pub async fn adjust_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdjustPointsRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let amount = whole_points(req.amount)?;
    let member = state
        .ledger
        .adjust_points(&id, amount, req.direction, req.note, req.store_id)
        .await?;
    Ok(Json(member))
}

/// `POST /members/:id/payouts` — Request a cash payout.
///
/// # Errors
///
/// Returns [`LedgerError`] on invalid amount or UPI id, unknown member or
/// overdraft.
#[utoipa::path(
    post,
    path = "/api/v1/members/{id}/payouts",
    tag = "Payouts",
    summary = "Request payout",
    description = "Debits the points immediately and files a Pending payout request. Returns the debit transaction.",
    params(("id" = String, Path, description = "Member id or phone")),
    request_body = CreatePayoutRequest,
    responses(
        (status = 201, description = "Debit transaction", body = Transaction),
        (status = 400, description = "Invalid amount or UPI id", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 422, description = "Insufficient balance", body = ErrorResponse),
    )
)]
pub async fn request_payout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreatePayoutRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let amount = whole_points(req.amount)?;
    let transaction = state.ledger.request_payout(&id, amount, &req.upi_id).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Member routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(register_member))
        .route("/members/by-phone/{phone}", get(get_member_by_phone))
        .route("/members/{id}", get(get_member))
        .route("/members/{id}/points", post(adjust_points))
        .route("/members/{id}/payouts", post(request_payout))
}
