//! Promo banner handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{BannerQuery, CreateBannerRequest};
use crate::app_state::AppState;
use crate::domain::PromoBanner;
use crate::error::{ErrorResponse, LedgerError};

/// `GET /banners` — List banners.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
#[utoipa::path(
    get,
    path = "/api/v1/banners",
    tag = "Banners",
    summary = "List banners",
    description = "With `store_id`, returns that store's banners plus global ones. `active_only` hides switched-off banners.",
    params(BannerQuery),
    responses(
        (status = 200, description = "Banners", body = Vec<PromoBanner>),
    )
)]
pub async fn list_banners(
    State(state): State<AppState>,
    Query(query): Query<BannerQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(
        state
            .banners
            .list_banners(query.store_id.as_deref(), query.active_only)
            .await?,
    ))
}

/// `POST /banners` — Create a banner.
///
/// # Errors
///
/// Returns [`LedgerError::Validation`] for a blank title or image.
#[utoipa::path(
    post,
    path = "/api/v1/banners",
    tag = "Banners",
    summary = "Create banner",
    request_body = CreateBannerRequest,
    responses(
        (status = 201, description = "Created banner", body = PromoBanner),
        (status = 400, description = "Invalid banner", body = ErrorResponse),
    )
)]
pub async fn create_banner(
    State(state): State<AppState>,
    Json(req): Json<CreateBannerRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let banner = state.banners.create_banner(req.into()).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

/// `POST /banners/:id/toggle` — Flip the active flag.
///
/// # Errors
///
/// Returns [`LedgerError::BannerNotFound`] if the id is unknown.
#[utoipa::path(
    post,
    path = "/api/v1/banners/{id}/toggle",
    tag = "Banners",
    summary = "Toggle banner",
    params(("id" = String, Path, description = "Banner id")),
    responses(
        (status = 200, description = "Updated banner", body = PromoBanner),
        (status = 404, description = "Banner not found", body = ErrorResponse),
    )
)]
pub async fn toggle_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.banners.toggle_banner(&id).await?))
}

/// `DELETE /banners/:id` — Delete a banner.
///
/// # Errors
///
/// Returns [`LedgerError::BannerNotFound`] if the id is unknown.
#[utoipa::path(
    delete,
    path = "/api/v1/banners/{id}",
    tag = "Banners",
    summary = "Delete banner",
    params(("id" = String, Path, description = "Banner id")),
    responses(
        (status = 204, description = "Banner deleted"),
        (status = 404, description = "Banner not found", body = ErrorResponse),
    )
)]
pub async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    state.banners.delete_banner(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Banner routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/banners", get(list_banners).post(create_banner))
        .route("/banners/{id}", delete(delete_banner))
        .route("/banners/{id}/toggle", post(toggle_banner))
}
