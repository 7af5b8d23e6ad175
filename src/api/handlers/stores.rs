//! Partner store handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{CreateStoreRequest, UpdateStoreSettingsRequest};
use crate::app_state::AppState;
use crate::domain::{Store, StoreOverview};
use crate::error::{ErrorResponse, LedgerError};

/// `GET /stores` — List stores with activity figures.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
#[utoipa::path(
    get,
    path = "/api/v1/stores",
    tag = "Stores",
    summary = "List stores",
    description = "Every partner store, oldest first, with codes minted, their face value and approved bills.",
    responses(
        (status = 200, description = "Stores", body = Vec<StoreOverview>),
    )
)]
pub async fn list_stores(State(state): State<AppState>) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.stores.list_stores().await?))
}

/// `POST /stores` — Onboard a store.
///
/// # Errors
///
/// Returns [`LedgerError::Validation`] for malformed input and
/// [`LedgerError::StoreExists`] for a taken mobile number or name.
#[utoipa::path(
    post,
    path = "/api/v1/stores",
    tag = "Stores",
    summary = "Create store",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Created store", body = Store),
        (status = 400, description = "Invalid store", body = ErrorResponse),
        (status = 409, description = "Mobile number or name taken", body = ErrorResponse),
    )
)]
pub async fn create_store(
    State(state): State<AppState>,
    Json(req): Json<CreateStoreRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    let store = state.stores.create_store(req.into()).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// `GET /stores/:id` — One store with activity figures.
///
/// # Errors
///
/// Returns [`LedgerError::StoreNotFound`] if the id is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/stores/{id}",
    tag = "Stores",
    summary = "Get store",
    params(("id" = String, Path, description = "Store id (admin mobile number)")),
    responses(
        (status = 200, description = "Store", body = StoreOverview),
        (status = 404, description = "Store not found", body = ErrorResponse),
    )
)]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.stores.get_store(&id).await?))
}

/// `PUT /stores/:id/settings` — Change standing, slug or quotas.
///
/// # Errors
///
/// Returns [`LedgerError::StoreNotFound`] or [`LedgerError::Validation`].
#[utoipa::path(
    put,
    path = "/api/v1/stores/{id}/settings",
    tag = "Stores",
    summary = "Update store settings",
    params(("id" = String, Path, description = "Store id (admin mobile number)")),
    request_body = UpdateStoreSettingsRequest,
    responses(
        (status = 200, description = "Updated store", body = Store),
        (status = 400, description = "Invalid settings", body = ErrorResponse),
        (status = 404, description = "Store not found", body = ErrorResponse),
    )
)]
pub async fn update_store_settings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStoreSettingsRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    Ok(Json(state.stores.update_settings(&id, req.as_update()).await?))
}

/// Store routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores", get(list_stores).post(create_store))
        .route("/stores/{id}", get(get_store))
        .route("/stores/{id}/settings", put(update_store_settings))
}
