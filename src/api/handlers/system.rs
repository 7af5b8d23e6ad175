//! System endpoints: health check and reward configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Reward and code settings in force.
#[derive(Debug, Serialize, ToSchema)]
pub struct RewardConfigResponse {
    /// Points credited per rupee of an approved invoice.
    points_per_rupee: f64,
    /// Symbols codes are drawn from.
    code_alphabet: String,
    /// Days a freshly minted code stays redeemable.
    code_validity_days: i64,
    /// Largest batch a single request may mint.
    max_batch_quantity: u32,
}

/// `GET /config/rewards` — Reward ratio and code policy.
#[utoipa::path(
    get,
    path = "/config/rewards",
    tag = "System",
    summary = "Reward configuration",
    description = "Returns the invoice reward ratio and the code generation policy.",
    responses(
        (status = 200, description = "Reward configuration", body = RewardConfigResponse),
    )
)]
pub async fn rewards_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(RewardConfigResponse {
        points_per_rupee: state.reward().points_per_rupee,
        code_alphabet: state.codes.alphabet_string(),
        code_validity_days: state.codes.validity_days,
        max_batch_quantity: state.codes.max_batch_quantity,
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/rewards", get(rewards_handler))
}
