//! REST endpoint handlers organized by resource.

pub mod banners;
pub mod batches;
pub mod invoices;
pub mod members;
pub mod payouts;
pub mod stores;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(members::routes())
        .merge(payouts::routes())
        .merge(batches::routes())
        .merge(invoices::routes())
        .merge(banners::routes())
        .merge(stores::routes())
}
