//! Batch and redemption DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{BatchStatus, LoyaltyBatch};

/// Request body for `POST /batches`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBatchRequest {
    /// Display name; defaults to `Batch <date>`.
    #[serde(default)]
    pub name: Option<String>,
    /// Value of each code; must be a positive whole number.
    pub points_per_code: f64,
    /// Number of codes to mint.
    pub quantity: i64,
    /// Store the codes are attributed to.
    #[serde(default)]
    pub store_id: Option<String>,
}

/// Query parameters for `GET /batches`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BatchQuery {
    /// Only batches of this store.
    #[serde(default)]
    pub store_id: Option<String>,
}

/// Batch without its codes, for list views.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchSummaryDto {
    /// Batch id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Value of each code.
    pub points_per_code: u64,
    /// Codes minted.
    pub quantity: u32,
    /// Codes already redeemed.
    pub redeemed: usize,
    /// Minting time.
    pub created_date: DateTime<Utc>,
    /// Batch lifecycle.
    pub status: BatchStatus,
    /// Store attribution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

impl From<&LoyaltyBatch> for BatchSummaryDto {
    fn from(batch: &LoyaltyBatch) -> Self {
        Self {
            id: batch.id.clone(),
            name: batch.name.clone(),
            points_per_code: batch.points_per_code,
            quantity: batch.quantity,
            redeemed: batch.redeemed_count(),
            created_date: batch.created_date,
            status: batch.status,
            store_id: batch.store_id.clone(),
        }
    }
}

/// Request body for `POST /redemptions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemRequest {
    /// Scanned code, case-insensitive.
    pub code: String,
    /// Store performing the scan; codes of other stores are refused.
    #[serde(default)]
    pub store_id: Option<String>,
    /// Member to credit, by id or phone.
    #[serde(default)]
    pub member_id: Option<String>,
}
