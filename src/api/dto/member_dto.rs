//! Member, point adjustment and payout DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{Member, PayoutStatus};
use crate::service::Direction;

/// Request body for `POST /members`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterMemberRequest {
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Mobile number; becomes the member id.
    pub phone: String,
}

/// Paginated member list.
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberListResponse {
    /// Members on this page.
    pub data: Vec<Member>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for `POST /members/{id}/points`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustPointsRequest {
    /// Points to move; must be a positive whole number.
    pub amount: f64,
    /// Credit or debit.
    pub direction: Direction,
    /// Transaction note.
    #[serde(default)]
    pub note: Option<String>,
    /// Store attribution for the per-store sub-balance.
    #[serde(default)]
    pub store_id: Option<String>,
}

/// Request body for `POST /members/{id}/payouts`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePayoutRequest {
    /// Points to withdraw; must be a positive whole number.
    pub amount: f64,
    /// Destination UPI id, `name@bank`.
    pub upi_id: String,
}

/// Query parameters for `GET /payouts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PayoutQuery {
    /// Only payouts in this state.
    #[serde(default)]
    pub status: Option<PayoutStatus>,
}
