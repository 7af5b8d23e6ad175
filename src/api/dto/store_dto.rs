//! Partner store DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::StoreStatus;
use crate::service::{NewStore, StoreSettingsUpdate};

/// Request body for `POST /stores`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    /// Display name; also the attribution key on batches and invoices.
    pub name: String,
    /// Admin mobile number; becomes the store id.
    pub mobile: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// URL handle; derived from the name when omitted.
    #[serde(default)]
    pub slug: Option<String>,
}

impl From<CreateStoreRequest> for NewStore {
    fn from(req: CreateStoreRequest) -> Self {
        Self {
            name: req.name,
            mobile: req.mobile,
            email: req.email,
            slug: req.slug,
        }
    }
}

/// Request body for `PUT /stores/{id}/settings`. Omitted fields keep
/// their current value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStoreSettingsRequest {
    /// Account standing.
    #[serde(default)]
    pub account_status: Option<StoreStatus>,
    /// URL handle.
    #[serde(default)]
    pub slug: Option<String>,
    /// Members the store may enroll.
    #[serde(default)]
    pub customer_quota: Option<u32>,
    /// Points the store may issue.
    #[serde(default)]
    pub points_quota: Option<u64>,
}

impl UpdateStoreSettingsRequest {
    /// Borrows the request as a settings update.
    #[must_use]
    pub fn as_update(&self) -> StoreSettingsUpdate<'_> {
        StoreSettingsUpdate {
            account_status: self.account_status,
            slug: self.slug.as_deref(),
            customer_quota: self.customer_quota,
            points_quota: self.points_quota,
        }
    }
}
