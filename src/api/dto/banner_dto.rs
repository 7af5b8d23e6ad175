//! Promo banner DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::service::NewBanner;

/// Request body for `POST /banners`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBannerRequest {
    /// Headline.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub description: Option<String>,
    /// Creative image.
    pub image_url: String,
    /// Store scope; omit for every store.
    #[serde(default)]
    pub store_id: Option<String>,
    /// Author.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Click-through target.
    #[serde(default)]
    pub link: Option<String>,
}

impl From<CreateBannerRequest> for NewBanner {
    fn from(req: CreateBannerRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            store_id: req.store_id,
            created_by: req.created_by.unwrap_or_default(),
            link: req.link,
        }
    }
}

/// Query parameters for `GET /banners`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BannerQuery {
    /// Store whose banners (plus global ones) to return.
    #[serde(default)]
    pub store_id: Option<String>,
    /// Only banners currently shown.
    #[serde(default)]
    pub active_only: bool,
}
