//! Promotional banners shown to members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Marketing creative, optionally scoped to one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PromoBanner {
    /// Unique identifier.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creative image.
    pub image_url: String,
    /// Whether members currently see it.
    pub is_active: bool,
    /// Store scope; `None` means every store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Author.
    pub created_by: String,
    /// Click-through target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl PromoBanner {
    /// Global banners are visible everywhere; scoped ones only to their store.
    #[must_use]
    pub fn visible_to(&self, store_id: Option<&str>) -> bool {
        match (&self.store_id, store_id) {
            (None, _) => true,
            (Some(own), Some(wanted)) => own == wanted,
            (Some(_), None) => false,
        }
    }
}
