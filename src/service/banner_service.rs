//! Promotional banner management.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::ids::{IdPrefix, new_id};
use crate::domain::{BannerChange, EventBus, LedgerEvent, PromoBanner};
use crate::error::LedgerError;
use crate::persistence::{self, Collection, DocumentStore};

use super::ledger_service::normalize_store;

/// Fields of a new banner.
#[derive(Debug, Clone, Default)]
pub struct NewBanner {
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: Option<String>,
    /// Creative image.
    pub image_url: String,
    /// Store scope; `None` for every store.
    pub store_id: Option<String>,
    /// Author.
    pub created_by: String,
    /// Click-through target.
    pub link: Option<String>,
}

/// Banner CRUD.
#[derive(Debug, Clone)]
pub struct BannerService {
    store: Arc<dyn DocumentStore>,
    event_bus: EventBus,
}

impl BannerService {
    /// Creates a new `BannerService`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Lists banners newest first.
    ///
    /// With a store, returns that store's banners plus global ones;
    /// without, returns every banner.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] on adapter failure.
    pub async fn list_banners(
        &self,
        store_id: Option<&str>,
        active_only: bool,
    ) -> Result<Vec<PromoBanner>, LedgerError> {
        let mut banners: Vec<PromoBanner> =
            persistence::fetch_all(self.store.as_ref(), Collection::Banners).await?;
        banners.retain(|b| {
            (!active_only || b.is_active) && store_id.is_none_or(|s| b.visible_to(Some(s)))
        });
        banners.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(banners)
    }

    /// Creates an active banner.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] for a blank title or image.
    pub async fn create_banner(&self, new: NewBanner) -> Result<PromoBanner, LedgerError> {
        let title = new.title.trim();
        let image_url = new.image_url.trim();
        if title.is_empty() || image_url.is_empty() {
            return Err(LedgerError::Validation(
                "banner title and image_url are required".to_string(),
            ));
        }
        let created_by = match new.created_by.trim() {
            "" => "admin".to_string(),
            author => author.to_string(),
        };
        let banner = PromoBanner {
            id: new_id(IdPrefix::Banner),
            title: title.to_string(),
            description: new.description.filter(|d| !d.trim().is_empty()),
            image_url: image_url.to_string(),
            is_active: true,
            store_id: normalize_store(new.store_id),
            created_at: Utc::now(),
            created_by,
            link: new.link.filter(|l| !l.trim().is_empty()),
        };

        let mut txn = self.store.begin().await?;
        persistence::create(txn.as_mut(), Collection::Banners, &banner.id, &banner).await?;
        txn.commit().await?;

        tracing::info!(banner_id = %banner.id, store_id = ?banner.store_id, "banner created");
        self.announce(&banner, BannerChange::Created);
        Ok(banner)
    }

    /// Flips a banner's active flag.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BannerNotFound`] if the id is unknown.
    pub async fn toggle_banner(&self, banner_id: &str) -> Result<PromoBanner, LedgerError> {
        let mut txn = self.store.begin().await?;
        let mut banner: PromoBanner = persistence::load(txn.as_mut(), Collection::Banners, banner_id)
            .await?
            .ok_or_else(|| LedgerError::BannerNotFound(banner_id.to_string()))?;
        banner.is_active = !banner.is_active;
        persistence::save(txn.as_mut(), Collection::Banners, &banner.id, &banner).await?;
        txn.commit().await?;

        tracing::info!(banner_id = %banner.id, is_active = banner.is_active, "banner toggled");
        self.announce(&banner, BannerChange::Toggled);
        Ok(banner)
    }

    /// Deletes a banner.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BannerNotFound`] if the id is unknown.
    pub async fn delete_banner(&self, banner_id: &str) -> Result<(), LedgerError> {
        let mut txn = self.store.begin().await?;
        let banner: PromoBanner = persistence::load(txn.as_mut(), Collection::Banners, banner_id)
            .await?
            .ok_or_else(|| LedgerError::BannerNotFound(banner_id.to_string()))?;
        txn.delete(Collection::Banners, banner_id).await?;
        txn.commit().await?;

        tracing::info!(banner_id, "banner deleted");
        self.announce(&banner, BannerChange::Deleted);
        Ok(())
    }

    fn announce(&self, banner: &PromoBanner, change: BannerChange) {
        self.event_bus.publish(LedgerEvent::BannerChanged {
            banner_id: banner.id.clone(),
            store_id: banner.store_id.clone(),
            change,
            timestamp: Utc::now(),
        });
    }
}
