//! Partner store onboarding, settings and activity figures.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use super::invoice_service::InvoiceService;
use super::ledger_service::check_phone;
use super::redemption_service::RedemptionService;
use crate::domain::store::{
    DEFAULT_CUSTOMER_QUOTA, DEFAULT_POINTS_QUOTA, initials, is_valid_slug, slugify,
};
use crate::domain::{
    EventBus, InvoiceStatus, LedgerEvent, Store, StoreOverview, StoreStats, StoreStatus,
};
use crate::error::LedgerError;
use crate::persistence::{self, Collection, DocumentStore, StoreNameEntry};

/// Fields of a store being onboarded.
#[derive(Debug, Clone, Default)]
pub struct NewStore {
    /// Display name; becomes the attribution key.
    pub name: String,
    /// Admin mobile number; becomes the store id.
    pub mobile: String,
    /// Contact email.
    pub email: Option<String>,
    /// URL handle; derived from the name when absent.
    pub slug: Option<String>,
}

/// Settings to change; `None` leaves a field as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreSettingsUpdate<'a> {
    /// New account standing.
    pub account_status: Option<StoreStatus>,
    /// New URL handle.
    pub slug: Option<&'a str>,
    /// New member quota.
    pub customer_quota: Option<u32>,
    /// New points quota.
    pub points_quota: Option<u64>,
}

/// Store administration for the super-admin.
///
/// Activity figures are read from the batch and invoice services, so they
/// always reflect committed state.
#[derive(Debug, Clone)]
pub struct StoreService {
    store: Arc<dyn DocumentStore>,
    redemption: Arc<RedemptionService>,
    invoices: Arc<InvoiceService>,
    event_bus: EventBus,
}

impl StoreService {
    /// Creates a new `StoreService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        redemption: Arc<RedemptionService>,
        invoices: Arc<InvoiceService>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            redemption,
            invoices,
            event_bus,
        }
    }

    /// Lists every store, oldest first, with its activity figures.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] on adapter failure.
    pub async fn list_stores(&self) -> Result<Vec<StoreOverview>, LedgerError> {
        let mut stores: Vec<Store> =
            persistence::fetch_all(self.store.as_ref(), Collection::Stores).await?;
        stores.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));

        let batches = self.redemption.list_batches(None).await?;
        let invoices = self.invoices.list_invoices(None).await?;

        let mut stats: HashMap<&str, StoreStats> = HashMap::new();
        for batch in &batches {
            if let Some(name) = batch.store_id.as_deref() {
                let entry = stats.entry(name).or_default();
                entry.coupons_generated += u64::from(batch.quantity);
                entry.points_generated = entry
                    .points_generated
                    .saturating_add(u64::from(batch.quantity).saturating_mul(batch.points_per_code));
            }
        }
        for invoice in invoices.iter().filter(|i| i.status == InvoiceStatus::Approved) {
            stats.entry(invoice.store_name.as_str()).or_default().bills_approved += 1;
        }

        Ok(stores
            .into_iter()
            .map(|store| {
                let stats = stats.get(store.name.as_str()).copied().unwrap_or_default();
                StoreOverview { store, stats }
            })
            .collect())
    }

    /// Returns one store with its activity figures.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::StoreNotFound`] if the id is unknown.
    pub async fn get_store(&self, store_id: &str) -> Result<StoreOverview, LedgerError> {
        let store: Store = persistence::fetch(self.store.as_ref(), Collection::Stores, store_id)
            .await?
            .ok_or_else(|| LedgerError::StoreNotFound(store_id.to_string()))?;

        let mut stats = StoreStats::default();
        for batch in self.redemption.list_batches(Some(&store.name)).await? {
            stats.coupons_generated += u64::from(batch.quantity);
            stats.points_generated = stats
                .points_generated
                .saturating_add(u64::from(batch.quantity).saturating_mul(batch.points_per_code));
        }
        stats.bills_approved = self
            .invoices
            .list_invoices(Some(&store.name))
            .await?
            .iter()
            .filter(|i| i.status == InvoiceStatus::Approved)
            .count() as u64;

        Ok(StoreOverview { store, stats })
    }

    /// Onboards an Active store with the default quotas.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] for a blank name, a malformed
    /// mobile number or slug, and [`LedgerError::StoreExists`] if the mobile
    /// number or the name (case-insensitively) is taken.
    pub async fn create_store(&self, new: NewStore) -> Result<Store, LedgerError> {
        let name = new.name.trim();
        let mobile = new.mobile.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("store name is required".to_string()));
        }
        check_phone(mobile)?;
        let slug = match new.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => slugify(name),
        };
        if !is_valid_slug(&slug) {
            return Err(LedgerError::Validation(format!(
                "slug must be lower-case letters, digits and hyphens, got {slug:?}"
            )));
        }

        let store = Store {
            id: mobile.to_string(),
            name: name.to_string(),
            mobile: mobile.to_string(),
            email: new.email.as_deref().map(str::trim).unwrap_or_default().to_string(),
            initials: initials(name),
            slug,
            account_status: StoreStatus::Active,
            customer_quota: DEFAULT_CUSTOMER_QUOTA,
            points_quota: DEFAULT_POINTS_QUOTA,
            created_at: Utc::now(),
        };
        let name_entry = StoreNameEntry {
            name: store.name.clone(),
            store_id: store.id.clone(),
        };

        let mut txn = self.store.begin().await?;
        if !persistence::insert(txn.as_mut(), Collection::Stores, &store.id, &store).await? {
            return Err(LedgerError::StoreExists(format!("mobile {mobile}")));
        }
        let name_key = store.name.to_lowercase();
        if !persistence::insert(txn.as_mut(), Collection::StoreNames, &name_key, &name_entry).await? {
            return Err(LedgerError::StoreExists(format!("name {name}")));
        }
        txn.commit().await?;

        tracing::info!(store_id = %store.id, name = %store.name, slug = %store.slug, "store created");
        self.event_bus.publish(LedgerEvent::StoreRegistered {
            store_id: store.id.clone(),
            name: store.name.clone(),
            timestamp: store.created_at,
        });
        Ok(store)
    }

    /// Changes a store's standing, slug or quotas.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::StoreNotFound`] if the id is unknown and
    /// [`LedgerError::Validation`] for a malformed slug.
    pub async fn update_settings(
        &self,
        store_id: &str,
        update: StoreSettingsUpdate<'_>,
    ) -> Result<Store, LedgerError> {
        let slug = update.slug.map(str::trim);
        if let Some(slug) = slug.filter(|s| !is_valid_slug(s)) {
            return Err(LedgerError::Validation(format!(
                "slug must be lower-case letters, digits and hyphens, got {slug:?}"
            )));
        }

        let mut txn = self.store.begin().await?;
        let mut store: Store = persistence::load(txn.as_mut(), Collection::Stores, store_id)
            .await?
            .ok_or_else(|| LedgerError::StoreNotFound(store_id.to_string()))?;
        if let Some(status) = update.account_status {
            store.account_status = status;
        }
        if let Some(slug) = slug {
            store.slug = slug.to_string();
        }
        if let Some(quota) = update.customer_quota {
            store.customer_quota = quota;
        }
        if let Some(quota) = update.points_quota {
            store.points_quota = quota;
        }
        persistence::save(txn.as_mut(), Collection::Stores, &store.id, &store).await?;
        txn.commit().await?;

        tracing::info!(
            store_id = %store.id,
            account_status = ?store.account_status,
            customer_quota = store.customer_quota,
            points_quota = store.points_quota,
            "store settings updated"
        );
        self.event_bus.publish(LedgerEvent::StoreSettingsChanged {
            store_id: store.id.clone(),
            name: store.name.clone(),
            account_status: store.account_status,
            timestamp: Utc::now(),
        });
        Ok(store)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::RewardPolicy;
    use crate::domain::CodeGenerator;
    use crate::persistence::MemoryStore;
    use crate::service::{LedgerService, NewInvoice};

    struct Fixture {
        stores: StoreService,
        redemption: Arc<RedemptionService>,
        invoices: Arc<InvoiceService>,
        ledger: LedgerService,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let bus = EventBus::new(100);
        let redemption = Arc::new(RedemptionService::new(
            Arc::clone(&store),
            CodeGenerator::default(),
            bus.clone(),
        ));
        let invoices = Arc::new(InvoiceService::new(
            Arc::clone(&store),
            RewardPolicy::default(),
            bus.clone(),
        ));
        Fixture {
            stores: StoreService::new(
                Arc::clone(&store),
                Arc::clone(&redemption),
                Arc::clone(&invoices),
                bus.clone(),
            ),
            redemption,
            invoices,
            ledger: LedgerService::new(store, bus),
        }
    }

    fn pune() -> NewStore {
        NewStore {
            name: "Pune Hardware".into(),
            mobile: "9822000001".into(),
            email: Some("pune@vista.in".into()),
            slug: None,
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let fx = fixture();
        let Ok(store) = fx.stores.create_store(pune()).await else {
            panic!("create failed");
        };
        assert_eq!(store.id, "9822000001");
        assert_eq!(store.slug, "pune-hardware");
        assert_eq!(store.initials, "PU");
        assert_eq!(store.account_status, StoreStatus::Active);
        assert_eq!(store.customer_quota, 500);
        assert_eq!(store.points_quota, 100_000);
    }

    #[tokio::test]
    async fn duplicate_mobile_or_name_is_refused() {
        let fx = fixture();
        let Ok(_) = fx.stores.create_store(pune()).await else {
            panic!("create failed");
        };

        let same_mobile = NewStore {
            name: "Nashik Paints".into(),
            ..pune()
        };
        assert!(matches!(
            fx.stores.create_store(same_mobile).await,
            Err(LedgerError::StoreExists(_))
        ));

        let same_name = NewStore {
            name: "pune hardware".into(),
            mobile: "9822000002".into(),
            ..pune()
        };
        assert!(matches!(
            fx.stores.create_store(same_name).await,
            Err(LedgerError::StoreExists(_))
        ));

        // The refused attempts left nothing behind.
        assert_eq!(fx.stores.list_stores().await.map(|s| s.len()).ok(), Some(1));
    }

    #[tokio::test]
    async fn malformed_input_is_refused() {
        let fx = fixture();
        let bad_mobile = NewStore {
            mobile: "98-22".into(),
            ..pune()
        };
        assert!(matches!(
            fx.stores.create_store(bad_mobile).await,
            Err(LedgerError::Validation(_))
        ));
        let bad_slug = NewStore {
            slug: Some("Pune Hardware".into()),
            ..pune()
        };
        assert!(matches!(
            fx.stores.create_store(bad_slug).await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn stats_follow_batches_and_approved_bills() {
        let fx = fixture();
        let Ok(_) = fx.stores.create_store(pune()).await else {
            panic!("create failed");
        };
        let _ = fx
            .redemption
            .create_batch(None, 50, 10, Some("Pune Hardware".into()))
            .await;
        let _ = fx
            .redemption
            .create_batch(None, 20, 5, Some("Pune Hardware".into()))
            .await;
        let _ = fx.redemption.create_batch(None, 99, 3, Some("Mumbai Tiles".into())).await;

        let _ = fx.ledger.register_member("Ramesh", None, "7777777777").await;
        let Ok(invoice) = fx
            .invoices
            .submit_invoice(NewInvoice {
                customer_id: "7777777777".into(),
                invoice_number: "1".into(),
                amount: 300.0,
                store_name: "Pune Hardware".into(),
                ..NewInvoice::default()
            })
            .await
        else {
            panic!("submit failed");
        };
        let _ = fx.invoices.approve(&invoice.id).await;

        let Ok(listed) = fx.stores.list_stores().await else {
            panic!("list failed");
        };
        let Some(overview) = listed.first() else {
            panic!("store missing");
        };
        let expected = StoreStats {
            coupons_generated: 15,
            points_generated: 600,
            bills_approved: 1,
        };
        assert_eq!(overview.stats, expected);

        let Ok(single) = fx.stores.get_store("9822000001").await else {
            panic!("get failed");
        };
        assert_eq!(single.stats, expected);
    }

    #[tokio::test]
    async fn settings_update_is_partial() {
        let fx = fixture();
        let Ok(_) = fx.stores.create_store(pune()).await else {
            panic!("create failed");
        };

        let update = StoreSettingsUpdate {
            account_status: Some(StoreStatus::Suspended),
            points_quota: Some(500_000),
            ..StoreSettingsUpdate::default()
        };
        let Ok(updated) = fx.stores.update_settings("9822000001", update).await else {
            panic!("update failed");
        };
        assert_eq!(updated.account_status, StoreStatus::Suspended);
        assert_eq!(updated.points_quota, 500_000);
        assert_eq!(updated.customer_quota, 500);
        assert_eq!(updated.slug, "pune-hardware");

        let bad_slug = StoreSettingsUpdate {
            slug: Some("Not A Slug"),
            ..StoreSettingsUpdate::default()
        };
        assert!(matches!(
            fx.stores.update_settings("9822000001", bad_slug).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            fx.stores
                .update_settings("0000000000", StoreSettingsUpdate::default())
                .await,
            Err(LedgerError::StoreNotFound(_))
        ));
    }
}
