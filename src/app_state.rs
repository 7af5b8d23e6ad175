//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::{CodePolicy, LedgerConfig, RewardPolicy};
use crate::domain::{CodeGenerator, EventBus};
use crate::persistence::DocumentStore;
use crate::service::{BannerService, InvoiceService, LedgerService, RedemptionService, StoreService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Member balances and payouts.
    pub ledger: Arc<LedgerService>,
    /// Batches and code redemption.
    pub redemption: Arc<RedemptionService>,
    /// Invoice review.
    pub invoices: Arc<InvoiceService>,
    /// Promo banners.
    pub banners: Arc<BannerService>,
    /// Partner stores.
    pub stores: Arc<StoreService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Code policy, reported by `/config/rewards`.
    pub codes: CodePolicy,
}

impl AppState {
    /// Wires every service over one store and one event bus.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        reward: RewardPolicy,
        codes: CodePolicy,
        event_bus: EventBus,
    ) -> Self {
        let redemption = Arc::new(RedemptionService::new(
            Arc::clone(&store),
            CodeGenerator::new(codes.clone()),
            event_bus.clone(),
        ));
        let invoices = Arc::new(InvoiceService::new(
            Arc::clone(&store),
            reward,
            event_bus.clone(),
        ));
        Self {
            ledger: Arc::new(LedgerService::new(Arc::clone(&store), event_bus.clone())),
            stores: Arc::new(StoreService::new(
                Arc::clone(&store),
                Arc::clone(&redemption),
                Arc::clone(&invoices),
                event_bus.clone(),
            )),
            banners: Arc::new(BannerService::new(store, event_bus.clone())),
            redemption,
            invoices,
            event_bus,
            codes,
        }
    }

    /// Builds the state from a loaded configuration.
    #[must_use]
    pub fn from_config(store: Arc<dyn DocumentStore>, config: &LedgerConfig) -> Self {
        Self::new(
            store,
            config.reward,
            config.codes.clone(),
            EventBus::new(config.event_bus_capacity),
        )
    }

    /// Returns the reward policy in force.
    #[must_use]
    pub fn reward(&self) -> RewardPolicy {
        self.invoices.reward()
    }
}
