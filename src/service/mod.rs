//! Service layer: business logic orchestration.
//!
//! Each service runs its mutations inside one [`crate::persistence::StoreTxn`]
//! and emits events through the [`super::domain::EventBus`] after commit.
//! Balance changes from every service go through the ledger's posting
//! routine, so the redemption and invoice flows share its invariants.

pub mod banner_service;
pub mod invoice_service;
pub mod ledger_service;
pub mod redemption_service;
pub mod store_service;

pub use banner_service::{BannerService, NewBanner};
pub use invoice_service::{InvoiceService, NewInvoice};
pub use ledger_service::{Direction, LedgerService};
pub use redemption_service::{RedemptionFailure, RedemptionOutcome, RedemptionService};
pub use store_service::{NewStore, StoreService, StoreSettingsUpdate};
