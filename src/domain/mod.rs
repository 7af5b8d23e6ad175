//! Domain layer: entities, code minting, and the event system.
//!
//! This module contains the loyalty domain model: members and their
//! transactions, batches of single-use codes, invoice and payout requests,
//! promo banners, partner stores, and the event bus broadcasting committed
//! changes.

pub mod banner;
pub mod batch;
pub mod event_bus;
pub mod ids;
pub mod invoice;
pub mod ledger_event;
pub mod member;
pub mod payout;
pub mod store;

pub use banner::PromoBanner;
pub use batch::{BatchStatus, CardStatus, CardType, CodeGenerator, GiftCard, LoyaltyBatch};
pub use event_bus::EventBus;
pub use invoice::{InvoiceRequest, InvoiceStatus};
pub use ledger_event::{BannerChange, LedgerEvent};
pub use member::{Member, MemberStatus, Tier, Transaction, TransactionStatus, TransactionType};
pub use payout::{PayoutRequest, PayoutStatus};
pub use store::{Store, StoreOverview, StoreStats, StoreStatus};
