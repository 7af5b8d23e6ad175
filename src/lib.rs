//! # vista-ledger
//!
//! Points ledger, single-use code redemption and invoice approval for a
//! B2B loyalty program.
//!
//! Stores mint batches of sticker codes and review customer bills; members
//! redeem codes or get bills approved to earn points, and withdraw points
//! as cash payouts. Every balance change goes through one posting routine
//! inside a storage transaction, which keeps three invariants: balances
//! never go negative, a code is redeemed at most once, and a redemption
//! or approval credits exactly once.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── LedgerService · RedemptionService
//!     ├── InvoiceService · BannerService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     └── DocumentStore (persistence/)
//!           ├── MemoryStore (+ JSON snapshot file)
//!           └── PostgresStore (JSONB, row locks)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
