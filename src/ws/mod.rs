//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams ledger events filtered by topic
//! (member id or store name) and accepts balance lookups and redemptions
//! as commands.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
