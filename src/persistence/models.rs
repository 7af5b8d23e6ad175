//! Collection names and the stored document shape.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A logical collection of JSON documents keyed by entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// [`crate::domain::Member`] keyed by member id.
    Members,
    /// [`crate::domain::LoyaltyBatch`] (codes embedded) keyed by batch id.
    Batches,
    /// Code string to owning batch id.
    CodeIndex,
    /// [`crate::domain::InvoiceRequest`] keyed by invoice id.
    Invoices,
    /// [`crate::domain::PayoutRequest`] keyed by payout id.
    Payouts,
    /// [`crate::domain::PromoBanner`] keyed by banner id.
    Banners,
    /// [`crate::domain::Store`] keyed by admin mobile number.
    Stores,
    /// Lower-cased store name to store id.
    StoreNames,
}

impl Collection {
    /// Every collection, in storage order.
    pub const ALL: [Self; 8] = [
        Self::Members,
        Self::Batches,
        Self::CodeIndex,
        Self::Invoices,
        Self::Payouts,
        Self::Banners,
        Self::Stores,
        Self::StoreNames,
    ];

    /// Returns the collection name used as a storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::Batches => "batches",
            Self::CodeIndex => "code_index",
            Self::Invoices => "invoices",
            Self::Payouts => "payouts",
            Self::Banners => "banners",
            Self::Stores => "stores",
            Self::StoreNames => "store_names",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of the [`Collection::CodeIndex`] collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeIndexEntry {
    /// The code itself, also the document key.
    pub code: String,
    /// Batch that owns the code.
    pub batch_id: String,
}

/// Entry of the [`Collection::StoreNames`] collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreNameEntry {
    /// The store name as registered.
    pub name: String,
    /// Store holding the name.
    pub store_id: String,
}

/// Full contents of a store: collection to id to document.
pub type Snapshot = BTreeMap<Collection, BTreeMap<String, serde_json::Value>>;
