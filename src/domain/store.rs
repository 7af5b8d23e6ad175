//! Partner stores and their account settings.
//!
//! A store's display name is the attribution key used everywhere else in
//! the ledger: batch `store_id`, invoice `store_name`, member sub-balances
//! and banner scope all carry it verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Members a new store may enroll.
pub const DEFAULT_CUSTOMER_QUOTA: u32 = 500;

/// Points a new store may issue.
pub const DEFAULT_POINTS_QUOTA: u64 = 100_000;

/// Whether a store account is in good standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum StoreStatus {
    /// Operating normally.
    #[default]
    Active,
    /// Blocked by the super-admin.
    Suspended,
}

/// A partner store, keyed by its admin's mobile number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Store {
    /// Admin mobile number, also the store id.
    pub id: String,
    /// Display name and attribution key.
    pub name: String,
    /// Admin mobile number.
    pub mobile: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Two-letter badge shown in the admin UI.
    pub initials: String,
    /// URL-safe handle.
    pub slug: String,
    /// Account standing.
    pub account_status: StoreStatus,
    /// Members the store may enroll.
    pub customer_quota: u32,
    /// Points the store may issue.
    pub points_quota: u64,
    /// Onboarding time.
    pub created_at: DateTime<Utc>,
}

/// Activity figures derived from batches and invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct StoreStats {
    /// Codes minted for the store.
    pub coupons_generated: u64,
    /// Face value of those codes.
    pub points_generated: u64,
    /// Bills from the store that were approved.
    pub bills_approved: u64,
}

/// A store with its activity figures, as listed to the super-admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoreOverview {
    /// The store record.
    #[serde(flatten)]
    pub store: Store,
    /// Activity figures.
    pub stats: StoreStats,
}

/// Lower-case, hyphen-separated handle derived from a display name.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Returns `true` for a non-empty slug of lower-case letters, digits and
/// single inner hyphens.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// First two characters of the name, upper-cased.
#[must_use]
pub fn initials(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}
