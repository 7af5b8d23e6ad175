//! Domain events reflecting committed ledger mutations.
//!
//! Every committed change emits a [`LedgerEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers, who
//! filter them by topic: the member id and/or the store name involved.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::payout::PayoutStatus;
use super::store::StoreStatus;

/// What happened to a banner.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerChange {
    /// Banner was created.
    Created,
    /// Active flag flipped.
    Toggled,
    /// Banner was deleted.
    Deleted,
}

/// Domain event emitted after every committed mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A member registered.
    MemberRegistered {
        /// Member id.
        member_id: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Points were added to a member.
    PointsCredited {
        /// Member id.
        member_id: String,
        /// Points added.
        amount: u64,
        /// Balance after the credit.
        balance: u64,
        /// Store the points are attributed to.
        store_id: Option<String>,
        /// Transaction note.
        note: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Points were removed from a member.
    PointsDebited {
        /// Member id.
        member_id: String,
        /// Points removed.
        amount: u64,
        /// Balance after the debit.
        balance: u64,
        /// Store whose sub-balance was reduced.
        store_id: Option<String>,
        /// Transaction note.
        note: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A batch of codes was minted.
    BatchCreated {
        /// Batch id.
        batch_id: String,
        /// Store attribution.
        store_id: Option<String>,
        /// Codes minted.
        quantity: u32,
        /// Value of each code.
        points_per_code: u64,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A code was redeemed.
    CodeRedeemed {
        /// Code string.
        code: String,
        /// Owning batch.
        batch_id: String,
        /// Store attribution of the batch.
        store_id: Option<String>,
        /// Member credited, if any.
        member_id: Option<String>,
        /// Points granted.
        value: u64,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A member submitted a bill.
    InvoiceSubmitted {
        /// Invoice id.
        invoice_id: String,
        /// Member id.
        member_id: String,
        /// Store that issued the bill.
        store_name: String,
        /// Claimed amount.
        amount: f64,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A bill was approved and credited.
    InvoiceApproved {
        /// Invoice id.
        invoice_id: String,
        /// Member id.
        member_id: String,
        /// Store that issued the bill.
        store_name: String,
        /// Points credited.
        points: u64,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A bill was rejected.
    InvoiceRejected {
        /// Invoice id.
        invoice_id: String,
        /// Member id.
        member_id: String,
        /// Store that issued the bill.
        store_name: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A member requested a payout.
    PayoutRequested {
        /// Payout id.
        payout_id: String,
        /// Member id.
        member_id: String,
        /// Points withdrawn.
        amount: u64,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A payout was completed or rejected.
    PayoutSettled {
        /// Payout id.
        payout_id: String,
        /// Member id.
        member_id: String,
        /// Final status.
        status: PayoutStatus,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A promo banner changed.
    BannerChanged {
        /// Banner id.
        banner_id: String,
        /// Store scope of the banner.
        store_id: Option<String>,
        /// What changed.
        change: BannerChange,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A partner store was onboarded.
    StoreRegistered {
        /// Store id.
        store_id: String,
        /// Store name, the attribution key.
        name: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A store's account settings changed.
    StoreSettingsChanged {
        /// Store id.
        store_id: String,
        /// Store name, the attribution key.
        name: String,
        /// Standing after the change.
        account_status: StoreStatus,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Returns the member and store topics this event belongs to.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        let (member, store): (Option<&str>, Option<&str>) = match self {
            Self::MemberRegistered { member_id, .. }
            | Self::PayoutRequested { member_id, .. }
            | Self::PayoutSettled { member_id, .. } => (Some(member_id.as_str()), None),
            Self::PointsCredited {
                member_id,
                store_id,
                ..
            }
            | Self::PointsDebited {
                member_id,
                store_id,
                ..
            } => (Some(member_id.as_str()), store_id.as_deref()),
            Self::BatchCreated { store_id, .. } | Self::BannerChanged { store_id, .. } => {
                (None, store_id.as_deref())
            }
            Self::StoreRegistered { name, .. } | Self::StoreSettingsChanged { name, .. } => {
                (None, Some(name.as_str()))
            }
            Self::CodeRedeemed {
                member_id,
                store_id,
                ..
            } => (member_id.as_deref(), store_id.as_deref()),
            Self::InvoiceSubmitted {
                member_id,
                store_name,
                ..
            }
            | Self::InvoiceApproved {
                member_id,
                store_name,
                ..
            }
            | Self::InvoiceRejected {
                member_id,
                store_name,
                ..
            } => (Some(member_id.as_str()), Some(store_name.as_str())),
        };
        member.into_iter().chain(store).collect()
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::MemberRegistered { .. } => "member_registered",
            Self::PointsCredited { .. } => "points_credited",
            Self::PointsDebited { .. } => "points_debited",
            Self::BatchCreated { .. } => "batch_created",
            Self::CodeRedeemed { .. } => "code_redeemed",
            Self::InvoiceSubmitted { .. } => "invoice_submitted",
            Self::InvoiceApproved { .. } => "invoice_approved",
            Self::InvoiceRejected { .. } => "invoice_rejected",
            Self::PayoutRequested { .. } => "payout_requested",
            Self::PayoutSettled { .. } => "payout_settled",
            Self::BannerChanged { .. } => "banner_changed",
            Self::StoreRegistered { .. } => "store_registered",
            Self::StoreSettingsChanged { .. } => "store_settings_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_topics_include_member_and_store() {
        let event = LedgerEvent::PointsCredited {
            member_id: "7777777777".into(),
            amount: 100,
            balance: 100,
            store_id: Some("Pune Hardware".into()),
            note: "Coupon: ABCD-EFGH".into(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.topics(), vec!["7777777777", "Pune Hardware"]);
        assert_eq!(event.event_type_str(), "points_credited");
    }

    #[test]
    fn anonymous_redemption_has_store_topic_only() {
        let event = LedgerEvent::CodeRedeemed {
            code: "ABCD-EFGH".into(),
            batch_id: "B-1".into(),
            store_id: Some("Pune Hardware".into()),
            member_id: None,
            value: 50,
            timestamp: Utc::now(),
        };
        assert_eq!(event.topics(), vec!["Pune Hardware"]);
    }

    #[test]
    fn store_events_use_the_store_name_topic() {
        let event = LedgerEvent::StoreSettingsChanged {
            store_id: "9822000001".into(),
            name: "Pune Hardware".into(),
            account_status: StoreStatus::Suspended,
            timestamp: Utc::now(),
        };
        assert_eq!(event.topics(), vec!["Pune Hardware"]);
        assert_eq!(event.event_type_str(), "store_settings_changed");
    }

    #[test]
    fn serializes_with_tag() {
        let event = LedgerEvent::PayoutSettled {
            payout_id: "PR-1".into(),
            member_id: "7777777777".into(),
            status: PayoutStatus::Rejected,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"payout_settled\""));
        assert!(json.contains("\"status\":\"Rejected\""));
    }
}
