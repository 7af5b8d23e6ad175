//! Members and their ledger transactions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account state of a member. Members are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum MemberStatus {
    /// Normal account.
    #[default]
    Active,
    /// Dormant account.
    Inactive,
    /// Blocked by an administrator.
    Banned,
}

/// Loyalty tier. Derived outside the ledger and never changed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum Tier {
    /// Entry tier.
    #[default]
    Bronze,
    /// Second tier.
    Silver,
    /// Third tier.
    Gold,
    /// Top tier.
    Platinum,
}

/// Direction of a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Points added to the balance.
    Credit,
    /// Points removed from the balance.
    Debit,
}

/// Processing state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum TransactionStatus {
    /// Settled.
    #[default]
    Success,
    /// Debited, awaiting an external settlement (payouts).
    Processing,
    /// Recorded as failed.
    Failed,
}

/// Immutable record of one balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Unique, time-derived identifier.
    pub id: String,
    /// When the change was applied.
    pub date: DateTime<Utc>,
    /// Points moved; always positive.
    pub amount: u64,
    /// Credit or debit.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free-form description, e.g. `Coupon: ABCD-EFGH`.
    pub note: String,
    /// Processing state.
    pub status: TransactionStatus,
}

/// A registered end-customer and their ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Member {
    /// Stable identifier (the registration phone number).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email, possibly empty.
    #[serde(default)]
    pub email: String,
    /// Mobile number used for login and lookups.
    pub phone: String,
    /// Registration timestamp.
    pub joined_at: DateTime<Utc>,
    /// Account state.
    #[serde(default)]
    pub status: MemberStatus,
    /// Spendable points.
    pub points_balance: u64,
    /// Total points ever earned.
    pub lifetime_points: u64,
    /// Informational tier.
    #[serde(default)]
    pub tier: Tier,
    /// Points attributed to each partner store.
    #[serde(default)]
    pub store_balances: BTreeMap<String, u64>,
    /// Transactions, most recent first.
    #[serde(default)]
    pub history: Vec<Transaction>,
    /// Last UPI id used for a payout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

impl Member {
    /// Creates a member with zero balances and an empty history.
    #[must_use]
    pub fn new(phone: String, name: String, email: String) -> Self {
        Self {
            id: phone.clone(),
            name,
            email,
            phone,
            joined_at: Utc::now(),
            status: MemberStatus::Active,
            points_balance: 0,
            lifetime_points: 0,
            tier: Tier::Bronze,
            store_balances: BTreeMap::new(),
            history: Vec::new(),
            upi_id: None,
        }
    }

    /// Returns `true` if `key` is this member's id or phone number.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.phone == key
    }

    /// Net points according to the history: credits minus debits.
    #[must_use]
    pub fn history_net(&self) -> i128 {
        self.history
            .iter()
            .map(|t| match t.kind {
                TransactionType::Credit => i128::from(t.amount),
                TransactionType::Debit => -i128::from(t.amount),
            })
            .sum()
    }

    /// Returns `true` if the balance equals the net of the history.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.history_net() == i128::from(self.points_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(amount: u64, kind: TransactionType) -> Transaction {
        Transaction {
            id: format!("TXN-{amount}"),
            date: Utc::now(),
            amount,
            kind,
            note: String::new(),
            status: TransactionStatus::Success,
        }
    }

    #[test]
    fn new_member_is_empty_and_reconciled() {
        let m = Member::new("7777777777".into(), "Ramesh".into(), String::new());
        assert_eq!(m.id, "7777777777");
        assert_eq!(m.points_balance, 0);
        assert!(m.history.is_empty());
        assert!(m.is_reconciled());
    }

    #[test]
    fn reconciliation_detects_drift() {
        let mut m = Member::new("1".into(), "A".into(), String::new());
        m.history = vec![
            txn(40, TransactionType::Debit),
            txn(100, TransactionType::Credit),
        ];
        m.points_balance = 60;
        assert!(m.is_reconciled());
        m.points_balance = 70;
        assert!(!m.is_reconciled());
    }

    #[test]
    fn transaction_type_wire_format() {
        let json = serde_json::to_string(&txn(5, TransactionType::Credit)).unwrap_or_default();
        assert!(json.contains("\"type\":\"CREDIT\""));
        assert!(json.contains("\"status\":\"Success\""));
    }

    #[test]
    fn matches_id_or_phone() {
        let mut m = Member::new("9876543211".into(), "Suresh".into(), String::new());
        m.id = "L102".into();
        assert!(m.matches("L102"));
        assert!(m.matches("9876543211"));
        assert!(!m.matches("L101"));
    }
}
