//! Ledger service: member balances, transaction history and payouts.
//!
//! [`post_entry`] is the single routine that changes `points_balance`,
//! `lifetime_points` or `store_balances`. The redemption and invoice
//! services call it inside their own transactions, so a balance change and
//! the state flip that caused it commit together.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ids::{IdPrefix, new_id};
use crate::domain::payout::validate_upi_id;
use crate::domain::{
    EventBus, LedgerEvent, Member, PayoutRequest, PayoutStatus, Transaction, TransactionStatus,
    TransactionType,
};
use crate::error::LedgerError;
use crate::persistence::{self, Collection, DocumentStore, StoreTxn};

/// Direction of a manual point adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Credit the member.
    Add,
    /// Debit the member.
    Redeem,
}

/// How a posting affects the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    /// Credit that counts toward lifetime points.
    Earn,
    /// Debit; refused when it exceeds the balance.
    Spend,
    /// Credit that restores previously debited points; lifetime unchanged.
    Refund,
}

impl From<Direction> for EntryKind {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Add => Self::Earn,
            Direction::Redeem => Self::Spend,
        }
    }
}

/// One balance change to post.
#[derive(Debug, Clone)]
pub(crate) struct LedgerEntry {
    pub member_key: String,
    pub amount: u64,
    pub kind: EntryKind,
    pub note: String,
    pub store_id: Option<String>,
    pub status: TransactionStatus,
    pub id_prefix: IdPrefix,
}

impl LedgerEntry {
    pub(crate) fn new(member_key: &str, amount: u64, kind: EntryKind, note: String) -> Self {
        Self {
            member_key: member_key.to_string(),
            amount,
            kind,
            note,
            store_id: None,
            status: TransactionStatus::Success,
            id_prefix: IdPrefix::Transaction,
        }
    }

    pub(crate) fn with_store(mut self, store_id: Option<String>) -> Self {
        self.store_id = store_id;
        self
    }
}

/// Result of a posting: the member as written and the appended transaction.
#[derive(Debug, Clone)]
pub(crate) struct Posting {
    pub member: Member,
    pub transaction: Transaction,
    pub event: LedgerEvent,
}

/// Converts a caller-supplied point amount into a positive integer.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for zero or negative amounts.
pub fn positive_points(amount: i64) -> Result<u64, LedgerError> {
    match u64::try_from(amount) {
        Ok(points) if points > 0 => Ok(points),
        _ => Err(LedgerError::InvalidAmount(format!(
            "points must be a positive integer, got {amount}"
        ))),
    }
}

/// Trims a store attribution; blank means none.
pub(crate) fn normalize_store(store_id: Option<String>) -> Option<String> {
    store_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Mobile numbers are 6 to 15 ASCII digits.
pub(crate) fn check_phone(phone: &str) -> Result<(), LedgerError> {
    if (6..=15).contains(&phone.len()) && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!(
            "phone must be 6 to 15 digits, got {phone:?}"
        )))
    }
}

/// Loads and locks a member by id, falling back to a phone-number scan.
pub(crate) async fn resolve_member(
    txn: &mut dyn StoreTxn,
    key: &str,
) -> Result<Member, LedgerError> {
    if let Some(member) = persistence::load::<Member>(txn, Collection::Members, key).await? {
        return Ok(member);
    }
    let by_phone = persistence::load_all::<Member>(txn, Collection::Members)
        .await?
        .into_iter()
        .find(|m| m.phone == key);
    match by_phone {
        // Re-read through the keyed path so the row is locked.
        Some(found) => persistence::load::<Member>(txn, Collection::Members, &found.id)
            .await?
            .ok_or_else(|| LedgerError::MemberNotFound(key.to_string())),
        None => Err(LedgerError::MemberNotFound(key.to_string())),
    }
}

/// Applies one entry to a member inside `txn` and stages the write.
///
/// This is the only code path that mutates a member's balances.
pub(crate) async fn post_entry(
    txn: &mut dyn StoreTxn,
    entry: LedgerEntry,
) -> Result<Posting, LedgerError> {
    if entry.amount == 0 {
        return Err(LedgerError::InvalidAmount(
            "points must be a positive integer, got 0".to_string(),
        ));
    }
    let mut member = resolve_member(txn, &entry.member_key).await?;
    let amount = entry.amount;

    let kind = match entry.kind {
        EntryKind::Earn | EntryKind::Refund => {
            member.points_balance = member
                .points_balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::InvalidAmount("balance overflow".to_string()))?;
            if entry.kind == EntryKind::Earn {
                member.lifetime_points = member.lifetime_points.saturating_add(amount);
            }
            if let Some(store) = &entry.store_id {
                let sub = member.store_balances.entry(store.clone()).or_insert(0);
                *sub = sub.saturating_add(amount);
            }
            TransactionType::Credit
        }
        EntryKind::Spend => {
            if amount > member.points_balance {
                return Err(LedgerError::InsufficientBalance {
                    requested: amount,
                    available: member.points_balance,
                });
            }
            member.points_balance -= amount;
            if let Some(store) = &entry.store_id {
                let sub = member.store_balances.entry(store.clone()).or_insert(0);
                *sub = sub.saturating_sub(amount);
            }
            TransactionType::Debit
        }
    };

    let now = Utc::now();
    let transaction = Transaction {
        id: new_id(entry.id_prefix),
        date: now,
        amount,
        kind,
        note: entry.note,
        status: entry.status,
    };
    member.history.insert(0, transaction.clone());
    persistence::save(txn, Collection::Members, &member.id, &member).await?;

    let event = match kind {
        TransactionType::Credit => LedgerEvent::PointsCredited {
            member_id: member.id.clone(),
            amount,
            balance: member.points_balance,
            store_id: entry.store_id,
            note: transaction.note.clone(),
            timestamp: now,
        },
        TransactionType::Debit => LedgerEvent::PointsDebited {
            member_id: member.id.clone(),
            amount,
            balance: member.points_balance,
            store_id: entry.store_id,
            note: transaction.note.clone(),
            timestamp: now,
        },
    };

    Ok(Posting {
        member,
        transaction,
        event,
    })
}

/// Orchestration layer for member balances and payouts.
///
/// Every mutation follows the pattern: begin transaction → resolve and lock
/// the member → post through [`post_entry`] → commit → emit events.
#[derive(Debug, Clone)]
pub struct LedgerService {
    store: Arc<dyn DocumentStore>,
    event_bus: EventBus,
}

impl LedgerService {
    /// Creates a new `LedgerService`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns all members ordered by registration time.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] on adapter failure.
    pub async fn get_all_members(&self) -> Result<Vec<Member>, LedgerError> {
        let mut members: Vec<Member> =
            persistence::fetch_all(self.store.as_ref(), Collection::Members).await?;
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    /// Returns the member registered with `phone`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MemberNotFound`] if no member has that phone.
    pub async fn get_member_by_phone(&self, phone: &str) -> Result<Member, LedgerError> {
        let phone = phone.trim();
        let members: Vec<Member> =
            persistence::fetch_all(self.store.as_ref(), Collection::Members).await?;
        members
            .into_iter()
            .find(|m| m.phone == phone)
            .ok_or_else(|| LedgerError::MemberNotFound(phone.to_string()))
    }

    /// Returns the member with id or phone `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MemberNotFound`] if nothing matches.
    pub async fn get_member(&self, key: &str) -> Result<Member, LedgerError> {
        let key = key.trim();
        if let Some(member) =
            persistence::fetch::<Member>(self.store.as_ref(), Collection::Members, key).await?
        {
            return Ok(member);
        }
        self.get_member_by_phone(key).await
    }

    /// Registers a member with zero balances. The phone number becomes the id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] for a blank name or a phone that
    /// is not 6 to 15 digits, and [`LedgerError::MemberExists`] if the phone
    /// is already registered.
    pub async fn register_member(
        &self,
        name: &str,
        email: Option<&str>,
        phone: &str,
    ) -> Result<Member, LedgerError> {
        let name = name.trim();
        let phone = phone.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("member name is required".to_string()));
        }
        check_phone(phone)?;

        let member = Member::new(
            phone.to_string(),
            name.to_string(),
            email.map(str::trim).unwrap_or_default().to_string(),
        );
        let mut txn = self.store.begin().await?;
        // Members imported under another id are only found by phone.
        let existing = persistence::load_all::<Member>(txn.as_mut(), Collection::Members).await?;
        if existing.iter().any(|m| m.matches(phone))
            || !persistence::insert(txn.as_mut(), Collection::Members, &member.id, &member).await?
        {
            return Err(LedgerError::MemberExists(phone.to_string()));
        }
        txn.commit().await?;

        self.event_bus.publish(LedgerEvent::MemberRegistered {
            member_id: member.id.clone(),
            timestamp: member.joined_at,
        });
        tracing::info!(member_id = %member.id, "member registered");
        Ok(member)
    }

    /// Credits or debits a member and returns the updated member.
    ///
    /// With a store attribution the store's sub-balance moves by the same
    /// signed amount, floored at zero on debit. A blank note falls back to
    /// `Points Added` / `Redemption`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`], [`LedgerError::MemberNotFound`]
    /// or [`LedgerError::InsufficientBalance`]; the member is unchanged on error.
    pub async fn adjust_points(
        &self,
        member_id: &str,
        amount: i64,
        direction: Direction,
        note: Option<String>,
        store_id: Option<String>,
    ) -> Result<Member, LedgerError> {
        let amount = positive_points(amount)?;
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| match direction {
                Direction::Add => "Points Added".to_string(),
                Direction::Redeem => "Redemption".to_string(),
            });
        let entry = LedgerEntry::new(member_id.trim(), amount, direction.into(), note)
            .with_store(normalize_store(store_id));

        let mut txn = self.store.begin().await?;
        let posting = post_entry(txn.as_mut(), entry).await?;
        txn.commit().await?;

        tracing::info!(
            member_id = %posting.member.id,
            amount,
            ?direction,
            balance = posting.member.points_balance,
            "points adjusted"
        );
        self.event_bus.publish(posting.event);
        Ok(posting.member)
    }

    /// Debits `amount` immediately and files a pending payout request.
    ///
    /// The debit transaction (`Payout to <upi_id>`, status `Processing`) and
    /// the payout record commit together or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] for a malformed UPI id,
    /// [`LedgerError::InvalidAmount`], [`LedgerError::MemberNotFound`] or
    /// [`LedgerError::InsufficientBalance`].
    pub async fn request_payout(
        &self,
        member_id: &str,
        amount: i64,
        upi_id: &str,
    ) -> Result<Transaction, LedgerError> {
        let amount = positive_points(amount)?;
        let upi_id = upi_id.trim();
        validate_upi_id(upi_id).map_err(LedgerError::Validation)?;

        let mut entry = LedgerEntry::new(
            member_id.trim(),
            amount,
            EntryKind::Spend,
            format!("Payout to {upi_id}"),
        );
        entry.status = TransactionStatus::Processing;
        entry.id_prefix = IdPrefix::PayoutTransaction;

        let mut txn = self.store.begin().await?;
        let Posting {
            mut member,
            transaction,
            event,
        } = post_entry(txn.as_mut(), entry).await?;

        member.upi_id = Some(upi_id.to_string());
        persistence::save(txn.as_mut(), Collection::Members, &member.id, &member).await?;

        let payout = PayoutRequest {
            id: new_id(IdPrefix::Payout),
            user_id: member.id.clone(),
            user_name: member.name.clone(),
            amount,
            upi_id: upi_id.to_string(),
            date: transaction.date,
            status: PayoutStatus::Pending,
            transaction_id: transaction.id.clone(),
            settled_at: None,
        };
        persistence::create(txn.as_mut(), Collection::Payouts, &payout.id, &payout).await?;
        txn.commit().await?;

        tracing::info!(
            member_id = %member.id,
            payout_id = %payout.id,
            amount,
            "payout requested"
        );
        self.event_bus.publish_all([
            event,
            LedgerEvent::PayoutRequested {
                payout_id: payout.id,
                member_id: member.id,
                amount,
                timestamp: transaction.date,
            },
        ]);
        Ok(transaction)
    }

    /// Returns payout requests, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] on adapter failure.
    pub async fn list_payouts(
        &self,
        status: Option<PayoutStatus>,
    ) -> Result<Vec<PayoutRequest>, LedgerError> {
        let mut payouts: Vec<PayoutRequest> =
            persistence::fetch_all(self.store.as_ref(), Collection::Payouts).await?;
        payouts.retain(|p| status.is_none_or(|s| p.status == s));
        payouts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(payouts)
    }

    /// Marks a pending payout as transferred.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PayoutNotFound`] or [`LedgerError::InvalidState`]
    /// if the payout is no longer pending.
    pub async fn complete_payout(&self, payout_id: &str) -> Result<PayoutRequest, LedgerError> {
        let mut txn = self.store.begin().await?;
        let mut payout = load_pending_payout(txn.as_mut(), payout_id).await?;

        payout.status = PayoutStatus::Completed;
        payout.settled_at = Some(Utc::now());
        persistence::save(txn.as_mut(), Collection::Payouts, &payout.id, &payout).await?;
        txn.commit().await?;

        tracing::info!(payout_id = %payout.id, "payout completed");
        self.event_bus.publish(settled_event(&payout));
        Ok(payout)
    }

    /// Rejects a pending payout and credits the withdrawn points back.
    ///
    /// The reversal is a `CREDIT` noted `Payout reversal: <payout id>` that
    /// restores the balance without counting toward lifetime points.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PayoutNotFound`], [`LedgerError::InvalidState`]
    /// if the payout is no longer pending, or [`LedgerError::MemberNotFound`].
    pub async fn reject_payout(&self, payout_id: &str) -> Result<PayoutRequest, LedgerError> {
        let mut txn = self.store.begin().await?;
        let mut payout = load_pending_payout(txn.as_mut(), payout_id).await?;

        let entry = LedgerEntry::new(
            &payout.user_id,
            payout.amount,
            EntryKind::Refund,
            format!("Payout reversal: {}", payout.id),
        );
        let posting = post_entry(txn.as_mut(), entry).await?;

        payout.status = PayoutStatus::Rejected;
        payout.settled_at = Some(Utc::now());
        persistence::save(txn.as_mut(), Collection::Payouts, &payout.id, &payout).await?;
        txn.commit().await?;

        tracing::info!(
            payout_id = %payout.id,
            member_id = %posting.member.id,
            amount = payout.amount,
            "payout rejected and reversed"
        );
        self.event_bus
            .publish_all([posting.event, settled_event(&payout)]);
        Ok(payout)
    }
}

async fn load_pending_payout(
    txn: &mut dyn StoreTxn,
    payout_id: &str,
) -> Result<PayoutRequest, LedgerError> {
    let payout = persistence::load::<PayoutRequest>(txn, Collection::Payouts, payout_id)
        .await?
        .ok_or_else(|| LedgerError::PayoutNotFound(payout_id.to_string()))?;
    if payout.status != PayoutStatus::Pending {
        return Err(LedgerError::InvalidState(format!(
            "payout {} is {:?}",
            payout.id, payout.status
        )));
    }
    Ok(payout)
}

fn settled_event(payout: &PayoutRequest) -> LedgerEvent {
    LedgerEvent::PayoutSettled {
        payout_id: payout.id.clone(),
        member_id: payout.user_id.clone(),
        status: payout.status,
        timestamp: payout.settled_at.unwrap_or_else(Utc::now),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    async fn make_service() -> LedgerService {
        let service = LedgerService::new(Arc::new(MemoryStore::new()), EventBus::new(100));
        let Ok(_) = service
            .register_member("Ramesh Carpenter", Some("ramesh@gmail.com"), "7777777777")
            .await
        else {
            panic!("registration failed");
        };
        service
    }

    #[tokio::test]
    async fn credit_updates_balance_lifetime_and_store() {
        let service = make_service().await;
        let Ok(member) = service
            .adjust_points(
                "7777777777",
                450,
                Direction::Add,
                Some("Bill #9988 Approved".into()),
                Some("Pune Hardware".into()),
            )
            .await
        else {
            panic!("credit failed");
        };
        assert_eq!(member.points_balance, 450);
        assert_eq!(member.lifetime_points, 450);
        assert_eq!(member.store_balances.get("Pune Hardware"), Some(&450));
        assert_eq!(member.history.len(), 1);
        assert!(member.is_reconciled());
    }

    #[tokio::test]
    async fn debit_floors_store_balance_and_keeps_lifetime() {
        let service = make_service().await;
        let _ = service
            .adjust_points("7777777777", 100, Direction::Add, None, Some("Pune".into()))
            .await;
        let _ = service
            .adjust_points("7777777777", 100, Direction::Add, None, None)
            .await;

        let Ok(member) = service
            .adjust_points("7777777777", 150, Direction::Redeem, None, Some("Pune".into()))
            .await
        else {
            panic!("debit failed");
        };
        assert_eq!(member.points_balance, 50);
        assert_eq!(member.lifetime_points, 200);
        assert_eq!(member.store_balances.get("Pune"), Some(&0));
        assert_eq!(
            member.history.first().map(|t| (t.kind, t.note.as_str())),
            Some((TransactionType::Debit, "Redemption"))
        );
        assert!(member.is_reconciled());
    }

    #[tokio::test]
    async fn overdraft_is_refused_without_side_effects() {
        let service = make_service().await;
        let _ = service
            .adjust_points("7777777777", 100, Direction::Add, None, None)
            .await;

        let result = service
            .adjust_points("7777777777", 150, Direction::Redeem, None, None)
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                requested: 150,
                available: 100
            })
        ));

        let Ok(member) = service.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 100);
        assert_eq!(member.history.len(), 1);
    }

    #[tokio::test]
    async fn invalid_amounts_and_unknown_members() {
        let service = make_service().await;
        for amount in [0, -5] {
            let result = service
                .adjust_points("7777777777", amount, Direction::Add, None, None)
                .await;
            assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
        }
        let result = service
            .adjust_points("0000000000", 10, Direction::Add, None, None)
            .await;
        assert!(matches!(result, Err(LedgerError::MemberNotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_registration_is_refused() {
        let service = make_service().await;
        let again = service.register_member("Someone", None, "7777777777").await;
        assert!(matches!(again, Err(LedgerError::MemberExists(_))));

        let bad_phone = service.register_member("Someone", None, "77-77").await;
        assert!(matches!(bad_phone, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn payout_debits_and_files_request() {
        let service = make_service().await;
        let _ = service
            .adjust_points("7777777777", 300, Direction::Add, None, None)
            .await;

        let Ok(txn) = service.request_payout("7777777777", 200, "ramesh@upi").await else {
            panic!("payout failed");
        };
        assert_eq!(txn.kind, TransactionType::Debit);
        assert_eq!(txn.status, TransactionStatus::Processing);
        assert_eq!(txn.note, "Payout to ramesh@upi");
        assert!(txn.id.starts_with("PAY-"));

        let Ok(member) = service.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 100);
        assert_eq!(member.upi_id.as_deref(), Some("ramesh@upi"));

        let pending = service
            .list_payouts(Some(PayoutStatus::Pending))
            .await
            .unwrap_or_default();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.first().map(|p| p.transaction_id.as_str()), Some(txn.id.as_str()));
    }

    #[tokio::test]
    async fn payout_validation_leaves_no_record() {
        let service = make_service().await;
        let _ = service
            .adjust_points("7777777777", 50, Direction::Add, None, None)
            .await;

        let bad_upi = service.request_payout("7777777777", 10, "ramesh").await;
        assert!(matches!(bad_upi, Err(LedgerError::Validation(_))));

        let overdraft = service.request_payout("7777777777", 60, "ramesh@upi").await;
        assert!(matches!(overdraft, Err(LedgerError::InsufficientBalance { .. })));

        assert!(service.list_payouts(None).await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn rejected_payout_is_reversed_once() {
        let service = make_service().await;
        let _ = service
            .adjust_points("7777777777", 100, Direction::Add, None, None)
            .await;
        let _ = service.request_payout("7777777777", 100, "x@upi").await;

        let payouts = service.list_payouts(None).await.unwrap_or_default();
        let Some(payout_id) = payouts.first().map(|p| p.id.clone()) else {
            panic!("payout missing");
        };

        let Ok(rejected) = service.reject_payout(&payout_id).await else {
            panic!("reject failed");
        };
        assert_eq!(rejected.status, PayoutStatus::Rejected);

        let Ok(member) = service.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 100);
        assert_eq!(member.lifetime_points, 100);
        assert_eq!(member.history.len(), 3);
        assert!(member.is_reconciled());

        let again = service.reject_payout(&payout_id).await;
        assert!(matches!(again, Err(LedgerError::InvalidState(_))));
        let complete = service.complete_payout(&payout_id).await;
        assert!(matches!(complete, Err(LedgerError::InvalidState(_))));
    }

    #[tokio::test]
    async fn completed_payout_keeps_debit() {
        let service = make_service().await;
        let _ = service
            .adjust_points("7777777777", 100, Direction::Add, None, None)
            .await;
        let _ = service.request_payout("7777777777", 40, "x@upi").await;
        let payouts = service.list_payouts(None).await.unwrap_or_default();
        let Some(payout_id) = payouts.first().map(|p| p.id.clone()) else {
            panic!("payout missing");
        };

        let Ok(done) = service.complete_payout(&payout_id).await else {
            panic!("complete failed");
        };
        assert_eq!(done.status, PayoutStatus::Completed);
        assert!(done.settled_at.is_some());

        let Ok(member) = service.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 60);
        assert!(service.complete_payout("PR-missing").await.is_err());
    }

    #[tokio::test]
    async fn credit_emits_event() {
        let service = make_service().await;
        let mut rx = service.event_bus.subscribe();
        let _ = service
            .adjust_points("7777777777", 10, Direction::Add, None, None)
            .await;
        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "points_credited");
    }
}
