//! Batch minting and single-use code redemption.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::ledger_service::{EntryKind, LedgerEntry, normalize_store, positive_points, post_entry};
use crate::domain::{BatchStatus, CardStatus, CodeGenerator, EventBus, LedgerEvent, LoyaltyBatch};
use crate::error::{ErrorKind, LedgerError};
use crate::persistence::{self, CodeIndexEntry, Collection, DocumentStore};

/// Why a redemption was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionFailure {
    /// No such code.
    CodeNotFound,
    /// Code belongs to another store.
    WrongStore,
    /// Code was redeemed before.
    AlreadyRedeemed,
    /// Code is past its validity.
    CodeExpired,
    /// The member to credit does not exist.
    MemberNotFound,
    /// Any other refusal.
    Rejected,
}

impl RedemptionFailure {
    fn of(err: &LedgerError) -> Self {
        match err {
            LedgerError::CodeNotFound(_) => Self::CodeNotFound,
            LedgerError::WrongStore { .. } => Self::WrongStore,
            LedgerError::AlreadyRedeemed(_) => Self::AlreadyRedeemed,
            LedgerError::CodeExpired(_) => Self::CodeExpired,
            LedgerError::MemberNotFound(_) => Self::MemberNotFound,
            _ => Self::Rejected,
        }
    }

    fn message(self, err: &LedgerError) -> String {
        match self {
            Self::CodeNotFound => "Invalid code.".to_string(),
            Self::WrongStore => "Invalid store for this coupon.".to_string(),
            Self::AlreadyRedeemed => "Code already Redeemed.".to_string(),
            Self::CodeExpired => "Code already Expired.".to_string(),
            Self::MemberNotFound | Self::Rejected => err.to_string(),
        }
    }
}

/// Result of a redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RedemptionOutcome {
    /// `true` if the code was consumed.
    pub success: bool,
    /// Points granted; zero on failure.
    pub value: u64,
    /// Human-readable outcome.
    pub message: String,
    /// Machine-readable failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RedemptionFailure>,
}

impl RedemptionOutcome {
    fn redeemed(value: u64) -> Self {
        Self {
            success: true,
            value,
            message: "Success!".to_string(),
            reason: None,
        }
    }

    fn refused(err: &LedgerError) -> Self {
        let reason = RedemptionFailure::of(err);
        Self {
            success: false,
            value: 0,
            message: reason.message(err),
            reason: Some(reason),
        }
    }
}

/// Mints batches and consumes codes.
#[derive(Debug, Clone)]
pub struct RedemptionService {
    store: Arc<dyn DocumentStore>,
    generator: CodeGenerator,
    event_bus: EventBus,
}

impl RedemptionService {
    /// Creates a new `RedemptionService`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, generator: CodeGenerator, event_bus: EventBus) -> Self {
        Self {
            store,
            generator,
            event_bus,
        }
    }

    /// Mints a batch of `quantity` unique codes worth `points_per_code` each.
    ///
    /// Codes already present anywhere in the system are redrawn. A blank
    /// name defaults to `Batch <date>`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] for a non-positive value,
    /// [`LedgerError::Validation`] for a quantity outside `1..=max` or an
    /// unrepresentable expiry date, and [`LedgerError::InvalidState`] if a
    /// concurrent batch claimed one of the drawn codes first.
    pub async fn create_batch(
        &self,
        name: Option<String>,
        points_per_code: i64,
        quantity: i64,
        store_id: Option<String>,
    ) -> Result<LoyaltyBatch, LedgerError> {
        let points_per_code = positive_points(points_per_code)?;
        let max = self.generator.policy().max_batch_quantity;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| (1..=max).contains(q))
            .ok_or_else(|| {
                LedgerError::Validation(format!("quantity must be between 1 and {max}, got {quantity}"))
            })?;
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Batch {}", Utc::now().format("%Y-%m-%d")));
        let store_id = normalize_store(store_id);

        let mut txn = self.store.begin().await?;
        let existing: HashSet<String> =
            persistence::load_all::<CodeIndexEntry>(txn.as_mut(), Collection::CodeIndex)
                .await?
                .into_iter()
                .map(|entry| entry.code)
                .collect();

        let free = self.generator.code_space().saturating_sub(existing.len() as u128);
        if u128::from(quantity) > free {
            return Err(LedgerError::Validation(format!(
                "only {free} unused codes remain for this alphabet, {quantity} requested"
            )));
        }

        let batch = self.generator.mint(name, points_per_code, quantity, store_id, |code| {
            existing.contains(code)
        })?;

        persistence::create(txn.as_mut(), Collection::Batches, &batch.id, &batch).await?;
        for card in &batch.codes {
            let entry = CodeIndexEntry {
                code: card.code.clone(),
                batch_id: batch.id.clone(),
            };
            // Another batch committed the same code after our scan.
            if !persistence::insert(txn.as_mut(), Collection::CodeIndex, &card.code, &entry).await? {
                return Err(LedgerError::InvalidState(format!(
                    "code {} was issued concurrently, retry the batch",
                    card.code
                )));
            }
        }
        txn.commit().await?;

        tracing::info!(
            batch_id = %batch.id,
            quantity,
            points_per_code,
            store_id = ?batch.store_id,
            "batch created"
        );
        self.event_bus.publish(LedgerEvent::BatchCreated {
            batch_id: batch.id.clone(),
            store_id: batch.store_id.clone(),
            quantity,
            points_per_code,
            timestamp: batch.created_date,
        });
        Ok(batch)
    }

    /// Returns batches newest first, optionally only those of one store.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] on adapter failure.
    pub async fn list_batches(&self, store_id: Option<&str>) -> Result<Vec<LoyaltyBatch>, LedgerError> {
        let mut batches: Vec<LoyaltyBatch> =
            persistence::fetch_all(self.store.as_ref(), Collection::Batches).await?;
        if let Some(store) = store_id {
            batches.retain(|b| b.store_id.as_deref() == Some(store));
        }
        batches.sort_by(|a, b| b.created_date.cmp(&a.created_date).then(b.id.cmp(&a.id)));
        Ok(batches)
    }

    /// Returns one batch with its codes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BatchNotFound`] if the id is unknown.
    pub async fn get_batch(&self, batch_id: &str) -> Result<LoyaltyBatch, LedgerError> {
        persistence::fetch(self.store.as_ref(), Collection::Batches, batch_id)
            .await?
            .ok_or_else(|| LedgerError::BatchNotFound(batch_id.to_string()))
    }

    /// Marks a batch's sticker sheet as printed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BatchNotFound`] or [`LedgerError::InvalidState`]
    /// for an expired batch.
    pub async fn mark_printed(&self, batch_id: &str) -> Result<LoyaltyBatch, LedgerError> {
        let mut txn = self.store.begin().await?;
        let mut batch: LoyaltyBatch =
            persistence::load(txn.as_mut(), Collection::Batches, batch_id)
                .await?
                .ok_or_else(|| LedgerError::BatchNotFound(batch_id.to_string()))?;
        match batch.status {
            BatchStatus::Printed => return Ok(batch),
            BatchStatus::Expired => {
                return Err(LedgerError::InvalidState(format!("batch {batch_id} is expired")));
            }
            BatchStatus::Active => {}
        }
        batch.status = BatchStatus::Printed;
        persistence::save(txn.as_mut(), Collection::Batches, &batch.id, &batch).await?;
        txn.commit().await?;

        tracing::info!(batch_id = %batch.id, "batch marked printed");
        Ok(batch)
    }

    /// Consumes a code and, when a member is given, credits its value.
    ///
    /// Precondition failures come back as an unsuccessful outcome with the
    /// ledger untouched. The code's state flip and the credit commit
    /// together, and the batch is locked for the whole attempt, so a code
    /// can never be credited twice.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] on adapter failure only.
    pub async fn redeem_code(
        &self,
        code: &str,
        store_scope: Option<&str>,
        member_id: Option<&str>,
    ) -> Result<RedemptionOutcome, LedgerError> {
        let code = code.trim().to_uppercase();
        let store_scope = store_scope.map(str::trim).filter(|s| !s.is_empty());
        let member_id = member_id.map(str::trim).filter(|s| !s.is_empty());

        match self.try_redeem(&code, store_scope, member_id).await {
            Ok((value, events)) => {
                self.event_bus.publish_all(events);
                Ok(RedemptionOutcome::redeemed(value))
            }
            Err(err) if err.kind() == ErrorKind::Storage => Err(err),
            Err(err) => {
                tracing::warn!(%code, error = %err, "redemption refused");
                Ok(RedemptionOutcome::refused(&err))
            }
        }
    }

    async fn try_redeem(
        &self,
        code: &str,
        store_scope: Option<&str>,
        member_id: Option<&str>,
    ) -> Result<(u64, Vec<LedgerEvent>), LedgerError> {
        let mut txn = self.store.begin().await?;
        let index: CodeIndexEntry = persistence::load(txn.as_mut(), Collection::CodeIndex, code)
            .await?
            .ok_or_else(|| LedgerError::CodeNotFound(code.to_string()))?;
        let mut batch: LoyaltyBatch =
            persistence::load(txn.as_mut(), Collection::Batches, &index.batch_id)
                .await?
                .ok_or_else(|| LedgerError::CodeNotFound(code.to_string()))?;

        if let Some(scope) = store_scope
            && batch.store_id.as_deref().is_some_and(|owner| owner != scope)
        {
            return Err(LedgerError::WrongStore {
                code: code.to_string(),
            });
        }

        let now = Utc::now();
        let batch_store = batch.store_id.clone();
        let card = batch
            .find_code_mut(code)
            .ok_or_else(|| LedgerError::CodeNotFound(code.to_string()))?;
        match card.status {
            CardStatus::Redeemed => return Err(LedgerError::AlreadyRedeemed(code.to_string())),
            CardStatus::Expired => return Err(LedgerError::CodeExpired(code.to_string())),
            CardStatus::Active if card.is_past_expiry(now) => {
                return Err(LedgerError::CodeExpired(code.to_string()));
            }
            CardStatus::Active => {}
        }
        let value = card.value;

        let mut events = Vec::with_capacity(2);
        let mut credited = None;
        if let Some(member_key) = member_id {
            let entry = LedgerEntry::new(member_key, value, EntryKind::Earn, format!("Coupon: {code}"))
                .with_store(batch_store.clone());
            let posting = post_entry(txn.as_mut(), entry).await?;
            credited = Some(posting.member.id);
            events.push(posting.event);
        }

        card.status = CardStatus::Redeemed;
        card.redeemed_by.clone_from(&credited);
        card.redeemed_at = Some(now);
        persistence::save(txn.as_mut(), Collection::Batches, &batch.id, &batch).await?;
        txn.commit().await?;

        tracing::info!(
            %code,
            batch_id = %batch.id,
            member_id = ?credited,
            value,
            "code redeemed"
        );
        events.insert(
            0,
            LedgerEvent::CodeRedeemed {
                code: code.to_string(),
                batch_id: batch.id,
                store_id: batch_store,
                member_id: credited,
                value,
                timestamp: now,
            },
        );
        Ok((value, events))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::CodePolicy;
    use crate::persistence::MemoryStore;
    use crate::service::ledger_service::LedgerService;

    struct Fixture {
        ledger: LedgerService,
        redemption: RedemptionService,
        store: Arc<dyn DocumentStore>,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let bus = EventBus::new(100);
        let ledger = LedgerService::new(Arc::clone(&store), bus.clone());
        let redemption = RedemptionService::new(Arc::clone(&store), CodeGenerator::default(), bus);
        let Ok(_) = ledger.register_member("Ramesh", None, "7777777777").await else {
            panic!("registration failed");
        };
        Fixture {
            ledger,
            redemption,
            store,
        }
    }

    async fn first_code(fx: &Fixture, store_id: Option<&str>) -> String {
        let Ok(batch) = fx
            .redemption
            .create_batch(Some("Diwali".into()), 50, 3, store_id.map(String::from))
            .await
        else {
            panic!("batch creation failed");
        };
        let Some(code) = batch.codes.first().map(|c| c.code.clone()) else {
            panic!("batch has no codes");
        };
        code
    }

    #[tokio::test]
    async fn redeem_credits_member_once() {
        let fx = fixture().await;
        let code = first_code(&fx, Some("Pune Hardware")).await;

        let Ok(outcome) = fx
            .redemption
            .redeem_code(&code, Some("Pune Hardware"), Some("7777777777"))
            .await
        else {
            panic!("redeem failed");
        };
        assert!(outcome.success);
        assert_eq!(outcome.value, 50);

        let Ok(member) = fx.ledger.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 50);
        assert_eq!(member.store_balances.get("Pune Hardware"), Some(&50));
        let expected_note = format!("Coupon: {code}");
        assert_eq!(
            member.history.first().map(|t| t.note.as_str()),
            Some(expected_note.as_str())
        );

        let Ok(again) = fx
            .redemption
            .redeem_code(&code, None, Some("7777777777"))
            .await
        else {
            panic!("redeem failed");
        };
        assert!(!again.success);
        assert_eq!(again.value, 0);
        assert_eq!(again.reason, Some(RedemptionFailure::AlreadyRedeemed));

        let Ok(member) = fx.ledger.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 50);
    }

    #[tokio::test]
    async fn wrong_store_and_unknown_code_are_refused() {
        let fx = fixture().await;
        let code = first_code(&fx, Some("Pune Hardware")).await;

        let Ok(outcome) = fx
            .redemption
            .redeem_code(&code, Some("Mumbai Tiles"), Some("7777777777"))
            .await
        else {
            panic!("redeem failed");
        };
        assert_eq!(outcome.reason, Some(RedemptionFailure::WrongStore));
        assert_eq!(outcome.message, "Invalid store for this coupon.");

        let Ok(outcome) = fx.redemption.redeem_code("ZZZZ-ZZZZ", None, None).await else {
            panic!("redeem failed");
        };
        assert_eq!(outcome.reason, Some(RedemptionFailure::CodeNotFound));

        // The refused attempts left the code redeemable.
        let Ok(outcome) = fx
            .redemption
            .redeem_code(&code.to_lowercase(), None, Some("7777777777"))
            .await
        else {
            panic!("redeem failed");
        };
        assert!(outcome.success);

        // A batch without a store is redeemable under any store scope.
        let unscoped = first_code(&fx, None).await;
        let Ok(outcome) = fx
            .redemption
            .redeem_code(&unscoped, Some("Mumbai Tiles"), Some("7777777777"))
            .await
        else {
            panic!("redeem failed");
        };
        assert!(outcome.success);
        assert_eq!(outcome.reason, None);
    }

    #[tokio::test]
    async fn unknown_member_rolls_back_code() {
        let fx = fixture().await;
        let code = first_code(&fx, None).await;

        let Ok(outcome) = fx
            .redemption
            .redeem_code(&code, None, Some("0000000000"))
            .await
        else {
            panic!("redeem failed");
        };
        assert_eq!(outcome.reason, Some(RedemptionFailure::MemberNotFound));

        let Ok(outcome) = fx.redemption.redeem_code(&code, None, None).await else {
            panic!("redeem failed");
        };
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn expired_code_is_refused() {
        let fx = fixture().await;
        let Ok(batch) = fx.redemption.create_batch(None, 10, 1, None).await else {
            panic!("batch creation failed");
        };
        let Some(code) = batch.codes.first().map(|c| c.code.clone()) else {
            panic!("batch has no codes");
        };

        let mut aged = batch.clone();
        if let Some(card) = aged.find_code_mut(&code) {
            card.expiry_date = Utc::now() - chrono::Duration::days(1);
        }
        let Ok(mut txn) = fx.store.begin().await else {
            panic!("begin failed");
        };
        let _ = persistence::save(txn.as_mut(), Collection::Batches, &aged.id, &aged).await;
        let _ = txn.commit().await;

        let Ok(outcome) = fx.redemption.redeem_code(&code, None, Some("7777777777")).await else {
            panic!("redeem failed");
        };
        assert_eq!(outcome.reason, Some(RedemptionFailure::CodeExpired));
        let Ok(stored) = fx.redemption.get_batch(&batch.id).await else {
            panic!("batch missing");
        };
        assert_eq!(stored.find_code(&code).map(|c| c.status), Some(CardStatus::Active));
    }

    #[tokio::test]
    async fn batch_validation_and_lifecycle() {
        let fx = fixture().await;
        assert!(matches!(
            fx.redemption.create_batch(None, 0, 5, None).await,
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            fx.redemption.create_batch(None, 5, 0, None).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            fx.redemption.create_batch(None, 5, 10_001, None).await,
            Err(LedgerError::Validation(_))
        ));

        let Ok(batch) = fx.redemption.create_batch(None, 5, 2, Some("Pune".into())).await else {
            panic!("batch creation failed");
        };
        assert!(batch.name.starts_with("Batch "));

        let Ok(printed) = fx.redemption.mark_printed(&batch.id).await else {
            panic!("mark printed failed");
        };
        assert_eq!(printed.status, BatchStatus::Printed);
        assert!(fx.redemption.mark_printed(&batch.id).await.is_ok());
        assert!(matches!(
            fx.redemption.mark_printed("B-missing").await,
            Err(LedgerError::BatchNotFound(_))
        ));

        let pune = fx.redemption.list_batches(Some("Pune")).await.unwrap_or_default();
        assert_eq!(pune.len(), 1);
        let other = fx.redemption.list_batches(Some("Nashik")).await.unwrap_or_default();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn codes_are_unique_across_batches() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        // 2^8 = 256 possible codes; two batches of 100 must not overlap.
        let Ok(policy) = CodePolicy::new("AB", 30, 1000) else {
            panic!("valid policy");
        };
        let service = RedemptionService::new(store, CodeGenerator::new(policy), EventBus::new(10));

        let mut all = HashSet::new();
        for _ in 0..2 {
            let Ok(batch) = service.create_batch(None, 1, 100, None).await else {
                panic!("batch creation failed");
            };
            for card in batch.codes {
                assert!(all.insert(card.code), "duplicate code minted");
            }
        }
        assert_eq!(all.len(), 200);

        let exhausted = service.create_batch(None, 1, 100, None).await;
        assert!(matches!(exhausted, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn out_of_range_validity_fails_batch_without_writes() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let policy = CodePolicy {
            validity_days: 100_000_000,
            ..CodePolicy::default()
        };
        let service = RedemptionService::new(
            Arc::clone(&store),
            CodeGenerator::new(policy),
            EventBus::new(10),
        );

        let result = service.create_batch(Some("x".into()), 10, 1, None).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert!(service.list_batches(None).await.unwrap_or_default().is_empty());
        assert!(store.list(Collection::CodeIndex).await.unwrap_or_default().is_empty());
    }
}
