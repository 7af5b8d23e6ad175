//! Loyalty batches and the single-use codes they contain.
//!
//! A [`LoyaltyBatch`] is minted whole: every [`GiftCard`] in it starts
//! `Active` with the batch's value, expiry and store attribution. Codes
//! then transition individually; the batch never merges or splits.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{IdPrefix, new_id};
use crate::config::CodePolicy;
use crate::error::LedgerError;

/// Symbols on each side of the dash in `XXXX-XXXX`.
pub const CODE_GROUP_LEN: usize = 4;

/// Lifecycle of a batch as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum BatchStatus {
    /// Freshly minted.
    #[default]
    Active,
    /// Sticker sheet has been printed.
    Printed,
    /// Past its validity.
    Expired,
}

/// What a code grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardType {
    /// Cash-equivalent value.
    CashValue,
    /// Loyalty points.
    #[default]
    PointVoucher,
}

/// Redemption state of a single code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum CardStatus {
    /// Redeemable.
    #[default]
    Active,
    /// Redeemed exactly once.
    Redeemed,
    /// Past expiry.
    Expired,
}

/// One redeemable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GiftCard {
    /// Unique identifier.
    pub id: String,
    /// Human-enterable code, `XXXX-XXXX`.
    pub code: String,
    /// What the code grants.
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Points granted on redemption.
    pub value: u64,
    /// Redemption state.
    pub status: CardStatus,
    /// Minting time.
    pub created_date: DateTime<Utc>,
    /// Last moment the code may be redeemed.
    pub expiry_date: DateTime<Utc>,
    /// Owning batch.
    pub batch_id: String,
    /// Member credited on redemption, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_by: Option<String>,
    /// Redemption time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl GiftCard {
    /// Returns `true` if the expiry date lies before `now`.
    #[must_use]
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }
}

/// A named group of codes generated together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoyaltyBatch {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Value of every code in the batch.
    pub points_per_code: u64,
    /// Number of codes.
    pub quantity: u32,
    /// Minting time.
    pub created_date: DateTime<Utc>,
    /// Batch lifecycle.
    pub status: BatchStatus,
    /// Store the codes are attributed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    /// The codes, in minting order.
    pub codes: Vec<GiftCard>,
}

impl LoyaltyBatch {
    /// Finds a code by its string.
    #[must_use]
    pub fn find_code(&self, code: &str) -> Option<&GiftCard> {
        self.codes.iter().find(|c| c.code == code)
    }

    /// Finds a code by its string, mutably.
    pub fn find_code_mut(&mut self, code: &str) -> Option<&mut GiftCard> {
        self.codes.iter_mut().find(|c| c.code == code)
    }

    /// Number of codes already redeemed.
    #[must_use]
    pub fn redeemed_count(&self) -> usize {
        self.codes
            .iter()
            .filter(|c| c.status == CardStatus::Redeemed)
            .count()
    }
}

/// Mints batches according to a [`CodePolicy`].
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    policy: CodePolicy,
}

impl CodeGenerator {
    /// Creates a generator for the given policy.
    #[must_use]
    pub fn new(policy: CodePolicy) -> Self {
        Self { policy }
    }

    /// Returns the policy in use.
    #[must_use]
    pub fn policy(&self) -> &CodePolicy {
        &self.policy
    }

    /// Number of distinct codes this policy can produce.
    #[must_use]
    pub fn code_space(&self) -> u128 {
        (self.policy.alphabet.len() as u128).saturating_pow((CODE_GROUP_LEN * 2) as u32)
    }

    /// Draws one random code in `XXXX-XXXX` form.
    #[must_use]
    pub fn random_code(&self) -> String {
        let mut rng = rand::rng();
        let mut code = String::with_capacity(CODE_GROUP_LEN * 2 + 1);
        for i in 0..CODE_GROUP_LEN * 2 {
            if i == CODE_GROUP_LEN {
                code.push('-');
            }
            let idx = rng.random_range(0..self.policy.alphabet.len());
            if let Some(symbol) = self.policy.alphabet.get(idx) {
                code.push(*symbol);
            }
        }
        code
    }

    /// Returns `true` if `code` has the shape this generator produces.
    #[must_use]
    pub fn is_well_formed(&self, code: &str) -> bool {
        let Some((left, right)) = code.split_once('-') else {
            return false;
        };
        left.chars().count() == CODE_GROUP_LEN
            && right.chars().count() == CODE_GROUP_LEN
            && left
                .chars()
                .chain(right.chars())
                .all(|c| self.policy.alphabet.contains(&c))
    }

    /// Mints a batch of `quantity` distinct codes.
    ///
    /// `taken` reports codes that already exist elsewhere; such draws and
    /// duplicates within the batch are discarded and redrawn.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if the validity period puts the
    /// expiry date beyond what a timestamp can represent.
    pub fn mint(
        &self,
        name: String,
        points_per_code: u64,
        quantity: u32,
        store_id: Option<String>,
        mut taken: impl FnMut(&str) -> bool,
    ) -> Result<LoyaltyBatch, LedgerError> {
        let now = Utc::now();
        let expiry = chrono::TimeDelta::try_days(self.policy.validity_days)
            .and_then(|validity| now.checked_add_signed(validity))
            .ok_or_else(|| {
                LedgerError::Validation(format!(
                    "code validity of {} days is out of range",
                    self.policy.validity_days
                ))
            })?;
        let batch_id = new_id(IdPrefix::Batch);

        let mut seen = HashSet::with_capacity(quantity as usize);
        let mut codes = Vec::with_capacity(quantity as usize);
        while codes.len() < quantity as usize {
            let code = self.random_code();
            if seen.contains(&code) || taken(&code) {
                tracing::debug!(%code, "code collision, redrawing");
                continue;
            }
            seen.insert(code.clone());
            codes.push(GiftCard {
                id: new_id(IdPrefix::GiftCard),
                code,
                card_type: CardType::PointVoucher,
                value: points_per_code,
                status: CardStatus::Active,
                created_date: now,
                expiry_date: expiry,
                batch_id: batch_id.clone(),
                redeemed_by: None,
                redeemed_at: None,
            });
        }

        Ok(LoyaltyBatch {
            id: batch_id,
            name,
            points_per_code,
            quantity,
            created_date: now,
            status: BatchStatus::Active,
            store_id,
            codes,
        })
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(CodePolicy::default())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn random_code_shape() {
        let generator = CodeGenerator::default();
        for _ in 0..200 {
            let code = generator.random_code();
            assert_eq!(code.len(), 9);
            assert!(generator.is_well_formed(&code), "malformed {code}");
            assert!(!code.contains(['0', 'O', '1', 'I']));
        }
    }

    #[test]
    fn code_space_of_default_alphabet() {
        assert_eq!(CodeGenerator::default().code_space(), 32u128.pow(8));
    }

    #[test]
    fn well_formed_rejects_foreign_symbols() {
        let generator = CodeGenerator::default();
        assert!(generator.is_well_formed("ABCD-EF23"));
        assert!(!generator.is_well_formed("ABCD-EF01"));
        assert!(!generator.is_well_formed("ABCDEF23"));
        assert!(!generator.is_well_formed("ABC-DEF23"));
    }

    #[test]
    fn mint_uniform_batch() {
        let generator = CodeGenerator::default();
        let Ok(batch) = generator.mint("Test".into(), 50, 10, Some("Pune Hardware".into()), |_| false)
        else {
            panic!("mint failed");
        };
        assert_eq!(batch.codes.len(), 10);
        assert_eq!(batch.quantity, 10);
        assert_eq!(batch.status, BatchStatus::Active);
        for card in &batch.codes {
            assert_eq!(card.value, 50);
            assert_eq!(card.status, CardStatus::Active);
            assert_eq!(card.batch_id, batch.id);
            assert_eq!(card.expiry_date, batch.codes.first().map_or(card.expiry_date, |c| c.expiry_date));
        }
        let distinct: HashSet<&str> = batch.codes.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(distinct.len(), 10);
    }

    #[test]
    fn mint_redraws_taken_codes() {
        // Two-symbol alphabet: 256 possible codes, so collisions are frequent.
        let Ok(policy) = CodePolicy::new("AB", 30, 100) else {
            panic!("valid policy");
        };
        let generator = CodeGenerator::new(policy);
        let mut rejected = 0;
        let Ok(batch) = generator.mint("Tiny".into(), 1, 100, None, |code| {
            if code.starts_with('A') {
                rejected += 1;
                true
            } else {
                false
            }
        }) else {
            panic!("mint failed");
        };
        assert_eq!(batch.codes.len(), 100);
        assert!(batch.codes.iter().all(|c| c.code.starts_with('B')));
        assert!(rejected > 0);
    }

    #[test]
    fn unrepresentable_expiry_is_refused() {
        let generator = CodeGenerator::new(CodePolicy {
            validity_days: 100_000_000,
            ..CodePolicy::default()
        });
        let minted = generator.mint("Forever".into(), 10, 1, None, |_| false);
        assert!(matches!(minted, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn find_and_count() {
        let generator = CodeGenerator::default();
        let Ok(mut batch) = generator.mint("Find".into(), 10, 3, None, |_| false) else {
            panic!("mint failed");
        };
        let Some(code) = batch.codes.first().map(|c| c.code.clone()) else {
            panic!("batch has codes");
        };
        assert!(batch.find_code(&code).is_some());
        assert!(batch.find_code("ZZZZ-ZZZZ-ZZZZ").is_none());

        if let Some(card) = batch.find_code_mut(&code) {
            card.status = CardStatus::Redeemed;
        }
        assert_eq!(batch.redeemed_count(), 1);
    }
}
