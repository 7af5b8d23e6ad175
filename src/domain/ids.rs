//! Time-ordered entity identifiers.
//!
//! Every generated id is a UUID v7 (millisecond timestamp prefix followed by
//! random bits) behind a short type prefix such as `TXN-` or `INV-`, so ids
//! sort by creation time and stay unique across concurrent writers.

/// Identifier prefix per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    /// Ledger transaction.
    Transaction,
    /// Payout debit transaction.
    PayoutTransaction,
    /// Payout request.
    Payout,
    /// Loyalty batch.
    Batch,
    /// Gift card inside a batch.
    GiftCard,
    /// Invoice request.
    Invoice,
    /// Promo banner.
    Banner,
}

impl IdPrefix {
    /// Returns the textual prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transaction => "TXN",
            Self::PayoutTransaction => "PAY",
            Self::Payout => "PR",
            Self::Batch => "B",
            Self::GiftCard => "V",
            Self::Invoice => "INV",
            Self::Banner => "BN",
        }
    }
}

/// Generates a new identifier with the given prefix.
#[must_use]
pub fn new_id(prefix: IdPrefix) -> String {
    format!("{}-{}", prefix.as_str(), uuid::Uuid::now_v7().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_prefixed() {
        let a = new_id(IdPrefix::Transaction);
        let b = new_id(IdPrefix::Transaction);
        assert_ne!(a, b);
        assert!(a.starts_with("TXN-"));
        assert_eq!(a.len(), "TXN-".len() + 32);
    }

    #[test]
    fn ids_sort_by_creation() {
        let first = new_id(IdPrefix::Invoice);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_id(IdPrefix::Invoice);
        assert!(first < second);
    }
}
