//! Payout requests: member withdrawals of points as cash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Settlement state of a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum PayoutStatus {
    /// Debited from the member, awaiting transfer.
    #[default]
    Pending,
    /// Transfer done.
    Completed,
    /// Refused; the debit was reversed.
    Rejected,
}

/// A withdrawal claim. The ledger debit happens when the request is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PayoutRequest {
    /// Unique identifier.
    pub id: String,
    /// Member who requested the payout.
    pub user_id: String,
    /// Member display name.
    pub user_name: String,
    /// Points withdrawn.
    pub amount: u64,
    /// Destination UPI id.
    pub upi_id: String,
    /// Request time.
    pub date: DateTime<Utc>,
    /// Settlement state.
    pub status: PayoutStatus,
    /// Ledger transaction that debited the member.
    pub transaction_id: String,
    /// Time of completion or rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
}

/// Minimal UPI id check: non-empty handle and provider around one `@`.
///
/// # Errors
///
/// Returns a message if the id has no `@` or an empty side.
pub fn validate_upi_id(upi_id: &str) -> Result<(), String> {
    let trimmed = upi_id.trim();
    match trimmed.split_once('@') {
        Some((handle, provider)) if !handle.is_empty() && !provider.is_empty() => Ok(()),
        _ => Err(format!("invalid UPI id: {upi_id:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upi_validation() {
        assert!(validate_upi_id("x@upi").is_ok());
        assert!(validate_upi_id("9876543211@okaxis").is_ok());
        assert!(validate_upi_id("no-at-sign").is_err());
        assert!(validate_upi_id("@upi").is_err());
        assert!(validate_upi_id("x@").is_err());
        assert!(validate_upi_id("").is_err());
    }
}
