//! Invoice requests: a member's claim that a purchase should earn points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Review state of an invoice. Transitions out of `Pending` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum InvoiceStatus {
    /// Awaiting store review; amount still editable.
    #[default]
    Pending,
    /// Approved and credited.
    Approved,
    /// Rejected without credit.
    Rejected,
}

/// A bill uploaded by a member for store approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceRequest {
    /// Unique identifier.
    pub id: String,
    /// Member to credit on approval.
    pub customer_id: String,
    /// Member display name at submission time.
    pub customer_name: String,
    /// Store-issued bill number.
    pub invoice_number: String,
    /// Claimed purchase amount in rupees.
    pub amount: f64,
    /// Submission time.
    pub date: DateTime<Utc>,
    /// Review state.
    pub status: InvoiceStatus,
    /// Store that issued the bill.
    pub store_name: String,
    /// Optional description of the purchased goods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_details: Option<String>,
    /// Reason given on rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Points credited on approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awarded_points: Option<u64>,
    /// Time of approval or rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl InvoiceRequest {
    /// Returns `true` while the invoice can still be edited or reviewed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == InvoiceStatus::Pending
    }
}

/// Checks that an invoice amount is a finite, non-negative number.
///
/// # Errors
///
/// Returns a message describing the problem.
pub fn validate_invoice_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() {
        return Err(format!("invoice amount must be a finite number, got {amount}"));
    }
    if amount < 0.0 {
        return Err(format!("invoice amount must not be negative, got {amount}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_validation() {
        assert!(validate_invoice_amount(5000.0).is_ok());
        assert!(validate_invoice_amount(0.0).is_ok());
        assert!(validate_invoice_amount(-1.0).is_err());
        assert!(validate_invoice_amount(f64::NAN).is_err());
        assert!(validate_invoice_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn optional_fields_are_omitted() {
        let inv = InvoiceRequest {
            id: "INV-1".into(),
            customer_id: "9876543211".into(),
            customer_name: "Suresh Electric".into(),
            invoice_number: "BILL-9988".into(),
            amount: 5000.0,
            date: Utc::now(),
            status: InvoiceStatus::Pending,
            store_name: "Mumbai Distributor".into(),
            product_details: None,
            rejection_reason: None,
            awarded_points: None,
            reviewed_at: None,
        };
        assert!(inv.is_pending());
        let json = serde_json::to_string(&inv).unwrap_or_default();
        assert!(json.contains("\"status\":\"Pending\""));
        assert!(!json.contains("rejection_reason"));
    }
}
