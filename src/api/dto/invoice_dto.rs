//! Invoice DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::service::NewInvoice;

/// Request body for `POST /invoices`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitInvoiceRequest {
    /// Member id or phone.
    pub customer_id: String,
    /// Display name; the member's registered name when omitted.
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Store-issued bill number.
    pub invoice_number: String,
    /// Purchase amount in rupees.
    pub amount: f64,
    /// Store that issued the bill.
    pub store_name: String,
    /// Description of the goods.
    #[serde(default)]
    pub product_details: Option<String>,
}

impl From<SubmitInvoiceRequest> for NewInvoice {
    fn from(req: SubmitInvoiceRequest) -> Self {
        Self {
            customer_id: req.customer_id,
            customer_name: req.customer_name.unwrap_or_default(),
            invoice_number: req.invoice_number,
            amount: req.amount,
            store_name: req.store_name,
            product_details: req.product_details,
        }
    }
}

/// Request body for `PUT /invoices/{id}/amount`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInvoiceAmountRequest {
    /// Corrected amount in rupees.
    pub amount: f64,
}

/// Request body for `POST /invoices/{id}/reject`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectInvoiceRequest {
    /// Reason shown to the member.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query parameters for `GET /invoices`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceQuery {
    /// Only invoices issued by this store.
    #[serde(default)]
    pub store_name: Option<String>,
}
