//! Ledger error types with HTTP status code mapping.
//!
//! [`LedgerError`] is the central error type for the service. Each variant
//! belongs to one [`ErrorKind`] of the taxonomy and maps to a specific HTTP
//! status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "kind": "insufficient_balance",
///     "message": "insufficient balance: requested 150, available 100"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`LedgerError`]).
    pub code: u32,
    /// Taxonomy bucket of the error.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Coarse error taxonomy shared by every service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An entity lookup missed.
    NotFound,
    /// The entity is outside the state the operation requires.
    InvalidState,
    /// A debit exceeds the member's balance.
    InsufficientBalance,
    /// Malformed input (amount, UPI id, alphabet, ...).
    Validation,
    /// Adapter read/write failure.
    Storage,
}

/// Service error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2999 | Not Found / State | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Storage           | 500 Internal Server Error    |
/// | 4000–4999 | Balance           | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No member matches the given id or phone number.
    #[error("member not found: {0}")]
    MemberNotFound(String),

    /// No code with the given string exists in any batch.
    #[error("code not found: {0}")]
    CodeNotFound(String),

    /// No batch with the given id exists.
    #[error("batch not found: {0}")]
    BatchNotFound(String),

    /// No invoice with the given id exists.
    #[error("invoice not found: {0}")]
    InvoiceNotFound(String),

    /// No payout request with the given id exists.
    #[error("payout not found: {0}")]
    PayoutNotFound(String),

    /// No banner with the given id exists.
    #[error("banner not found: {0}")]
    BannerNotFound(String),

    /// No store with the given id exists.
    #[error("store not found: {0}")]
    StoreNotFound(String),

    /// The code was minted for a different store than the scan context.
    #[error("code {code} belongs to another store")]
    WrongStore {
        /// Code string that was scanned.
        code: String,
    },

    /// The code has already been redeemed.
    #[error("code {0} already redeemed")]
    AlreadyRedeemed(String),

    /// The code is expired.
    #[error("code {0} expired")]
    CodeExpired(String),

    /// A member with the same phone number is already registered.
    #[error("member already registered: {0}")]
    MemberExists(String),

    /// A store with the same mobile number or name already exists.
    #[error("store already exists: {0}")]
    StoreExists(String),

    /// The entity is not in a state that permits the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A debit exceeds the member's current balance.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Points the caller tried to debit.
        requested: u64,
        /// Points available at the time of the request.
        available: u64,
    },

    /// Amount was non-positive, non-integer or out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Persistence layer failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MemberNotFound(_)
            | Self::CodeNotFound(_)
            | Self::BatchNotFound(_)
            | Self::InvoiceNotFound(_)
            | Self::PayoutNotFound(_)
            | Self::BannerNotFound(_)
            | Self::StoreNotFound(_) => ErrorKind::NotFound,
            Self::WrongStore { .. }
            | Self::AlreadyRedeemed(_)
            | Self::CodeExpired(_)
            | Self::MemberExists(_)
            | Self::StoreExists(_)
            | Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::InvalidAmount(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidAmount(_) => 1002,
            Self::MemberNotFound(_) => 2001,
            Self::CodeNotFound(_) => 2002,
            Self::BatchNotFound(_) => 2003,
            Self::InvoiceNotFound(_) => 2004,
            Self::PayoutNotFound(_) => 2005,
            Self::BannerNotFound(_) => 2006,
            Self::StoreNotFound(_) => 2007,
            Self::InvalidState(_) => 2101,
            Self::WrongStore { .. } => 2102,
            Self::AlreadyRedeemed(_) => 2103,
            Self::CodeExpired(_) => 2104,
            Self::MemberExists(_) => 2105,
            Self::StoreExists(_) => 2106,
            Self::Storage(_) => 3001,
            Self::InsufficientBalance { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidState => StatusCode::CONFLICT,
            ErrorKind::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("malformed document: {err}"))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                kind: self.kind(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
