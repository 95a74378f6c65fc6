//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: Error response with HTTP status
//! - `error_codes`: Standard error code constants

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{ErrorKind, LedgerError, TransferRequest};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match e.kind() {
            ErrorKind::InvalidAmount | ErrorKind::SameAccount => error_codes::INVALID_PARAMETER,
            ErrorKind::InsufficientFunds => error_codes::INSUFFICIENT_FUNDS,
            ErrorKind::AccountNotFound => error_codes::ACCOUNT_NOT_FOUND,
            ErrorKind::SerializationConflict => error_codes::TRANSFER_CONFLICT,
            ErrorKind::StorageFault => error_codes::INTERNAL_ERROR,
        };
        // Storage details stay in the logs
        let msg = match e.kind() {
            ErrorKind::StorageFault => "internal server error".to_string(),
            _ => e.to_string(),
        };
        Self::new(status, code, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

/// Transfer request body.
///
/// `amount` accepts a JSON string ("12.50") or number; it is parsed straight
/// into a decimal.
#[derive(Debug, Deserialize)]
pub struct TransferBody {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

impl From<TransferBody> for TransferRequest {
    fn from(body: TransferBody) -> Self {
        TransferRequest::new(body.from, body.to, body.amount)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferData {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceData {
    pub account: String,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub timestamp_ms: u64,
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_FUNDS: i32 = 1002;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4004;
    pub const TRANSFER_CONFLICT: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}
