//! Gateway request/response types
//!
//! Ids and decimals cross the API as strings so no JSON number ever has to
//! hold a balance.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{Currency, Transfer, Wallet};
use crate::money::Decimal;
use crate::service::ServiceError;

// ============================================================================
// Errors
// ============================================================================

pub mod error_codes {
    pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
}

/// Error body: `{"code": "...", "msg": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub msg: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub msg: String,
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl ToString) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_PARAMETER,
            msg.to_string(),
        )
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Transfer(e) => {
                let status = StatusCode::from_u16(e.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if e.is_rejection() {
                    ApiError::new(status, e.code(), e.to_string())
                } else {
                    // storage details stay in the log
                    ApiError::new(status, e.code(), "Transfer failed")
                }
            }
            ServiceError::Store(e) => {
                tracing::error!(error = %e, "Ledger query failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::STORAGE_ERROR,
                    "Storage error",
                )
            }
            ServiceError::Database(e) => {
                tracing::error!(error = %e, "Database unavailable");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    error_codes::SERVICE_UNAVAILABLE,
                    "Database unavailable",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.code.to_string(),
            msg: self.msg,
        };
        (self.status, Json(body)).into_response()
    }
}

// ============================================================================
// Requests
// ============================================================================

/// POST /transfers
#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    pub from: String,
    pub to: String,
    pub amount: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletView {
    pub id: String,
    pub balance: Decimal,
    pub currency: Currency,
}

impl From<Wallet> for WalletView {
    fn from(w: Wallet) -> Self {
        Self {
            id: w.id.to_string(),
            balance: w.balance,
            currency: w.currency,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferView {
    pub id: String,
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub fee_amount: Decimal,
    pub time: DateTime<Utc>,
}

impl From<Transfer> for TransferView {
    fn from(t: Transfer) -> Self {
        Self {
            id: t.id.to_string(),
            from: t.from.to_string(),
            to: t.to.to_string(),
            amount: t.amount,
            fee_amount: t.fee_amount,
            time: t.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{TransferId, WalletId};
    use crate::transfer::{RejectReason, TransferError};

    #[test]
    fn test_transfer_view_uses_strings() {
        let transfer = Transfer {
            id: TransferId::new(7),
            from: WalletId::new(1),
            to: WalletId::new(2),
            amount: Decimal::parse("10.00").unwrap(),
            fee_amount: Decimal::parse("0.15").unwrap(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let json = serde_json::to_value(TransferView::from(transfer)).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["from"], "1");
        assert_eq!(json["amount"], "10.00");
        assert_eq!(json["fee_amount"], "0.15");
        assert_eq!(json["time"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_rejection_maps_to_bad_request() {
        let err: ApiError =
            ServiceError::Transfer(TransferError::from(RejectReason::InsufficientFunds)).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INSUFFICIENT_FUNDS");

        let err: ApiError =
            ServiceError::Transfer(TransferError::WalletDoesNotExist(WalletId::new(9))).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.msg, "Wallet does not exist: 9");
    }
}
