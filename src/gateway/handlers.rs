use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::ledger::{TransferId, WalletId};
use crate::money::Decimal;

use super::state::AppState;
use super::types::{
    ApiError, ApiResult, CreateTransferRequest, HealthResponse, ListResponse, TransferView,
    WalletView, ok,
};

/// Build version baked in by build.rs
pub const VERSION: &str = env!("GIT_HASH");

fn parse_param<T>(name: &str, value: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ApiError::bad_request(format!("Invalid {}: {}", name, e)))
}

/// GET /wallets
pub async fn list_wallets(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ListResponse<WalletView>> {
    let wallets = state.service.wallets().await?;
    ok(ListResponse {
        data: wallets.into_iter().map(WalletView::from).collect(),
    })
}

/// GET /wallets/{wallet_id}
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(wallet_id): Path<String>,
) -> ApiResult<WalletView> {
    let id: WalletId = parse_param("wallet id", &wallet_id)?;
    match state.service.wallet(id).await? {
        Some(wallet) => ok(wallet.into()),
        None => ApiError::not_found(format!("Wallet {} not found", id)).into_err(),
    }
}

/// GET /transfers
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ListResponse<TransferView>> {
    let transfers = state.service.transfers().await?;
    ok(ListResponse {
        data: transfers.into_iter().map(TransferView::from).collect(),
    })
}

/// GET /transfers/{transfer_id}
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<String>,
) -> ApiResult<TransferView> {
    let id: TransferId = parse_param("transfer id", &transfer_id)?;
    match state.service.transfer_by_id(id).await? {
        Some(transfer) => ok(transfer.into()),
        None => ApiError::not_found(format!("Transfer {} not found", id)).into_err(),
    }
}

/// POST /transfers
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateTransferRequest>, JsonRejection>,
) -> ApiResult<TransferView> {
    let Json(req) =
        body.map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;
    let from: WalletId = parse_param("from", &req.from)?;
    let to: WalletId = parse_param("to", &req.to)?;
    let amount = Decimal::parse(&req.amount).map_err(ApiError::bad_request)?;

    tracing::info!(from = %from, to = %to, amount = %amount, "Transfer request");

    let result = state.service.transfer(from, to, amount).await?;
    ok(result.transfer.into())
}

/// GET /health
///
/// 503 when the database does not answer `SELECT 1`.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                version: VERSION.to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    version: VERSION.to_string(),
                }),
            )
        }
    }
}
