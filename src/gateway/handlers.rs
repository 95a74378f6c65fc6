//! HTTP handlers for transfers, balances and health

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::state::AppState;
use super::types::{
    ApiError, ApiResponse, ApiResult, BalanceData, HealthData, TransferBody, TransferData,
    error_codes, ok,
};
use crate::ledger::TransferRequest;

/// POST /api/v1/transfer
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TransferBody>, JsonRejection>,
) -> ApiResult<TransferData> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let req: TransferRequest = body.into();
    state.bank.transfer(&req).await?;
    ok(TransferData { success: true })
}

/// GET /api/v1/balance/{account}
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(account): Path<String>,
) -> ApiResult<BalanceData> {
    let balance = state.bank.get_balance(&account).await.map_err(|e| {
        tracing::warn!(account = %account, code = e.code(), "Balance lookup failed: {}", e);
        ApiError::from(e)
    })?;
    ok(BalanceData { account, balance })
}

/// GET /api/v1/health
///
/// - Healthy: 200 OK + {code: 0, data: {timestamp_ms}}
/// - Unhealthy: 503 + {code: 5001, msg: "unavailable"}
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    let healthy = match &state.db {
        Some(db) => match db.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
                false
            }
        },
        None => {
            tracing::error!("[HEALTH] No database configured");
            false
        }
    };

    if healthy {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        (
            StatusCode::OK,
            Json(ApiResponse::success(HealthData { timestamp_ms })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error(
                error_codes::SERVICE_UNAVAILABLE,
                "unavailable",
            )),
        )
    }
}
