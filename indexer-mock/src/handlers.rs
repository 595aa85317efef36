/// Axum HTTP handlers for the bch-api endpoints used by the wallet

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::state::{MockState, SlpVerdict};
use crate::types::*;

/// Shared application state
pub type AppState = Arc<MockState>;

/// bch-api rejects larger address arrays
pub const MAX_ADDRESSES: usize = 20;

/// Custom error type for handlers
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "success": false, "error": message }))).into_response()
    }
}

fn check_request(state: &MockState, route: &str, count: usize) -> Result<(), ApiError> {
    state.record_request(route);
    if state.is_failing() {
        return Err(ApiError::Internal("indexer unavailable".to_string()));
    }
    if count > MAX_ADDRESSES {
        return Err(ApiError::BadRequest("Array too large.".to_string()));
    }
    Ok(())
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ledger = state.ledger();
    Json(HealthResponse {
        status: "ok".to_string(),
        addresses: ledger.utxos.len(),
        broadcasts: ledger.broadcasts.len(),
    })
}

/// POST /v5/electrumx/balance
/// Returns confirmed and unconfirmed satoshis for each address
pub async fn get_balances(
    State(state): State<AppState>,
    Json(request): Json<AddressesRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    check_request(&state, "electrumx/balance", request.addresses.len())?;

    let ledger = state.ledger();
    let balances = request
        .addresses
        .into_iter()
        .map(|address| AddressBalance {
            balance: ledger.balances.get(&address).cloned().unwrap_or_default(),
            address,
        })
        .collect();

    Ok(Json(BalanceResponse {
        success: true,
        balances,
    }))
}

/// POST /v5/electrumx/utxos
/// Returns the unspent outputs of each address
pub async fn get_utxos(
    State(state): State<AppState>,
    Json(request): Json<AddressesRequest>,
) -> Result<Json<UtxoResponse>, ApiError> {
    check_request(&state, "electrumx/utxos", request.addresses.len())?;

    let ledger = state.ledger();
    let utxos = request
        .addresses
        .into_iter()
        .map(|address| AddressUtxos {
            utxos: ledger.utxos.get(&address).cloned().unwrap_or_default(),
            address,
        })
        .collect();

    Ok(Json(UtxoResponse {
        success: true,
        utxos,
    }))
}

/// POST /v5/slp/hydrateUtxos
/// Annotates UTXOs with SLP token data and validity
pub async fn hydrate_utxos(
    State(state): State<AppState>,
    Json(request): Json<HydrateRequest>,
) -> Result<Json<HydrateResponse>, ApiError> {
    check_request(&state, "slp/hydrateUtxos", request.utxos.len())?;

    let slp_utxos = request
        .utxos
        .into_iter()
        .map(|entry| HydratedAddressUtxos {
            address: entry.address,
            utxos: entry
                .utxos
                .into_iter()
                .map(|utxo| {
                    let (is_valid, slp) = match state.verdict(&utxo.tx_hash, utxo.tx_pos) {
                        Some(SlpVerdict::Token(info)) => (Some(true), Some(info)),
                        Some(SlpVerdict::Unvalidated) => (None, None),
                        None => (Some(false), None),
                    };
                    HydratedUtxo {
                        utxo,
                        is_valid,
                        slp,
                    }
                })
                .collect(),
        })
        .collect();

    Ok(Json(HydrateResponse { slp_utxos }))
}

/// GET /v5/rawtransactions/sendRawTransaction/{hex}
/// Records the transaction and returns its txid as a JSON string
pub async fn send_raw_transaction(
    State(state): State<AppState>,
    Path(tx_hex): Path<String>,
) -> Result<Json<String>, ApiError> {
    check_request(&state, "rawtransactions/sendRawTransaction", 0)?;

    if tx_hex.is_empty() || hex::decode(&tx_hex).is_err() {
        return Err(ApiError::BadRequest(format!(
            "Invalid transaction hex: {}",
            tx_hex
        )));
    }

    let txid = state.accept_broadcast(&tx_hex);
    log::info!("📤 Accepted transaction {}", txid);
    Ok(Json(txid))
}
