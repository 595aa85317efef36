/// bch-api v5 request and response types
///
/// These types match the bch-api format so the wallet's REST client can
/// consume them transparently.

use serde::{Deserialize, Serialize};

/// Body of `POST /electrumx/balance` and `POST /electrumx/utxos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressesRequest {
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElectrumBalance {
    pub confirmed: i64,
    pub unconfirmed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressBalance {
    pub address: String,
    pub balance: ElectrumBalance,
}

/// Response of `POST /electrumx/balance`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub success: bool,
    pub balances: Vec<AddressBalance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElectrumUtxo {
    pub height: i64,
    pub tx_hash: String,
    pub tx_pos: u32,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressUtxos {
    pub address: String,
    pub utxos: Vec<ElectrumUtxo>,
}

/// Response of `POST /electrumx/utxos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoResponse {
    pub success: bool,
    pub utxos: Vec<AddressUtxos>,
}

/// Body of `POST /slp/hydrateUtxos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrateRequest {
    pub utxos: Vec<AddressUtxos>,
}

/// SLP data attached to a token UTXO
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlpInfo {
    pub token_id: String,
    pub token_ticker: String,
    pub token_name: String,
    #[serde(default)]
    pub token_document_url: String,
    #[serde(default)]
    pub token_document_hash: String,
    pub decimals: u8,
    pub token_type: u8,
    /// "token" or "minting-baton"
    pub utxo_type: String,
    pub token_qty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedUtxo {
    #[serde(flatten)]
    pub utxo: ElectrumUtxo,
    /// `null` while the SLP validator has no verdict
    pub is_valid: Option<bool>,
    #[serde(flatten)]
    pub slp: Option<SlpInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydratedAddressUtxos {
    pub address: String,
    pub utxos: Vec<HydratedUtxo>,
}

/// Response of `POST /slp/hydrateUtxos`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateResponse {
    pub slp_utxos: Vec<HydratedAddressUtxos>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub addresses: usize,
    pub broadcasts: usize,
}
