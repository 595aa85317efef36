//! bch-api response types
//!
//! Shapes of the `electrumx/*` and `slp/hydrateUtxos` endpoints.

use serde::{Deserialize, Deserializer, Serialize};

use crate::storage::{TokenMetadata, UtxoType};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElectrumBalance {
    pub confirmed: i64,
    pub unconfirmed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressBalanceEntry {
    pub address: String,
    pub balance: ElectrumBalance,
}

impl AddressBalanceEntry {
    /// Activity that keeps the scan going. A negative unconfirmed amount
    /// alone does not count, though the scan still records it.
    pub fn has_balance(&self) -> bool {
        self.balance.confirmed > 0 || self.balance.unconfirmed > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub success: bool,
    #[serde(default)]
    pub balances: Vec<AddressBalanceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElectrumUtxo {
    #[serde(default)]
    pub height: i64,
    pub tx_hash: String,
    pub tx_pos: u32,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressUtxoEntry {
    pub address: String,
    pub utxos: Vec<ElectrumUtxo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtxoResponse {
    pub success: bool,
    #[serde(default)]
    pub utxos: Vec<AddressUtxoEntry>,
}

/// UTXO annotated with SLP information.
///
/// `isValid` is `true` for token UTXOs, `false` for plain BCH and `null` when
/// the SLP validator has not reached a verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HydratedUtxo {
    #[serde(default)]
    pub height: i64,
    #[serde(rename = "tx_hash")]
    pub tx_hash: String,
    #[serde(rename = "tx_pos")]
    pub tx_pos: u32,
    pub value: u64,
    #[serde(default)]
    pub is_valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_document_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_document_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utxo_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_qty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HydratedAddressUtxos {
    pub address: String,
    pub utxos: Vec<HydratedUtxo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateResponse {
    #[serde(default)]
    pub slp_utxos: Vec<HydratedAddressUtxos>,
}

/// Older indexers report `tokenQty` as a JSON number
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// How the wallet treats a hydrated UTXO
#[derive(Debug, Clone, PartialEq)]
pub enum UtxoClass {
    /// Spendable BCH
    Plain,
    /// Validated SLP token or minting baton
    Token(TokenMetadata),
    /// No validity verdict; neither spendable nor a known token
    Unvalidated,
}

impl HydratedUtxo {
    pub fn has_token_fields(&self) -> bool {
        self.token_id.is_some() || self.token_type.is_some() || self.utxo_type.is_some()
    }

    pub fn classify(&self) -> UtxoClass {
        match self.is_valid {
            None => UtxoClass::Unvalidated,
            Some(false) => UtxoClass::Plain,
            Some(true) => self
                .token_metadata()
                .map(UtxoClass::Token)
                .unwrap_or(UtxoClass::Unvalidated),
        }
    }

    fn token_metadata(&self) -> Option<TokenMetadata> {
        let utxo_type = match self.utxo_type.as_deref()? {
            "token" => UtxoType::Token,
            "minting-baton" => UtxoType::MintingBaton,
            _ => return None,
        };
        Some(TokenMetadata {
            token_id: self.token_id.clone()?,
            token_ticker: self.token_ticker.clone().unwrap_or_default(),
            token_name: self.token_name.clone().unwrap_or_default(),
            token_document_url: self.token_document_url.clone().unwrap_or_default(),
            token_document_hash: self.token_document_hash.clone().unwrap_or_default(),
            decimals: self.decimals.unwrap_or(0),
            token_type: self.token_type?,
            utxo_type,
            token_qty: match utxo_type {
                UtxoType::Token => self.token_qty.clone()?,
                UtxoType::MintingBaton => self.token_qty.clone().unwrap_or_else(|| "0".into()),
            },
        })
    }
}

impl From<&ElectrumUtxo> for HydratedUtxo {
    fn from(utxo: &ElectrumUtxo) -> Self {
        Self {
            height: utxo.height,
            tx_hash: utxo.tx_hash.clone(),
            tx_pos: utxo.tx_pos,
            value: utxo.value,
            ..Default::default()
        }
    }
}
