//! Data models for wallet storage
//!
//! One [`Wallet`] document is stored per wallet as camelCase JSON. Field
//! aliases accept documents written by earlier releases of the tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bch::units::sats_to_bch;
use crate::bch::Network;
use crate::error::WalletError;

/// SLP coin type, `m/44'/245'/...`
pub const DEFAULT_DERIVATION: u32 = 245;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub mnemonic: String,
    #[serde(rename = "derivation", alias = "derivationPath", default = "default_derivation")]
    pub derivation_path: u32,
    #[serde(default)]
    pub root_address: String,
    #[serde(alias = "nextAddress")]
    pub next_address_index: u32,
    /// `[index, cashAddress]` pairs, ordered by index
    #[serde(default)]
    pub addresses: Vec<(u32, String)>,
    #[serde(default)]
    pub balance: f64,
    #[serde(default, alias = "balanceConfirmed")]
    pub confirmed_balance: f64,
    #[serde(default, alias = "balanceUnconfirmed")]
    pub unconfirmed_balance: f64,
    #[serde(default)]
    pub addresses_with_balance: Vec<AddressBalance>,
    #[serde(default)]
    pub plain_utxos: Vec<AddressUtxos>,
    #[serde(default)]
    pub token_utxos: Vec<AddressUtxos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

fn default_derivation() -> u32 {
    DEFAULT_DERIVATION
}

impl Wallet {
    /// Fresh wallet with index 0 issued as the root address
    pub fn new(
        network: Network,
        mnemonic: String,
        derivation_path: u32,
        root_address: String,
        description: Option<String>,
    ) -> Self {
        Self {
            network,
            mnemonic,
            derivation_path,
            addresses: vec![(0, root_address.clone())],
            root_address,
            next_address_index: 1,
            balance: 0.0,
            confirmed_balance: 0.0,
            unconfirmed_balance: 0.0,
            addresses_with_balance: Vec::new(),
            plain_utxos: Vec::new(),
            token_utxos: Vec::new(),
            description,
            last_synced: None,
        }
    }

    /// Add an `(index, address)` pair unless the index is already known.
    /// Returns true when the pair was added.
    pub fn record_address(&mut self, index: u32, address: String) -> bool {
        match self.addresses.binary_search_by_key(&index, |(i, _)| *i) {
            Ok(_) => false,
            Err(pos) => {
                self.addresses.insert(pos, (index, address));
                true
            }
        }
    }

    pub fn address_at(&self, index: u32) -> Option<&str> {
        self.addresses
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, a)| a.as_str())
    }

    /// Reject indexes that were never issued
    pub fn ensure_issued(&self, index: u32) -> Result<(), WalletError> {
        if index >= self.next_address_index {
            return Err(WalletError::InvalidInput(format!(
                "You must specify an index between 0 and {}.",
                self.next_address_index.saturating_sub(1)
            )));
        }
        Ok(())
    }

    pub fn plain_utxo_iter(&self) -> impl Iterator<Item = &Utxo> {
        self.plain_utxos.iter().flat_map(|group| group.utxos.iter())
    }

    pub fn token_utxo_iter(&self) -> impl Iterator<Item = &Utxo> {
        self.token_utxos.iter().flat_map(|group| group.utxos.iter())
    }

    /// Token UTXOs of one token id, minting batons excluded
    pub fn token_utxos_for(&self, token_id: &str) -> Vec<Utxo> {
        self.token_utxo_iter()
            .filter(|u| {
                u.token
                    .as_ref()
                    .map(|t| t.token_id == token_id && t.utxo_type == UtxoType::Token)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub fn has_tokens_at(&self, address: &str) -> bool {
        self.token_utxos
            .iter()
            .any(|group| group.address == address && !group.utxos.is_empty())
    }

    pub fn balance_at(&self, address: &str) -> f64 {
        self.addresses_with_balance
            .iter()
            .find(|b| b.address == address)
            .map(|b| sats_to_bch(b.total_sats()))
            .unwrap_or(0.0)
    }
}

/// Balance of one address with on-chain activity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddressBalance {
    pub index: u32,
    pub address: String,
    pub confirmed_sats: i64,
    /// Negative while an unconfirmed spend is pending
    pub unconfirmed_sats: i64,
}

impl AddressBalance {
    pub fn total_sats(&self) -> i64 {
        self.confirmed_sats + self.unconfirmed_sats
    }
}

/// UTXOs grouped by owning address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddressUtxos {
    pub address: String,
    pub utxos: Vec<Utxo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub transaction_id: String,
    pub output_index: u32,
    pub value_sats: u64,
    pub owner_address: String,
    pub derivation_index: u32,
    #[serde(default)]
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenMetadata>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UtxoType {
    Token,
    MintingBaton,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub token_id: String,
    pub token_ticker: String,
    pub token_name: String,
    #[serde(default)]
    pub token_document_url: String,
    #[serde(default)]
    pub token_document_hash: String,
    pub decimals: u8,
    /// 1 fungible, 65 NFT child, 129 NFT group
    pub token_type: u8,
    pub utxo_type: UtxoType,
    /// Quantity in display units, e.g. `"983.6"`
    pub token_qty: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Wallet {
        Wallet::new(
            Network::Mainnet,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about".into(),
            DEFAULT_DERIVATION,
            "bitcoincash:qrpkufwnfdzp8cnxzer8d8fkhqmh0zyphq6u3gx6e3".into(),
            None,
        )
    }

    #[test]
    fn test_new_wallet_shape() {
        let wallet = sample();
        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["network"], "mainnet");
        assert_eq!(json["nextAddressIndex"], 1);
        assert_eq!(json["derivation"], 245);
        assert_eq!(json["addresses"][0][0], 0);
        assert!(json["addressesWithBalance"].as_array().unwrap().is_empty());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_record_address_keeps_order_and_uniqueness() {
        let mut wallet = sample();
        assert!(wallet.record_address(2, "b".into()));
        assert!(wallet.record_address(1, "a".into()));
        assert!(!wallet.record_address(1, "other".into()));
        let indexes: Vec<u32> = wallet.addresses.iter().map(|(i, _)| *i).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(wallet.address_at(1), Some("a"));
    }

    #[test]
    fn test_ensure_issued() {
        let wallet = sample();
        assert!(wallet.ensure_issued(0).is_ok());
        let err = wallet.ensure_issued(1).unwrap_err();
        assert_eq!(err.to_string(), "You must specify an index between 0 and 0.");
    }

    #[test]
    fn test_reads_legacy_field_names() {
        let json = r#"{
            "network": "testnet",
            "mnemonic": "words",
            "derivation": 145,
            "nextAddress": 4,
            "balanceConfirmed": 0.5
        }"#;
        let wallet: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(wallet.network, Network::Testnet);
        assert_eq!(wallet.derivation_path, 145);
        assert_eq!(wallet.next_address_index, 4);
        assert_eq!(wallet.confirmed_balance, 0.5);
        assert!(wallet.addresses.is_empty());
    }
}
