//! Common test utilities for wallet integration tests
//!
//! This module provides shared test infrastructure including:
//! - Test environment setup over a temporary wallet directory
//! - An in-memory indexer with scripted UTXOs, SLP verdicts and failures
//! - Fixture wallets built from the `abandon ... about` mnemonic
#![allow(dead_code)]

use async_trait::async_trait;
use bitcoin::Transaction;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

use slp_wallet::indexer::{
    AddressBalanceEntry, AddressUtxoEntry, ElectrumBalance, ElectrumUtxo, HydratedAddressUtxos,
    HydratedUtxo, Indexer,
};
use slp_wallet::storage::{HdAccount, Storage, Wallet};
use slp_wallet::wallet::AddressManager;
use slp_wallet::{Network, WalletConfig, WalletError, WalletManager};

pub const MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub const PSID_TOKEN_ID: &str = "a4fb5c2da1aa064e25018a43f9165040071d9e984ba190c222a7f59053af84b2";

/// Test environment with automatic cleanup
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub manager: WalletManager,
    pub indexer: MockIndexer,
}

impl TestEnvironment {
    pub fn new() -> anyhow::Result<Self> {
        env_logger::builder().is_test(true).try_init().ok();

        let temp_dir = TempDir::new()?;
        log::info!("📁 Test directory: {:?}", temp_dir.path());

        let storage = Storage::new_with_base_dir(temp_dir.path().to_path_buf());
        let manager = WalletManager::new_with_storage(WalletConfig::default(), storage);

        Ok(Self {
            temp_dir,
            manager,
            indexer: MockIndexer::default(),
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.manager.storage
    }

    /// Store a wallet for the fixture mnemonic with `next_index` addresses issued
    pub fn fixture_wallet(
        &self,
        name: &str,
        network: Network,
        next_index: u32,
    ) -> anyhow::Result<Wallet> {
        let account = HdAccount::new(MNEMONIC, 245, network)?;
        let root = account.derive(0)?.cash_address()?;
        let mut wallet = Wallet::new(network, MNEMONIC.to_string(), 245, root, None);
        wallet.next_address_index = next_index;
        for index in 0..next_index {
            wallet.record_address(index, account.derive(index)?.cash_address()?);
        }
        self.storage().create(name, &wallet)?;
        Ok(wallet)
    }

    pub fn address(&self, wallet: &Wallet, index: u32) -> String {
        AddressManager::derive_address(wallet, index).unwrap()
    }

    pub fn raw_file(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.storage().wallet_path(name)).unwrap()
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        log::info!("🧹 Cleaning up test directory: {:?}", self.temp_dir.path());
    }
}

/// Token fields for a hydrated UTXO
#[derive(Debug, Clone)]
pub struct TokenSpec {
    pub token_id: String,
    pub ticker: String,
    pub decimals: u8,
    pub token_type: u8,
    pub utxo_type: &'static str,
    pub qty: String,
}

impl TokenSpec {
    pub fn fungible(token_id: &str, ticker: &str, decimals: u8, qty: &str) -> Self {
        Self {
            token_id: token_id.to_string(),
            ticker: ticker.to_string(),
            decimals,
            token_type: 1,
            utxo_type: "token",
            qty: qty.to_string(),
        }
    }

    pub fn nft_group(group_id: &str, qty: &str) -> Self {
        Self {
            token_type: 0x81,
            ..Self::fungible(group_id, "CLIG", 0, qty)
        }
    }

    pub fn nft_child(token_id: &str) -> Self {
        Self {
            token_type: 0x41,
            ..Self::fungible(token_id, "CLIC", 0, "1")
        }
    }

    pub fn baton(mut self) -> Self {
        self.utxo_type = "minting-baton";
        self
    }
}

/// In-memory indexer.
///
/// Balances follow the UTXOs added unless overridden with `set_balance`.
#[derive(Default)]
pub struct MockIndexer {
    balances: Mutex<HashMap<String, ElectrumBalance>>,
    utxos: Mutex<HashMap<String, Vec<HydratedUtxo>>>,
    calls: Mutex<Vec<String>>,
    broadcasts: Mutex<Vec<Transaction>>,
    /// Fail the n-th balances call (1-based)
    fail_balances_call: Mutex<Option<usize>>,
    /// Addresses whose UTXOs the hydration endpoint leaves out
    unhydrated: Mutex<Vec<String>>,
    /// Report a confirmed balance for every address asked about
    balance_everywhere: Mutex<bool>,
}

impl MockIndexer {
    fn push(&self, address: &str, utxo: HydratedUtxo) {
        self.balances
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .confirmed += utxo.value as i64;
        self.utxos
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .push(utxo);
    }

    fn base(txid_byte: u8, vout: u32, value: u64) -> HydratedUtxo {
        HydratedUtxo {
            height: 700_000,
            tx_hash: hex::encode([txid_byte; 32]),
            tx_pos: vout,
            value,
            ..Default::default()
        }
    }

    /// Plain BCH output, validated as non-SLP
    pub fn fund(&self, address: &str, txid_byte: u8, vout: u32, value: u64) {
        self.push(
            address,
            HydratedUtxo {
                is_valid: Some(false),
                ..Self::base(txid_byte, vout, value)
            },
        );
    }

    /// 546 sat token output
    pub fn add_token(&self, address: &str, txid_byte: u8, vout: u32, token: TokenSpec) {
        self.push(
            address,
            HydratedUtxo {
                is_valid: Some(true),
                token_id: Some(token.token_id),
                token_ticker: Some(token.ticker.clone()),
                token_name: Some(format!("{} token", token.ticker)),
                decimals: Some(token.decimals),
                token_type: Some(token.token_type),
                utxo_type: Some(token.utxo_type.to_string()),
                token_qty: Some(token.qty),
                ..Self::base(txid_byte, vout, 546)
            },
        );
    }

    /// Output the SLP validator has no verdict for
    pub fn add_unvalidated(&self, address: &str, txid_byte: u8, vout: u32, value: u64) {
        self.push(address, Self::base(txid_byte, vout, value));
    }

    pub fn set_balance(&self, address: &str, confirmed: i64, unconfirmed: i64) {
        self.balances.lock().unwrap().insert(
            address.to_string(),
            ElectrumBalance {
                confirmed,
                unconfirmed,
            },
        );
    }

    pub fn fail_on_balances_call(&self, call: usize) {
        *self.fail_balances_call.lock().unwrap() = Some(call);
    }

    pub fn omit_from_hydration(&self, address: &str) {
        self.unhydrated.lock().unwrap().push(address.to_string());
    }

    pub fn report_balance_everywhere(&self) {
        *self.balance_everywhere.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.broadcasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    async fn balances(&self, addresses: &[String]) -> Result<Vec<AddressBalanceEntry>, WalletError> {
        self.calls.lock().unwrap().push("balances".into());
        let call = self.count("balances");
        if *self.fail_balances_call.lock().unwrap() == Some(call) {
            return Err(WalletError::Indexer("electrumx/balance returned 503".into()));
        }

        let everywhere = *self.balance_everywhere.lock().unwrap();
        let balances = self.balances.lock().unwrap();
        Ok(addresses
            .iter()
            .map(|address| AddressBalanceEntry {
                address: address.clone(),
                balance: match balances.get(address) {
                    Some(balance) => balance.clone(),
                    None if everywhere => ElectrumBalance {
                        confirmed: 546,
                        unconfirmed: 0,
                    },
                    None => ElectrumBalance::default(),
                },
            })
            .collect())
    }

    async fn utxos(&self, addresses: &[String]) -> Result<Vec<AddressUtxoEntry>, WalletError> {
        self.calls.lock().unwrap().push("utxos".into());
        let utxos = self.utxos.lock().unwrap();
        Ok(addresses
            .iter()
            .map(|address| AddressUtxoEntry {
                address: address.clone(),
                utxos: utxos
                    .get(address)
                    .map(|list| {
                        list.iter()
                            .map(|u| ElectrumUtxo {
                                height: u.height,
                                tx_hash: u.tx_hash.clone(),
                                tx_pos: u.tx_pos,
                                value: u.value,
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn hydrate_utxos(
        &self,
        entries: &[AddressUtxoEntry],
    ) -> Result<Vec<HydratedAddressUtxos>, WalletError> {
        self.calls.lock().unwrap().push("hydrate".into());
        let utxos = self.utxos.lock().unwrap();
        let unhydrated = self.unhydrated.lock().unwrap();
        Ok(entries
            .iter()
            .map(|entry| HydratedAddressUtxos {
                address: entry.address.clone(),
                utxos: if unhydrated.contains(&entry.address) {
                    Vec::new()
                } else {
                    utxos.get(&entry.address).cloned().unwrap_or_default()
                },
            })
            .collect())
    }

    async fn broadcast(&self, tx_hex: &str) -> Result<String, WalletError> {
        self.calls.lock().unwrap().push("broadcast".into());
        let bytes = hex::decode(tx_hex).map_err(|e| WalletError::Indexer(e.to_string()))?;
        let tx: Transaction = bitcoin::consensus::deserialize(&bytes)
            .map_err(|e| WalletError::Indexer(e.to_string()))?;
        let txid = tx.compute_txid().to_string();
        self.broadcasts.lock().unwrap().push(tx);
        Ok(txid)
    }
}
