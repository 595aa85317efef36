/// In-memory ledger backing the mock indexer
///
/// Holds balances and UTXOs per address, SLP verdicts per outpoint and every
/// broadcast transaction. Tests seed it directly; the binary can preload it
/// from a JSON fixture.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::types::{ElectrumBalance, ElectrumUtxo, SlpInfo};

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Could not read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fixture: {0}")]
    Json(#[from] serde_json::Error),
}

/// SLP validator verdict for one outpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum SlpVerdict {
    Token(SlpInfo),
    Unvalidated,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub balances: HashMap<String, ElectrumBalance>,
    #[serde(default)]
    pub utxos: HashMap<String, Vec<ElectrumUtxo>>,
    /// Keyed by `txid:vout`. Outpoints without an entry are plain BCH.
    #[serde(default)]
    pub slp: HashMap<String, SlpVerdict>,
    #[serde(default)]
    pub broadcasts: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    ledger: Mutex<Ledger>,
    failing: Mutex<bool>,
    requests: Mutex<Vec<String>>,
}

fn outpoint(txid: &str, vout: u32) -> String {
    format!("{}:{}", txid, vout)
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            ..Self::default()
        }
    }

    /// Load a ledger from a JSON fixture file
    pub fn from_fixture(path: &Path) -> Result<Self, FixtureError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_ledger(serde_json::from_str(&contents)?))
    }

    pub(crate) fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_balance(&self, address: &str, confirmed: i64, unconfirmed: i64) {
        self.ledger().balances.insert(
            address.to_string(),
            ElectrumBalance {
                confirmed,
                unconfirmed,
            },
        );
    }

    /// Add a plain BCH output to an address, crediting its confirmed balance
    pub fn add_utxo(&self, address: &str, txid: &str, vout: u32, value: u64) {
        let mut ledger = self.ledger();
        ledger
            .utxos
            .entry(address.to_string())
            .or_default()
            .push(ElectrumUtxo {
                height: 700_000,
                tx_hash: txid.to_string(),
                tx_pos: vout,
                value,
            });
        ledger.balances.entry(address.to_string()).or_default().confirmed += value as i64;
    }

    /// Add a validated SLP token output
    pub fn add_token_utxo(&self, address: &str, txid: &str, vout: u32, slp: SlpInfo) {
        self.add_utxo(address, txid, vout, 546);
        self.ledger()
            .slp
            .insert(outpoint(txid, vout), SlpVerdict::Token(slp));
    }

    /// Mark an existing outpoint as not yet validated
    pub fn mark_unvalidated(&self, txid: &str, vout: u32) {
        self.ledger()
            .slp
            .insert(outpoint(txid, vout), SlpVerdict::Unvalidated);
    }

    pub fn verdict(&self, txid: &str, vout: u32) -> Option<SlpVerdict> {
        self.ledger().slp.get(&outpoint(txid, vout)).cloned()
    }

    /// Make every indexer endpoint answer 500 until cleared
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    pub fn is_failing(&self) -> bool {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn record_request(&self, route: &str) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route.to_string());
    }

    /// Routes served so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Raw transactions broadcast so far, in order
    pub fn broadcasts(&self) -> Vec<String> {
        self.ledger().broadcasts.clone()
    }

    /// Record a broadcast and return a txid for it
    pub(crate) fn accept_broadcast(&self, tx_hex: &str) -> String {
        let mut ledger = self.ledger();
        ledger.broadcasts.push(tx_hex.to_string());
        format!("{:064x}", ledger.broadcasts.len())
    }
}
