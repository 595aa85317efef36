//! Indexer client
//!
//! The wallet never talks to a full node. Balances, UTXOs, SLP validity and
//! broadcast all go through a bch-api compatible REST service.

mod rest;
pub mod types;

use async_trait::async_trait;

use crate::error::WalletError;

pub use rest::RestIndexer;
pub use types::{
    AddressBalanceEntry, AddressUtxoEntry, ElectrumBalance, ElectrumUtxo, HydratedAddressUtxos,
    HydratedUtxo, UtxoClass,
};

/// Maximum number of addresses per indexer call
pub const MAX_BATCH: usize = 20;

#[async_trait]
pub trait Indexer: Send + Sync {
    /// Confirmed and unconfirmed balance of up to [`MAX_BATCH`] addresses
    async fn balances(&self, addresses: &[String]) -> Result<Vec<AddressBalanceEntry>, WalletError>;

    /// Unspent outputs of up to [`MAX_BATCH`] addresses
    async fn utxos(&self, addresses: &[String]) -> Result<Vec<AddressUtxoEntry>, WalletError>;

    /// Annotate UTXOs with SLP token data and validity
    async fn hydrate_utxos(
        &self,
        utxos: &[AddressUtxoEntry],
    ) -> Result<Vec<HydratedAddressUtxos>, WalletError>;

    /// Broadcast a serialized transaction, returning its txid
    async fn broadcast(&self, tx_hex: &str) -> Result<String, WalletError>;
}

pub(crate) fn check_batch(addresses: &[String]) -> Result<(), WalletError> {
    if addresses.len() > MAX_BATCH {
        return Err(WalletError::InvalidInput(format!(
            "limit must be {} or less, got {} addresses",
            MAX_BATCH,
            addresses.len()
        )));
    }
    Ok(())
}
