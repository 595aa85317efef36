//! Storage and persistence layer
//!
//! - Wallet documents on the file system
//! - Mnemonic and HD key management
//! - Data models

mod file_system;
mod keys;
mod models;

pub use file_system::{Storage, WalletLock};
pub use keys::{DerivedKey, HdAccount, KeyManager};
pub use models::{
    AddressBalance, AddressUtxos, TokenMetadata, Utxo, UtxoType, Wallet, DEFAULT_DERIVATION,
};
