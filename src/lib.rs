//! slp-wallet: HD wallet for Bitcoin Cash and SLP tokens
//!
//! A command-line wallet that keeps one JSON document per wallet on disk,
//! derives BIP44 receiving addresses from the stored mnemonic, and talks to a
//! bch-api compatible indexer for balances, UTXOs, SLP hydration and broadcast.
//!
//! # Architecture
//!
//! - **Storage**: wallet documents, scoped locking and atomic writes
//! - **Indexer**: REST client behind the [`indexer::Indexer`] trait
//! - **Synchronizer**: batch scan of derived addresses into balances and UTXO sets
//! - **Assemblers**: token send, NFT group/child and bridge transactions
//! - **CLI**: thin command handlers that print results
//!
//! # Example
//!
//! ```ignore
//! use slp_wallet::{WalletConfig, WalletManager};
//!
//! let manager = WalletManager::new(WalletConfig::from_env());
//! let network = manager.wallet_network("alice")?;
//! let indexer = manager.indexer_for(network);
//! let report = manager.update_balances(&indexer, "alice").await?;
//! println!("Updated balance: {} BCH", report.balance);
//! ```

pub mod bch;
pub mod cli;
pub mod config;
pub mod error;
pub mod indexer;
pub mod storage;
pub mod wallet;

pub use bch::Network;
pub use config::WalletConfig;
pub use error::{StorageError, WalletError};
pub use indexer::{Indexer, RestIndexer};
pub use storage::{Storage, Wallet};
pub use wallet::WalletManager;
