//! Bitcoin Cash primitives
//!
//! - Network selection
//! - CashAddr / legacy address encoding
//! - Satoshi and token quantity units
//! - SLP and memo OP_RETURN scripts
//! - Transaction building and FORKID signature digests

pub mod address;
pub mod network;
pub mod slp;
pub mod transaction;
pub mod units;

pub use address::AddressFormat;
pub use network::Network;
pub use transaction::{TransactionBuilder, DUST_SATS, TX_FEE_SATS};
