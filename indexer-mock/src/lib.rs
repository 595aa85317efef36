/// Indexer Mock Server Library
///
/// In-memory stand-in for a bch-api v5 indexer: ElectrumX balance and UTXO
/// queries, SLP hydration and raw transaction broadcast.

pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use server::{create_router, run_server, spawn_ephemeral};
pub use state::{Ledger, MockState, SlpVerdict};
pub use types::*;
