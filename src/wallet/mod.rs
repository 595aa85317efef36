/// Wallet Core Module
///
/// Modular wallet implementation with clear separation of concerns:
///
/// - `manager.rs` - Orchestrator for all wallet operations
/// - `wallet_ops.rs` - Wallet lifecycle and derivation path
/// - `address_ops.rs` - Address and key issuing, message signing
/// - `sync_ops.rs` - Balance and UTXO synchronization
/// - `token_ops.rs` - SLP token send and bridge send
/// - `nft_ops.rs` - NFT group and child tokens
/// - `address_manager.rs` / `signer.rs` - Derivation and input signing

// Shared components
pub mod address_manager;
pub mod signer;

// Operation modules
pub mod address_ops;
pub mod nft_ops;
pub mod sync_ops;
pub mod token_ops;
pub mod wallet_ops;

// Main manager (orchestrator)
pub mod manager;

pub use address_manager::AddressManager;
pub use manager::WalletManager;
pub use signer::{SignedTransaction, WalletSigner};
