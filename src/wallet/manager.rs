/// Wallet Manager - Orchestration Layer
///
/// Coordinates all wallet operations by delegating to specialized operation modules.
use crate::bch::Network;
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::indexer::{Indexer, RestIndexer};
use crate::storage::{Storage, Wallet};
use crate::wallet::{
    address_ops::{self, AddressInfo, KeyInfo, SignedMessage},
    nft_ops::{self, AddressRow, ChildConfig, ChildCreated, GroupConfig, NftAccounts, NftToken},
    sync_ops::{self, SyncReport},
    token_ops::{self, BroadcastResult},
    wallet_ops::{self, WalletSummary},
};

pub struct WalletManager {
    pub config: WalletConfig,
    pub storage: Storage,
}

impl WalletManager {
    // ============================================================================
    // Constructor
    // ============================================================================

    pub fn new(config: WalletConfig) -> Self {
        let storage = Storage::new_with_base_dir(config.wallets_dir.clone());
        Self { config, storage }
    }

    /// Create WalletManager with custom storage (for testing)
    pub fn new_with_storage(config: WalletConfig, storage: Storage) -> Self {
        Self { config, storage }
    }

    /// Network recorded in a wallet document
    pub fn wallet_network(&self, name: &str) -> Result<Network, WalletError> {
        Ok(self.storage.open(name)?.network)
    }

    /// REST indexer for a network, built from the configured endpoints
    pub fn indexer_for(&self, network: Network) -> RestIndexer {
        RestIndexer::for_network(&self.config, network)
    }

    pub fn open_wallet(&self, name: &str) -> Result<Wallet, WalletError> {
        Ok(self.storage.open(name)?)
    }

    // ============================================================================
    // Wallet Management (delegates to wallet_ops)
    // ============================================================================

    pub fn create_wallet(
        &self,
        name: &str,
        network: Network,
        description: Option<String>,
    ) -> Result<Wallet, WalletError> {
        wallet_ops::create_wallet(&self.storage, name, network, description)
    }

    pub fn list_wallets(&self) -> Result<Vec<WalletSummary>, WalletError> {
        wallet_ops::list_wallets(&self.storage)
    }

    pub fn remove_wallet(&self, name: &str) -> Result<(), WalletError> {
        wallet_ops::remove_wallet(&self.storage, name)
    }

    pub fn get_derivation(&self, name: &str) -> Result<u32, WalletError> {
        wallet_ops::get_derivation(&self.storage, name)
    }

    pub fn set_derivation(&self, name: &str, coin_type: &str) -> Result<Wallet, WalletError> {
        wallet_ops::set_derivation(&self.storage, name, coin_type)
    }

    // ============================================================================
    // Address Management (delegates to address_ops)
    // ============================================================================

    pub fn get_address(&self, name: &str) -> Result<AddressInfo, WalletError> {
        address_ops::get_address(&self.storage, name)
    }

    pub fn get_key(&self, name: &str) -> Result<KeyInfo, WalletError> {
        address_ops::get_key(&self.storage, name)
    }

    pub fn sign_message(
        &self,
        name: &str,
        index: u32,
        message: &str,
    ) -> Result<SignedMessage, WalletError> {
        address_ops::sign_message(&self.storage, name, index, message)
    }

    // ============================================================================
    // Balance & Sync (delegates to sync_ops)
    // ============================================================================

    pub async fn update_balances(
        &self,
        indexer: &dyn Indexer,
        name: &str,
    ) -> Result<SyncReport, WalletError> {
        sync_ops::sync_wallet(&self.storage, indexer, name).await
    }

    // ============================================================================
    // SLP Tokens (delegates to token_ops)
    // ============================================================================

    pub async fn send_tokens(
        &self,
        indexer: &dyn Indexer,
        name: &str,
        token_id: &str,
        qty: &str,
        receiver: &str,
    ) -> Result<BroadcastResult, WalletError> {
        token_ops::send_tokens(&self.storage, indexer, name, token_id, qty, receiver).await
    }

    pub async fn bridge_tokens(
        &self,
        indexer: &dyn Indexer,
        name: &str,
        token_id: &str,
        qty: &str,
        bridge_address: &str,
        avax_address: &str,
    ) -> Result<BroadcastResult, WalletError> {
        token_ops::bridge_tokens(
            &self.storage,
            indexer,
            name,
            token_id,
            qty,
            bridge_address,
            avax_address,
        )
        .await
    }

    // ============================================================================
    // NFT (delegates to nft_ops)
    // ============================================================================

    pub async fn nft_create_group(
        &self,
        indexer: &dyn Indexer,
        name: &str,
        accounts: NftAccounts,
        config: &GroupConfig,
    ) -> Result<BroadcastResult, WalletError> {
        nft_ops::create_group(&self.storage, indexer, name, accounts, config).await
    }

    pub async fn nft_create_child(
        &self,
        indexer: &dyn Indexer,
        name: &str,
        accounts: NftAccounts,
        config: &ChildConfig,
    ) -> Result<ChildCreated, WalletError> {
        nft_ops::create_child(&self.storage, indexer, name, accounts, config).await
    }

    pub async fn nft_remove_child(
        &self,
        indexer: &dyn Indexer,
        name: &str,
        accounts: NftAccounts,
        token_id: &str,
    ) -> Result<BroadcastResult, WalletError> {
        nft_ops::remove_child(&self.storage, indexer, name, accounts, token_id).await
    }

    pub async fn nft_list_tokens(
        &self,
        indexer: &dyn Indexer,
        name: &str,
        index: u32,
        groups: bool,
    ) -> Result<Vec<NftToken>, WalletError> {
        nft_ops::list_tokens(&self.storage, indexer, name, index, groups).await
    }

    pub async fn nft_list_addresses(
        &self,
        indexer: &dyn Indexer,
        name: &str,
    ) -> Result<Vec<AddressRow>, WalletError> {
        nft_ops::list_addresses(&self.storage, indexer, name).await
    }
}
