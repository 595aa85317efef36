/// Wallet lifecycle operations
///
/// Handles wallet creation, listing, removal and the derivation coin type.
use crate::bch::Network;
use crate::error::{StorageError, WalletError};
use crate::storage::{HdAccount, KeyManager, Storage, Wallet, DEFAULT_DERIVATION};

/// Row of the `list-wallets` table
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSummary {
    pub name: String,
    pub network: Network,
    pub balance: f64,
}

/// Create a new wallet with a generated mnemonic
pub fn create_wallet(
    storage: &Storage,
    name: &str,
    network: Network,
    description: Option<String>,
) -> Result<Wallet, WalletError> {
    if storage.wallet_exists(name) {
        return Err(WalletError::WalletExists(
            storage.wallet_path(name).display().to_string(),
        ));
    }

    let mnemonic = KeyManager::generate()?.to_string();
    let root_address = HdAccount::new(&mnemonic, DEFAULT_DERIVATION, network)?
        .derive(0)?
        .cash_address()?;

    let wallet = Wallet::new(
        network,
        mnemonic,
        DEFAULT_DERIVATION,
        root_address,
        description.filter(|d| !d.trim().is_empty()),
    );

    storage.create(name, &wallet).map_err(|e| match e {
        StorageError::AlreadyExists(path) => WalletError::WalletExists(path),
        other => other.into(),
    })?;

    log::info!("Created {} wallet {}", network, name);
    Ok(wallet)
}

/// List all wallets. Unreadable documents are logged and skipped.
pub fn list_wallets(storage: &Storage) -> Result<Vec<WalletSummary>, WalletError> {
    let wallet_names = storage.list_wallets()?;
    let mut wallets = Vec::new();

    for name in wallet_names {
        match storage.open(&name) {
            Ok(wallet) => wallets.push(WalletSummary {
                name,
                network: wallet.network,
                balance: wallet.balance,
            }),
            Err(e) => log::warn!("Skipping {}: {}", name, e),
        }
    }

    Ok(wallets)
}

/// Delete a wallet document
pub fn remove_wallet(storage: &Storage, name: &str) -> Result<(), WalletError> {
    if !storage.wallet_exists(name) {
        return Err(WalletError::WalletNotFound(
            storage.wallet_path(name).display().to_string(),
        ));
    }

    let _lock = storage.lock(name)?;
    log::warn!("Deleting wallet: {}", name);
    storage.delete_wallet(name)?;

    Ok(())
}

/// Coin type used in `m/44'/<coin>'/0'/0/<index>`
pub fn get_derivation(storage: &Storage, name: &str) -> Result<u32, WalletError> {
    Ok(storage.open(name)?.derivation_path)
}

/// Change the coin type. Cached addresses are re-derived for the new path
/// and balance data is cleared until the next sync.
pub fn set_derivation(storage: &Storage, name: &str, coin_type: &str) -> Result<Wallet, WalletError> {
    let coin_type: u32 = coin_type
        .trim()
        .parse()
        .map_err(|_| WalletError::InvalidInput("Derivation path must be an integer".into()))?;
    if coin_type >= 0x8000_0000 {
        return Err(WalletError::InvalidInput(
            "Derivation path must be an integer".into(),
        ));
    }

    let _lock = storage.lock(name)?;
    let mut wallet = storage.open(name)?;
    if wallet.derivation_path == coin_type {
        return Ok(wallet);
    }

    let account = HdAccount::new(&wallet.mnemonic, coin_type, wallet.network)?;
    wallet.derivation_path = coin_type;
    wallet.root_address = account.derive(0)?.cash_address()?;
    for (index, address) in wallet.addresses.iter_mut() {
        *address = account.derive(*index)?.cash_address()?;
    }
    wallet.balance = 0.0;
    wallet.confirmed_balance = 0.0;
    wallet.unconfirmed_balance = 0.0;
    wallet.addresses_with_balance.clear();
    wallet.plain_utxos.clear();
    wallet.token_utxos.clear();
    wallet.last_synced = None;

    storage.save(name, &wallet)?;
    log::info!("Derivation path for {} set to m/44'/{}'/0'", name, coin_type);
    Ok(wallet)
}
