/// Address management operations
///
/// Handles issuing receive addresses and keys, and message signing.
use crate::error::WalletError;
use crate::storage::{DerivedKey, Storage, Wallet};
use crate::wallet::signer::WalletSigner;
use crate::wallet::AddressManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInfo {
    pub index: u32,
    pub cash_address: String,
    pub legacy_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub index: u32,
    pub wif: String,
    pub public_key: String,
    pub cash_address: String,
    pub legacy_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub index: u32,
    pub address: String,
    pub signature: String,
}

/// Derive the key at the cursor and advance it. Any index below the new
/// cursor missing from `addresses` is filled in.
pub fn issue_next_key(wallet: &mut Wallet) -> Result<DerivedKey, WalletError> {
    let account = AddressManager::account(wallet)?;
    let index = wallet.next_address_index;
    let key = account.derive(index)?;

    wallet.next_address_index = index
        .checked_add(1)
        .ok_or_else(|| WalletError::Internal("address index overflow".into()))?;

    for i in 0..=index {
        if wallet.address_at(i).is_none() {
            wallet.record_address(i, account.derive(i)?.cash_address()?);
        }
    }

    Ok(key)
}

/// Issue the next receive address, persisting the advanced cursor
pub fn get_address(storage: &Storage, wallet_name: &str) -> Result<AddressInfo, WalletError> {
    let _lock = storage.lock(wallet_name)?;
    let mut wallet = storage.open(wallet_name)?;

    let key = issue_next_key(&mut wallet)?;
    storage.save(wallet_name, &wallet)?;

    Ok(AddressInfo {
        index: key.index,
        cash_address: key.cash_address()?,
        legacy_address: key.legacy_address()?,
    })
}

/// Issue the next key pair, persisting the advanced cursor
pub fn get_key(storage: &Storage, wallet_name: &str) -> Result<KeyInfo, WalletError> {
    let _lock = storage.lock(wallet_name)?;
    let mut wallet = storage.open(wallet_name)?;

    let key = issue_next_key(&mut wallet)?;
    storage.save(wallet_name, &wallet)?;

    Ok(KeyInfo {
        index: key.index,
        wif: key.wif(),
        public_key: key.public_key_hex(),
        cash_address: key.cash_address()?,
        legacy_address: key.legacy_address()?,
    })
}

/// Sign a message with the key at `index`
pub fn sign_message(
    storage: &Storage,
    wallet_name: &str,
    index: u32,
    message: &str,
) -> Result<SignedMessage, WalletError> {
    if message.is_empty() {
        return Err(WalletError::InvalidInput(
            "You must specify a message to sign with the -m flag.".into(),
        ));
    }
    let wallet = storage.open(wallet_name)?;
    let signer = WalletSigner::new(&wallet)?;

    Ok(SignedMessage {
        index,
        address: AddressManager::derive_address(&wallet, index)?,
        signature: signer.sign_message(index, message)?,
    })
}
