use crate::error::WalletError;
use crate::indexer::MAX_BATCH;
use crate::storage::{DerivedKey, HdAccount, Wallet};

pub struct AddressManager;

impl AddressManager {
    /// HD account for a wallet's mnemonic, coin type and network
    pub fn account(wallet: &Wallet) -> Result<HdAccount, WalletError> {
        if wallet.mnemonic.trim().is_empty() {
            return Err(WalletError::MissingMnemonic(
                "cannot derive addresses without a mnemonic".into(),
            ));
        }
        HdAccount::new(&wallet.mnemonic, wallet.derivation_path, wallet.network)
    }

    /// Derive the key pair at the specified index
    pub fn derive_key(wallet: &Wallet, index: u32) -> Result<DerivedKey, WalletError> {
        Self::account(wallet)?.derive(index)
    }

    /// Derive the CashAddr address at the specified index
    pub fn derive_address(wallet: &Wallet, index: u32) -> Result<String, WalletError> {
        Self::derive_key(wallet, index)?.cash_address()
    }

    /// Derive `count` consecutive addresses, returning (index, address) pairs
    pub fn derive_addresses(
        account: &HdAccount,
        start: u32,
        count: u32,
    ) -> Result<Vec<(u32, String)>, WalletError> {
        if count as usize > MAX_BATCH {
            return Err(WalletError::InvalidInput(format!(
                "limit must be {} or less.",
                MAX_BATCH
            )));
        }
        let mut addresses = Vec::with_capacity(count as usize);

        for i in 0..count {
            let index = start
                .checked_add(i)
                .ok_or_else(|| WalletError::InvalidInput("address index overflow".into()))?;
            addresses.push((index, account.derive(index)?.cash_address()?));
        }

        Ok(addresses)
    }
}
