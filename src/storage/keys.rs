use bip39::Mnemonic;
use bitcoin::bip32::{ChildNumber, DerivationPath, Xpriv};
use bitcoin::key::rand;
use bitcoin::secp256k1::{All, Secp256k1, SecretKey};
use bitcoin::{PrivateKey, PublicKey};
use std::str::FromStr;

use crate::bch::address::{encode_pubkey_hash, AddressFormat};
use crate::bch::Network;
use crate::error::WalletError;

pub struct KeyManager;

impl KeyManager {
    /// Generate a new random 12 word mnemonic
    pub fn generate() -> Result<Mnemonic, WalletError> {
        let entropy = rand::random::<[u8; 16]>();

        Mnemonic::from_entropy(&entropy).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
    }

    /// Parse and checksum-validate a mnemonic phrase
    pub fn parse(words: &str) -> Result<Mnemonic, WalletError> {
        Mnemonic::parse(words.trim()).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
    }
}

/// External chain of a BIP44 account: `m/44'/<coin>'/0'/0`.
///
/// Deriving the chain key once keeps batch derivation to a single
/// non-hardened step per address.
pub struct HdAccount {
    chain: Xpriv,
    network: Network,
    secp: Secp256k1<All>,
}

impl HdAccount {
    pub fn new(mnemonic: &str, coin_type: u32, network: Network) -> Result<Self, WalletError> {
        let mnemonic = KeyManager::parse(mnemonic)?;
        let secp = Secp256k1::new();
        let seed = mnemonic.to_seed("");

        let master_key = Xpriv::new_master(network.bitcoin_network(), &seed)
            .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

        let path = DerivationPath::from_str(&format!("m/44'/{}'/0'/0", coin_type))
            .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

        let chain = master_key
            .derive_priv(&secp, &path)
            .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

        Ok(Self {
            chain,
            network,
            secp,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn derive(&self, index: u32) -> Result<DerivedKey, WalletError> {
        let child = ChildNumber::from_normal_idx(index)
            .map_err(|e| WalletError::Bitcoin(e.to_string()))?;
        let derived = self
            .chain
            .derive_priv(&self.secp, &[child])
            .map_err(|e| WalletError::Bitcoin(e.to_string()))?;

        let secret_key = derived.private_key;
        let public_key = PublicKey::new(secret_key.public_key(&self.secp));

        Ok(DerivedKey {
            index,
            secret_key,
            public_key,
            network: self.network,
        })
    }
}

/// Key pair at `m/44'/<coin>'/0'/0/<index>`
pub struct DerivedKey {
    pub index: u32,
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub network: Network,
}

impl DerivedKey {
    pub fn address(&self, format: AddressFormat) -> Result<String, WalletError> {
        encode_pubkey_hash(&self.public_key.pubkey_hash(), self.network, format)
    }

    pub fn cash_address(&self) -> Result<String, WalletError> {
        self.address(AddressFormat::Cash)
    }

    pub fn legacy_address(&self) -> Result<String, WalletError> {
        self.address(AddressFormat::Legacy)
    }

    pub fn wif(&self) -> String {
        PrivateKey::new(self.secret_key, self.network.bitcoin_network()).to_wif()
    }

    pub fn public_key_hex(&self) -> String {
        self.public_key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_is_twelve_words() {
        let mnemonic = KeyManager::generate().unwrap();
        assert_eq!(mnemonic.word_count(), 12);
        assert!(KeyManager::parse(&mnemonic.to_string()).is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        let bad = MNEMONIC.replace("about", "abandon");
        assert!(matches!(
            KeyManager::parse(&bad),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_known_vectors() {
        let account = HdAccount::new(MNEMONIC, 245, Network::Mainnet).unwrap();

        let key0 = account.derive(0).unwrap();
        assert_eq!(
            key0.cash_address().unwrap(),
            "bitcoincash:qrpkufwnfdzp8cnxzer8d8fkhqmh0zyphq6u3gx6e3"
        );
        assert_eq!(key0.legacy_address().unwrap(), "1JpLicDRnpGGrKok2puL8mcys2DxDL6h6v");
        assert_eq!(
            key0.public_key_hex(),
            "02b7c592292d0b7f421bbed28a9b1f3ecade85aecabece883a9c646fd45d2b5072"
        );
        assert_eq!(
            key0.wif(),
            "KysfF1hbdzNTim2niyja9wftkwFEawWBooTtfwp2yatxH6ZWEnwb"
        );

        let key3 = account.derive(3).unwrap();
        assert_eq!(
            key3.wif(),
            "L53WH8BpuibrZMoyyYMSJkZEtVwSUDDENXPXewRo9jJYYue8N8DL"
        );
        assert_eq!(
            key3.public_key_hex(),
            "03aac2130a80749a541fc6443c2349f28805b8f7e0ff540162abd7372ad372149f"
        );
    }

    #[test]
    fn test_testnet_addresses() {
        let account = HdAccount::new(MNEMONIC, 245, Network::Testnet).unwrap();
        let key3 = account.derive(3).unwrap();
        assert_eq!(
            key3.cash_address().unwrap(),
            "bchtest:qr6uw8mgppcgmjwly4afxexx5z5sxef6zq3sradmyt"
        );
        assert_eq!(key3.legacy_address().unwrap(), "n3vWPLcM78HnUy5KYHdziwk47ABsTpYVUy");
    }

    #[test]
    fn test_coin_type_changes_addresses() {
        let account = HdAccount::new(MNEMONIC, 145, Network::Mainnet).unwrap();
        assert_eq!(
            account.derive(0).unwrap().cash_address().unwrap(),
            "bitcoincash:qqyx49mu0kkn9ftfj6hje6g2wfer34yfnq5tahq3q6"
        );
    }
}
