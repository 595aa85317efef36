//! Address encoding
//!
//! Wallet addresses are P2PKH and stored in CashAddr form
//! (`bitcoincash:q...` / `bchtest:q...`). Legacy base58 is produced for
//! display and accepted anywhere an address is parsed.

use bitcoin::hashes::Hash;
use bitcoin::{PubkeyHash, ScriptBuf, ScriptHash};
use bitcoincash_addr::{Address, HashType, Scheme};

use super::Network;
use crate::error::WalletError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFormat {
    #[default]
    Cash,
    Legacy,
}

impl AddressFormat {
    fn scheme(self) -> Scheme {
        match self {
            AddressFormat::Cash => Scheme::CashAddr,
            AddressFormat::Legacy => Scheme::Base58,
        }
    }
}

/// Encode a 20 byte public key hash as a P2PKH address
pub fn encode_pubkey_hash(
    hash: &PubkeyHash,
    network: Network,
    format: AddressFormat,
) -> Result<String, WalletError> {
    let address = Address::new(
        hash.to_byte_array().to_vec(),
        format.scheme(),
        HashType::Key,
        network.address_network(),
    );
    address
        .encode()
        .map_err(|e| WalletError::Bitcoin(format!("Address encoding failed: {:?}", e)))
}

fn decode(address: &str) -> Result<Address, WalletError> {
    let trimmed = address.trim();
    Address::decode(trimmed).map_err(|(cash_err, base58_err)| {
        WalletError::InvalidAddress(format!(
            "{} (cashaddr: {:?}, base58: {:?})",
            trimmed, cash_err, base58_err
        ))
    })
}

fn reencode(address: &str, scheme: Scheme) -> Result<String, WalletError> {
    let mut decoded = decode(address)?;
    decoded.scheme = scheme;
    decoded
        .encode()
        .map_err(|e| WalletError::Bitcoin(format!("Address encoding failed: {:?}", e)))
}

/// Convert a legacy or CashAddr address to CashAddr
pub fn to_cash_address(address: &str) -> Result<String, WalletError> {
    reencode(address, Scheme::CashAddr)
}

/// Convert a legacy or CashAddr address to legacy base58
pub fn to_legacy_address(address: &str) -> Result<String, WalletError> {
    reencode(address, Scheme::Base58)
}

/// Format check for a user supplied destination address
pub fn ensure_valid(address: &str) -> Result<(), WalletError> {
    let decoded = decode(address)?;
    if decoded.body.len() != 20 {
        return Err(WalletError::InvalidAddress(format!(
            "{} has a {} byte hash",
            address,
            decoded.body.len()
        )));
    }
    Ok(())
}

pub fn is_valid(address: &str) -> bool {
    ensure_valid(address).is_ok()
}

/// Network encoded in an address prefix or version byte
pub fn network_of(address: &str) -> Result<Network, WalletError> {
    let decoded = decode(address)?;
    match decoded.network {
        bitcoincash_addr::Network::Main => Ok(Network::Mainnet),
        _ => Ok(Network::Testnet),
    }
}

/// Locking script paying to an address (P2PKH or P2SH)
pub fn script_pubkey(address: &str) -> Result<ScriptBuf, WalletError> {
    ensure_valid(address)?;
    let decoded = decode(address)?;
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&decoded.body);

    let script = match decoded.hash_type {
        HashType::Key => ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(hash)),
        HashType::Script => ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(hash)),
    };
    Ok(script)
}
