use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network a wallet lives on. Stored in the wallet document as
/// `"mainnet"` or `"testnet"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn from_testnet_flag(testnet: bool) -> Self {
        if testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        }
    }

    /// Network used for BIP32 master keys and WIF encoding
    pub fn bitcoin_network(self) -> bitcoin::Network {
        match self {
            Network::Mainnet => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
        }
    }

    /// Network used for CashAddr prefixes and legacy version bytes
    pub fn address_network(self) -> bitcoincash_addr::Network {
        match self {
            Network::Mainnet => bitcoincash_addr::Network::Main,
            Network::Testnet => bitcoincash_addr::Network::Test,
        }
    }

    /// Block explorer link for a broadcast transaction
    pub fn explorer_url(self, txid: &str) -> String {
        match self {
            Network::Mainnet => format!("https://explorer.bitcoin.com/bch/tx/{}", txid),
            Network::Testnet => format!("https://explorer.bitcoin.com/tbch/tx/{}", txid),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = crate::error::WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" | "bitcoincash" => Ok(Network::Mainnet),
            "testnet" | "test" | "bchtest" => Ok(Network::Testnet),
            other => Err(crate::error::WalletError::InvalidInput(format!(
                "Unknown network '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Network::Mainnet).unwrap(), "\"mainnet\"");
        let parsed: Network = serde_json::from_str("\"testnet\"").unwrap();
        assert_eq!(parsed, Network::Testnet);
    }

    #[test]
    fn test_testnet_flag() {
        assert_eq!(Network::from_testnet_flag(false), Network::Mainnet);
        assert_eq!(Network::from_testnet_flag(true), Network::Testnet);
        assert!(matches!(
            Network::Testnet.bitcoin_network(),
            bitcoin::Network::Testnet
        ));
    }
}
