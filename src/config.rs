/// Wallet configuration from environment variables
///
/// Selects the indexer REST endpoints, the optional API token and the
/// directory holding wallet documents. Defaults to the fullstack.cash
/// infrastructure.

use std::env;
use std::path::PathBuf;

use crate::bch::Network;

/// Known indexer deployments
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestApi {
    FullStack,
    Local,
    Decatur,
}

impl RestApi {
    fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "local" => RestApi::Local,
            "decatur" => RestApi::Decatur,
            "fullstack.cash" | "fullstack" | "bchjs" | "" => RestApi::FullStack,
            other => {
                log::warn!("⚠️  Unknown RESTAPI '{}', defaulting to fullstack.cash", other);
                RestApi::FullStack
            }
        }
    }

    /// (mainnet, testnet) base URLs
    fn urls(&self) -> (&'static str, &'static str) {
        match self {
            RestApi::FullStack => (
                "https://bchn.fullstack.cash/v5/",
                "https://testnet3.fullstack.cash/v5/",
            ),
            RestApi::Local => ("http://127.0.0.1:3000/v5/", "http://127.0.0.1:4000/v5/"),
            RestApi::Decatur => (
                "http://decatur.hopto.org:12400/v4/",
                "http://decatur.hopto.org:13400/v4/",
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WalletConfig {
    pub rest_api: RestApi,
    /// Indexer base URL for mainnet wallets
    pub mainnet_rest: String,
    /// Indexer base URL for testnet wallets
    pub testnet_rest: String,
    /// JWT sent as `Authorization: Token <jwt>`
    pub api_token: Option<String>,
    /// Directory holding `<name>.json` wallet documents
    pub wallets_dir: PathBuf,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `RESTAPI`: "fullstack.cash" (default), "local" or "decatur"
    /// - `MAINNET_REST` / `TESTNET_REST`: override the preset URLs
    /// - `BCHJSTOKEN`: indexer API token (optional)
    /// - `WALLETS_DIR`: wallet directory (default `./wallets`)
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Use a local indexer (mainnet on :3000, testnet on :4000)
    /// RESTAPI=local slp-wallet update-balances -n alice
    /// ```
    pub fn from_env() -> Self {
        let mut config = Self::from_preset(&env::var("RESTAPI").unwrap_or_default());

        if let Ok(url) = env::var("MAINNET_REST") {
            config.mainnet_rest = url;
        }
        if let Ok(url) = env::var("TESTNET_REST") {
            config.testnet_rest = url;
        }

        config.api_token = env::var("BCHJSTOKEN").ok().filter(|t| !t.trim().is_empty());
        if config.api_token.is_some() {
            log::debug!("Using indexer API token from BCHJSTOKEN");
        }

        if let Ok(dir) = env::var("WALLETS_DIR") {
            if !dir.trim().is_empty() {
                config.wallets_dir = PathBuf::from(dir);
            }
        }

        log::debug!(
            "📡 Indexer: {} (mainnet), {} (testnet)",
            config.mainnet_rest,
            config.testnet_rest
        );
        config
    }

    /// Configuration for a named indexer deployment
    pub fn from_preset(name: &str) -> Self {
        let rest_api = RestApi::from_name(name);
        let (mainnet, testnet) = rest_api.urls();
        Self {
            rest_api,
            mainnet_rest: mainnet.to_string(),
            testnet_rest: testnet.to_string(),
            api_token: None,
            wallets_dir: PathBuf::from("./wallets"),
        }
    }

    /// Indexer base URL for a network
    pub fn rest_url(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet_rest,
            Network::Testnet => &self.testnet_rest,
        }
    }
}

impl Default for WalletConfig {
    /// Default configuration (fullstack.cash)
    fn default() -> Self {
        Self::from_preset("fullstack.cash")
    }
}
