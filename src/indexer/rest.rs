use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{BalanceResponse, HydrateResponse, UtxoResponse};
use super::{check_batch, AddressBalanceEntry, AddressUtxoEntry, HydratedAddressUtxos, Indexer};
use crate::bch::Network;
use crate::config::WalletConfig;
use crate::error::WalletError;

/// bch-api REST client
#[derive(Clone)]
pub struct RestIndexer {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl RestIndexer {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_token,
        }
    }

    /// Client for the indexer serving `network`
    pub fn for_network(config: &WalletConfig, network: Network) -> Self {
        Self::new(config.rest_url(network), config.api_token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.header(AUTHORIZATION, format!("Token {}", token)),
            None => builder,
        }
    }

    async fn read<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, WalletError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WalletError::Indexer(format!(
                "{} returned {}: {}",
                path, status, error_text
            )));
        }
        response.json::<T>().await.map_err(|e| {
            WalletError::Indexer(format!("Could not decode {} response: {}", path, e))
        })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, WalletError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {}", url);

        let response = self
            .request(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;
        self.read(path, response).await
    }
}

#[async_trait]
impl Indexer for RestIndexer {
    async fn balances(&self, addresses: &[String]) -> Result<Vec<AddressBalanceEntry>, WalletError> {
        check_batch(addresses)?;
        let response: BalanceResponse = self
            .post("electrumx/balance", json!({ "addresses": addresses }))
            .await?;
        if !response.success {
            return Err(WalletError::Indexer("electrumx/balance reported failure".into()));
        }
        Ok(response.balances)
    }

    async fn utxos(&self, addresses: &[String]) -> Result<Vec<AddressUtxoEntry>, WalletError> {
        check_batch(addresses)?;
        let response: UtxoResponse = self
            .post("electrumx/utxos", json!({ "addresses": addresses }))
            .await?;
        if !response.success {
            return Err(WalletError::Indexer("electrumx/utxos reported failure".into()));
        }
        Ok(response.utxos)
    }

    async fn hydrate_utxos(
        &self,
        utxos: &[AddressUtxoEntry],
    ) -> Result<Vec<HydratedAddressUtxos>, WalletError> {
        if utxos.len() > super::MAX_BATCH {
            return Err(WalletError::InvalidInput(format!(
                "limit must be {} or less, got {} addresses",
                super::MAX_BATCH,
                utxos.len()
            )));
        }
        let response: HydrateResponse = self
            .post("slp/hydrateUtxos", json!({ "utxos": utxos }))
            .await?;
        Ok(response.slp_utxos)
    }

    async fn broadcast(&self, tx_hex: &str) -> Result<String, WalletError> {
        let path = format!("rawtransactions/sendRawTransaction/{}", tx_hex);
        let url = format!("{}{}", self.base_url, path);
        log::debug!("Broadcasting transaction to: {}rawtransactions/sendRawTransaction", self.base_url);

        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;
        let txid: String = self
            .read("rawtransactions/sendRawTransaction", response)
            .await?;

        log::info!("Transaction broadcast: {}", txid);
        Ok(txid)
    }
}
