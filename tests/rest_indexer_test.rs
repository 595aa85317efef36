/// Integration tests for the REST indexer client
///
/// Runs the wallet against the bch-api mock served on an ephemeral port.
mod common;

use std::sync::Arc;

use common::{TestEnvironment, PSID_TOKEN_ID};
use indexer_mock::{spawn_ephemeral, MockState, SlpInfo};
use slp_wallet::indexer::{AddressUtxoEntry, ElectrumUtxo, UtxoClass};
use slp_wallet::{Indexer, Network, RestIndexer, WalletConfig, WalletError, WalletManager};

const ADDRESS_0: &str = "bitcoincash:qrpkufwnfdzp8cnxzer8d8fkhqmh0zyphq6u3gx6e3";
const ADDRESS_1: &str = "bitcoincash:qpjg998fw285wj6fr65vad7y4uqregvjf552p9jj58";
const RECEIVER: &str = "bitcoincash:qqh3d5jdl6vc00yr4m7tdc6tnhq6dkzzxvx3zszz9v";

fn psid(qty: &str) -> SlpInfo {
    SlpInfo {
        token_id: PSID_TOKEN_ID.to_string(),
        token_ticker: "PSID".to_string(),
        token_name: "Psi Dollar".to_string(),
        token_document_url: String::new(),
        token_document_hash: String::new(),
        decimals: 8,
        token_type: 1,
        utxo_type: "token".to_string(),
        token_qty: qty.to_string(),
    }
}

async fn start_mock() -> (Arc<MockState>, String) {
    let state = Arc::new(MockState::new());
    let (addr, _handle) = spawn_ephemeral(state.clone()).await.unwrap();
    (state, format!("http://{}/v5/", addr))
}

fn txid(byte: u8) -> String {
    hex::encode([byte; 32])
}

#[tokio::test]
async fn test_balances_and_utxos() {
    let (state, url) = start_mock().await;
    state.add_utxo(ADDRESS_0, &txid(1), 0, 12_000);
    state.set_balance(ADDRESS_1, 0, -300);

    let indexer = RestIndexer::new(url, Some("jwt".into()));
    let addresses = vec![ADDRESS_0.to_string(), ADDRESS_1.to_string()];

    let balances = indexer.balances(&addresses).await.unwrap();
    assert_eq!(balances.len(), 2);
    assert_eq!(balances[0].balance.confirmed, 12_000);
    assert!(balances[0].has_balance());
    assert_eq!(balances[1].balance.unconfirmed, -300);
    assert!(!balances[1].has_balance());

    let utxos = indexer.utxos(&addresses).await.unwrap();
    assert_eq!(utxos[0].utxos.len(), 1);
    assert_eq!(utxos[0].utxos[0].tx_hash, txid(1));
    assert!(utxos[1].utxos.is_empty());

    assert_eq!(
        state.requests(),
        vec!["electrumx/balance".to_string(), "electrumx/utxos".to_string()]
    );
}

#[tokio::test]
async fn test_hydrate_classifies_outputs() {
    let (state, url) = start_mock().await;
    state.add_utxo(ADDRESS_0, &txid(1), 0, 12_000);
    state.add_token_utxo(ADDRESS_0, &txid(2), 1, psid("983.6"));
    state.add_utxo(ADDRESS_0, &txid(3), 0, 700);
    state.mark_unvalidated(&txid(3), 0);

    let indexer = RestIndexer::new(url, None);
    let entries = indexer.utxos(&[ADDRESS_0.to_string()]).await.unwrap();
    let hydrated = indexer.hydrate_utxos(&entries).await.unwrap();

    let classes: Vec<UtxoClass> = hydrated[0].utxos.iter().map(|u| u.classify()).collect();
    assert_eq!(classes[0], UtxoClass::Plain);
    match &classes[1] {
        UtxoClass::Token(meta) => {
            assert_eq!(meta.token_id, PSID_TOKEN_ID);
            assert_eq!(meta.token_qty, "983.6");
            assert_eq!(meta.decimals, 8);
        }
        other => panic!("expected token, got {:?}", other),
    }
    assert_eq!(classes[2], UtxoClass::Unvalidated);
}

#[tokio::test]
async fn test_oversized_batch_is_rejected_locally() {
    let (state, url) = start_mock().await;
    let indexer = RestIndexer::new(url, None);

    let addresses: Vec<String> = (0..21).map(|_| ADDRESS_0.to_string()).collect();
    let err = indexer.balances(&addresses).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidInput(_)));

    let entries: Vec<AddressUtxoEntry> = (0..21)
        .map(|_| AddressUtxoEntry {
            address: ADDRESS_0.to_string(),
            utxos: vec![ElectrumUtxo {
                height: 1,
                tx_hash: txid(1),
                tx_pos: 0,
                value: 1,
            }],
        })
        .collect();
    assert!(indexer.hydrate_utxos(&entries).await.is_err());
    assert!(state.requests().is_empty());
}

#[tokio::test]
async fn test_server_errors_surface_as_indexer_errors() {
    let (state, url) = start_mock().await;
    state.set_failing(true);

    let indexer = RestIndexer::new(url, None);
    let err = indexer.balances(&[ADDRESS_0.to_string()]).await.unwrap_err();
    assert!(matches!(err, WalletError::Indexer(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_unreachable_indexer() {
    let indexer = RestIndexer::new("http://127.0.0.1:1/v5", None);
    let err = indexer.balances(&[ADDRESS_0.to_string()]).await.unwrap_err();
    assert!(matches!(err, WalletError::Network(_)));
}

#[tokio::test]
async fn test_broadcast_returns_txid() {
    let (state, url) = start_mock().await;
    let indexer = RestIndexer::new(url, None);

    let txid = indexer.broadcast("0200000000").await.unwrap();
    assert_eq!(txid.len(), 64);
    assert_eq!(state.broadcasts(), vec!["0200000000".to_string()]);
}

#[tokio::test]
async fn test_sync_and_send_over_http() {
    let (state, url) = start_mock().await;
    state.add_utxo(ADDRESS_0, &txid(1), 0, 10_000);
    state.add_token_utxo(ADDRESS_1, &txid(2), 1, psid("983.6"));

    let env = TestEnvironment::new().unwrap();
    env.fixture_wallet("alice", Network::Mainnet, 1).unwrap();
    let config = WalletConfig {
        mainnet_rest: url,
        ..WalletConfig::default()
    };
    let manager = WalletManager::new_with_storage(config, env.storage().clone());
    let indexer = manager.indexer_for(manager.wallet_network("alice").unwrap());

    let report = manager.update_balances(&indexer, "alice").await.unwrap();
    assert_eq!(report.next_address_index, 2);
    assert_eq!(report.tokens[0].display_balance(), "983.6");

    let result = manager
        .send_tokens(&indexer, "alice", PSID_TOKEN_ID, "3.6", RECEIVER)
        .await
        .unwrap();

    assert_eq!(state.broadcasts(), vec![result.hex.clone()]);
    assert!(state
        .requests()
        .contains(&"slp/hydrateUtxos".to_string()));
    assert_eq!(env.storage().open("alice").unwrap().next_address_index, 3);
}
