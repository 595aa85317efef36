/// Integration tests for wallet lifecycle and address issuance
mod common;

use bitcoin::secp256k1::Secp256k1;
use bitcoin::sign_message::{signed_msg_hash, MessageSignature};
use bitcoin::PrivateKey;

use common::TestEnvironment;
use slp_wallet::wallet::AddressManager;
use slp_wallet::{Network, WalletError};

const ADDRESS_1: &str = "bitcoincash:qpjg998fw285wj6fr65vad7y4uqregvjf552p9jj58";
const ADDRESS_2: &str = "bitcoincash:qz3xredug4mqcqe8526m3vapvwhgwghskc9klp27fs";

#[test]
fn test_create_wallet_defaults() {
    let env = TestEnvironment::new().unwrap();

    let wallet = env
        .manager
        .create_wallet("alice", Network::Mainnet, Some("savings".into()))
        .unwrap();

    assert_eq!(wallet.mnemonic.split_whitespace().count(), 12);
    assert_eq!(wallet.next_address_index, 1);
    assert_eq!(wallet.derivation_path, 245);
    assert!(wallet.root_address.starts_with("bitcoincash:q"));

    let json: serde_json::Value = serde_json::from_slice(&env.raw_file("alice")).unwrap();
    assert_eq!(json["network"], "mainnet");
    assert_eq!(json["nextAddressIndex"], 1);
    assert_eq!(json["description"], "savings");
    assert_eq!(json["rootAddress"], wallet.root_address.as_str());
    assert!(json["addressesWithBalance"].as_array().unwrap().is_empty());
    assert_eq!(json["balance"], 0.0);
}

#[test]
fn test_create_testnet_wallet() {
    let env = TestEnvironment::new().unwrap();
    let wallet = env.manager.create_wallet("bob", Network::Testnet, None).unwrap();
    assert_eq!(wallet.network, Network::Testnet);
    assert!(wallet.root_address.starts_with("bchtest:q"));
}

#[test]
fn test_create_existing_wallet_keeps_file() {
    let env = TestEnvironment::new().unwrap();
    env.manager.create_wallet("alice", Network::Mainnet, None).unwrap();
    let before = env.raw_file("alice");

    let err = env
        .manager
        .create_wallet("alice", Network::Testnet, None)
        .unwrap_err();

    assert!(matches!(err, WalletError::WalletExists(_)));
    assert!(err.to_string().contains("already exists"));
    assert_eq!(env.raw_file("alice"), before);
}

#[test]
fn test_list_and_remove_wallets() {
    let env = TestEnvironment::new().unwrap();
    assert!(env.manager.list_wallets().unwrap().is_empty());

    env.manager.create_wallet("zed", Network::Mainnet, None).unwrap();
    env.manager.create_wallet("amy", Network::Testnet, None).unwrap();

    let wallets = env.manager.list_wallets().unwrap();
    let names: Vec<&str> = wallets.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["amy", "zed"]);
    assert_eq!(wallets[0].network, Network::Testnet);
    assert_eq!(wallets[1].balance, 0.0);

    env.manager.remove_wallet("zed").unwrap();
    let names: Vec<String> = env
        .manager
        .list_wallets()
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["amy".to_string()]);

    let err = env.manager.open_wallet("zed").unwrap_err();
    assert!(err.to_string().starts_with("Could not open"));
    assert!(env.manager.remove_wallet("zed").is_err());
}

#[test]
fn test_list_skips_unreadable_documents() {
    let env = TestEnvironment::new().unwrap();
    env.manager.create_wallet("good", Network::Mainnet, None).unwrap();
    std::fs::write(env.storage().wallet_path("broken"), "{ not json").unwrap();

    let wallets = env.manager.list_wallets().unwrap();
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].name, "good");
}

#[test]
fn test_get_address_advances_cursor() {
    let env = TestEnvironment::new().unwrap();
    env.fixture_wallet("alice", Network::Mainnet, 1).unwrap();

    let first = env.manager.get_address("alice").unwrap();
    assert_eq!(first.index, 1);
    assert_eq!(first.cash_address, ADDRESS_1);
    assert!(first.legacy_address.starts_with('1'));

    let second = env.manager.get_address("alice").unwrap();
    assert_eq!(second.index, 2);
    assert_eq!(second.cash_address, ADDRESS_2);

    let stored = env.storage().open("alice").unwrap();
    assert_eq!(stored.next_address_index, 3);
    assert_eq!(stored.address_at(2), Some(ADDRESS_2));
}

#[test]
fn test_get_address_testnet() {
    let env = TestEnvironment::new().unwrap();
    env.fixture_wallet("tbob", Network::Testnet, 1).unwrap();

    let info = env.manager.get_address("tbob").unwrap();
    assert!(info.cash_address.starts_with("bchtest:q"));
    assert!(info.legacy_address.starts_with('m') || info.legacy_address.starts_with('n'));
}

#[test]
fn test_get_key_matches_address() {
    let env = TestEnvironment::new().unwrap();
    env.fixture_wallet("alice", Network::Mainnet, 1).unwrap();

    let key = env.manager.get_key("alice").unwrap();
    assert_eq!(key.index, 1);
    assert_eq!(key.cash_address, ADDRESS_1);

    let secp = Secp256k1::new();
    let private = PrivateKey::from_wif(&key.wif).unwrap();
    assert!(private.compressed);
    assert_eq!(private.public_key(&secp).to_string(), key.public_key);

    assert_eq!(env.storage().open("alice").unwrap().next_address_index, 2);
}

#[test]
fn test_sign_message_recovers_index_key() {
    let env = TestEnvironment::new().unwrap();
    let wallet = env.fixture_wallet("alice", Network::Mainnet, 3).unwrap();

    let signed = env.manager.sign_message("alice", 2, "hello world").unwrap();
    assert_eq!(signed.address, ADDRESS_2);

    let signature = MessageSignature::from_base64(&signed.signature).unwrap();
    let recovered = signature
        .recover_pubkey(&Secp256k1::verification_only(), signed_msg_hash("hello world"))
        .unwrap();
    let expected = AddressManager::derive_key(&wallet, 2).unwrap();
    assert_eq!(recovered.to_string(), expected.public_key_hex());

    // Signing never touches the cursor
    assert_eq!(env.storage().open("alice").unwrap().next_address_index, 3);
}

#[test]
fn test_sign_message_requires_message() {
    let env = TestEnvironment::new().unwrap();
    env.fixture_wallet("alice", Network::Mainnet, 1).unwrap();
    let err = env.manager.sign_message("alice", 0, "").unwrap_err();
    assert!(err.to_string().contains("-m flag"));
}

#[test]
fn test_derivation_get_and_set() {
    let env = TestEnvironment::new().unwrap();
    env.fixture_wallet("alice", Network::Mainnet, 3).unwrap();
    assert_eq!(env.manager.get_derivation("alice").unwrap(), 245);

    let err = env.manager.set_derivation("alice", "abc").unwrap_err();
    assert_eq!(err.to_string(), "Derivation path must be an integer");
    assert_eq!(env.manager.get_derivation("alice").unwrap(), 245);

    let updated = env.manager.set_derivation("alice", "145").unwrap();
    assert_eq!(updated.derivation_path, 145);
    assert_eq!(env.manager.get_derivation("alice").unwrap(), 145);

    // Cached addresses follow the new path
    let stored = env.storage().open("alice").unwrap();
    assert_eq!(stored.addresses.len(), 3);
    assert_ne!(stored.address_at(1), Some(ADDRESS_1));
    assert_eq!(
        stored.address_at(1).map(str::to_string),
        Some(AddressManager::derive_address(&stored, 1).unwrap())
    );
    assert_eq!(stored.root_address, stored.address_at(0).unwrap());
    assert_eq!(stored.next_address_index, 3);
}

#[test]
fn test_busy_wallet_is_rejected() {
    let env = TestEnvironment::new().unwrap();
    env.fixture_wallet("alice", Network::Mainnet, 1).unwrap();

    let guard = env.storage().lock("alice").unwrap();
    let err = env.manager.get_address("alice").unwrap_err();
    assert!(matches!(err, WalletError::WalletBusy(_)));
    drop(guard);

    assert_eq!(env.manager.get_address("alice").unwrap().index, 1);
}
