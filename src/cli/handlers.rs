//! Command handlers
//!
//! Each handler validates its flags, delegates to [`WalletManager`] and
//! prints the result. Errors are printed rather than propagated; the return
//! value is the process exit code.

use crate::bch::Network;
use crate::cli::output;
use crate::cli::{
    BridgeArgs, Command, CreateWalletArgs, DerivationArgs, GetAddressArgs, NameArgs,
    NftCreateChildArgs, NftCreateGroupArgs, NftListTokensArgs, NftRemoveChildArgs, SendTokensArgs,
    SignMessageArgs,
};
use crate::error::WalletError;
use crate::wallet::nft_ops::{ChildConfig, GroupConfig, NftAccounts};
use crate::wallet::WalletManager;

/// Exit code for commands that report failures only on the console
const EXIT_REPORTED: i32 = 0;
/// Exit code for transaction commands that fail
const EXIT_FAILED: i32 = 1;

fn require_name(name: Option<String>) -> Result<String, WalletError> {
    name.filter(|n| !n.trim().is_empty())
        .ok_or_else(|| WalletError::InvalidInput("You must specify a wallet with the -n flag.".into()))
}

fn parse_index(index: Option<String>) -> Result<u32, WalletError> {
    index
        .and_then(|i| i.trim().parse::<u32>().ok())
        .ok_or_else(|| {
            WalletError::InvalidInput("You must specify an address index with the -i flag.".into())
        })
}

fn parse_funder(funder: Option<String>) -> Result<Option<u32>, WalletError> {
    match funder {
        None => Ok(None),
        Some(f) => f.trim().parse::<u32>().map(Some).map_err(|_| {
            WalletError::InvalidInput(format!("Fee funder index must be an integer, got '{}'", f))
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Dispatch a parsed command, returning the process exit code
pub async fn run(manager: &WalletManager, command: Command) -> i32 {
    let (result, failure_code) = match command {
        Command::CreateWallet(args) => (create_wallet(manager, args), EXIT_REPORTED),
        Command::ListWallets => (list_wallets(manager), EXIT_REPORTED),
        Command::RemoveWallet(args) => (remove_wallet(manager, args), EXIT_REPORTED),
        Command::GetAddress(args) => (get_address(manager, args), EXIT_REPORTED),
        Command::GetKey(args) => (get_key(manager, args), EXIT_REPORTED),
        Command::SignMessage(args) => (sign_message(manager, args), EXIT_REPORTED),
        Command::Derivation(args) => (derivation(manager, args), EXIT_REPORTED),
        Command::UpdateBalances(args) => (update_balances(manager, args).await, EXIT_REPORTED),
        Command::NftCreateGroup(args) => (nft_create_group(manager, args).await, EXIT_REPORTED),
        Command::NftCreateChild(args) => (nft_create_child(manager, args).await, EXIT_REPORTED),
        Command::NftRemoveChild(args) => (nft_remove_child(manager, args).await, EXIT_REPORTED),
        Command::NftListTokens(args) => (nft_list_tokens(manager, args).await, EXIT_REPORTED),
        Command::NftListAddr(args) => (nft_list_addr(manager, args).await, EXIT_REPORTED),
        Command::SendTokens(args) => (send_tokens(manager, args).await, EXIT_FAILED),
        Command::SlpAvaxBridge(args) => (slp_avax_bridge(manager, args).await, EXIT_FAILED),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            log::debug!("Command failed: {:?}", e);
            println!("{}", e);
            failure_code
        }
    }
}

fn create_wallet(manager: &WalletManager, args: CreateWalletArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let network = Network::from_testnet_flag(args.testnet);
    let wallet = manager.create_wallet(&name, network, non_empty(args.description))?;

    println!("Wallet '{}' created on {}", name, wallet.network);
    println!("Root address: {}", wallet.root_address);
    if let Some(description) = &wallet.description {
        println!("Description: {}", description);
    }
    println!(
        "Saved to {}",
        manager.storage.wallet_path(&name).display()
    );
    Ok(())
}

fn list_wallets(manager: &WalletManager) -> Result<(), WalletError> {
    let wallets = manager.list_wallets()?;
    if wallets.is_empty() {
        println!("No wallets found.");
        return Ok(());
    }
    println!("{}", output::wallets_table(&wallets));
    Ok(())
}

fn remove_wallet(manager: &WalletManager, args: NameArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    manager.remove_wallet(&name)?;
    println!("Wallet '{}' removed", name);
    Ok(())
}

fn get_address(manager: &WalletManager, args: GetAddressArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let info = manager.get_address(&name)?;

    let shown = if args.legacy { &info.legacy_address } else { &info.cash_address };
    if let Some(qr) = output::qr_code(shown) {
        println!("{}", qr);
    }
    println!("cash address: {}", info.cash_address);
    println!("legacy address: {}", info.legacy_address);
    Ok(())
}

fn get_key(manager: &WalletManager, args: NameArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let key = manager.get_key(&name)?;

    if let Some(qr) = output::qr_code(&key.wif) {
        println!("{}", qr);
    }
    println!("Private Key: {}", key.wif);
    println!("Public Key: {}", key.public_key);

    if let Some(qr) = output::qr_code(&key.cash_address) {
        println!("{}", qr);
    }
    println!("{}", key.cash_address);
    println!("{}", key.legacy_address);
    Ok(())
}

fn sign_message(manager: &WalletManager, args: SignMessageArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let index = parse_index(args.index)?;
    let message = args.message.unwrap_or_default();

    let signed = manager.sign_message(&name, index, &message)?;
    log::info!("Signed with the key of {} (index {})", signed.address, signed.index);
    println!("{}", signed.signature);
    Ok(())
}

fn derivation(manager: &WalletManager, args: DerivationArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    match args.save {
        Some(coin_type) => {
            let wallet = manager.set_derivation(&name, &coin_type)?;
            println!("Derivation path changed to {}", wallet.derivation_path);
            println!("Root address: {}", wallet.root_address);
        }
        None => {
            let coin_type = manager.get_derivation(&name)?;
            println!("Derivation path: m/44'/{}'/0'/0", coin_type);
        }
    }
    Ok(())
}

async fn update_balances(manager: &WalletManager, args: NameArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let network = manager.wallet_network(&name)?;
    let indexer = manager.indexer_for(network);

    println!("Existing balance: {} BCH", manager.open_wallet(&name)?.balance);
    let report = manager.update_balances(&indexer, &name).await?;

    let summary = output::token_summary(&report.tokens);
    if !summary.is_empty() {
        println!("{}", summary);
    }
    println!("Updated balance: {} BCH", report.balance);
    Ok(())
}

async fn nft_create_group(manager: &WalletManager, args: NftCreateGroupArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let accounts = NftAccounts {
        index: parse_index(args.index)?,
        funder: parse_funder(args.funder)?,
    };
    let defaults = GroupConfig::default();
    let config = GroupConfig {
        name: non_empty(args.group).unwrap_or(defaults.name),
        ticker: non_empty(args.ticker).unwrap_or(defaults.ticker),
        amount: args.amount.unwrap_or(defaults.amount),
        document_url: args.url.unwrap_or_default(),
        document_hash: args.hash.unwrap_or_default(),
    };

    let indexer = manager.indexer_for(manager.wallet_network(&name)?);
    println!("Create NFT group '{}'", config.ticker);
    let result = manager.nft_create_group(&indexer, &name, accounts, &config).await?;
    println!("TxId: {}", result.txid);
    Ok(())
}

async fn nft_create_child(manager: &WalletManager, args: NftCreateChildArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let accounts = NftAccounts {
        index: parse_index(args.index)?,
        funder: parse_funder(args.funder)?,
    };
    let group_id = non_empty(args.group_id)
        .ok_or_else(|| WalletError::InvalidInput("You must specify the NFT group ID".into()))?;

    let mut config = ChildConfig::new(group_id);
    if let Some(child) = non_empty(args.child) {
        config.name = child;
    }
    if let Some(ticker) = non_empty(args.ticker) {
        config.ticker = ticker;
    }
    config.document_url = args.url.unwrap_or_default();
    config.document_hash = args.hash.unwrap_or_default();
    config.receiver = non_empty(args.receiver);

    let indexer = manager.indexer_for(manager.wallet_network(&name)?);
    println!("Create NFT child '{}'", config.ticker);
    let created = manager.nft_create_child(&indexer, &name, accounts, &config).await?;
    if let Some(split) = &created.split {
        println!("Split TxId: {}", split.txid);
    }
    println!("TxId: {}", created.child.txid);
    Ok(())
}

async fn nft_remove_child(manager: &WalletManager, args: NftRemoveChildArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let accounts = NftAccounts {
        index: parse_index(args.index)?,
        funder: parse_funder(args.funder)?,
    };
    let token_id = non_empty(args.token_id)
        .ok_or_else(|| WalletError::InvalidInput("You must specify the NFT child tokenId".into()))?;

    let indexer = manager.indexer_for(manager.wallet_network(&name)?);
    println!("Remove NFT child '{}'", token_id);
    let result = manager.nft_remove_child(&indexer, &name, accounts, &token_id).await?;
    println!("TxId: {}", result.txid);
    Ok(())
}

async fn nft_list_tokens(manager: &WalletManager, args: NftListTokensArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let index = parse_index(args.index)?;

    let indexer = manager.indexer_for(manager.wallet_network(&name)?);
    let tokens = manager.nft_list_tokens(&indexer, &name, index, args.groups).await?;
    let json = serde_json::to_string_pretty(&tokens)
        .map_err(|e| WalletError::Internal(format!("Failed to format token list: {}", e)))?;
    println!("{}", json);
    Ok(())
}

async fn nft_list_addr(manager: &WalletManager, args: NameArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;

    let indexer = manager.indexer_for(manager.wallet_network(&name)?);
    let rows = manager.nft_list_addresses(&indexer, &name).await?;
    println!("{}", output::addresses_table(&rows));
    Ok(())
}

async fn send_tokens(manager: &WalletManager, args: SendTokensArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let qty = non_empty(args.qty).ok_or_else(|| {
        WalletError::InvalidInput("You must specify a quantity of tokens with the -q flag.".into())
    })?;
    let receiver = non_empty(args.send_addr).ok_or_else(|| {
        WalletError::InvalidInput("You must specify a send-to address with the -a flag.".into())
    })?;
    let token_id = args.token_id.unwrap_or_default();

    let indexer = manager.indexer_for(manager.wallet_network(&name)?);
    let result = manager
        .send_tokens(&indexer, &name, &token_id, &qty, &receiver)
        .await?;
    println!("{}", output::broadcast_summary(&result));
    Ok(())
}

async fn slp_avax_bridge(manager: &WalletManager, args: BridgeArgs) -> Result<(), WalletError> {
    let name = require_name(args.name)?;
    let qty = non_empty(args.qty).ok_or_else(|| {
        WalletError::InvalidInput("You must specify a quantity of tokens with the -q flag.".into())
    })?;
    if args.send_addr.trim().is_empty() {
        return Err(WalletError::InvalidInput(
            "You must specify the bridge address with the -a flag.".into(),
        ));
    }
    let avax_addr = non_empty(args.avax_addr).ok_or_else(|| {
        WalletError::InvalidInput("You must specify a send-to address with the -x flag.".into())
    })?;

    let indexer = manager.indexer_for(manager.wallet_network(&name)?);
    let result = manager
        .bridge_tokens(&indexer, &name, &args.token_id, &qty, &args.send_addr, &avax_addr)
        .await?;
    println!("{}", output::broadcast_summary(&result));
    Ok(())
}
