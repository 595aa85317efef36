/// NFT1 group and child token operations
///
/// Token UTXOs are taken from the `--index` address. Fees come from the
/// `--funder` address when given, else from the same index address, and BCH
/// change returns to the funding address.
use serde::Serialize;

use crate::bch::address::ensure_valid;
use crate::bch::slp::{self, GenesisParams, TOKEN_TYPE_NFT_CHILD, TOKEN_TYPE_NFT_GROUP};
use crate::bch::transaction::{change_after, select_utxo, TransactionBuilder, DUST_SATS, TX_FEE_SATS};
use crate::bch::units::{format_token_qty, parse_token_qty};
use crate::error::WalletError;
use crate::indexer::Indexer;
use crate::storage::{Storage, TokenMetadata, Utxo, UtxoType, Wallet};
use crate::wallet::signer::{SignedTransaction, WalletSigner};
use crate::wallet::sync_ops::refresh_wallet;
use crate::wallet::token_ops::BroadcastResult;
use crate::wallet::AddressManager;

pub const DEFAULT_GROUP_NAME: &str = "NFT CLI Wallet Group";
pub const DEFAULT_GROUP_TICKER: &str = "CLIG";
pub const DEFAULT_GROUP_AMOUNT: u64 = 100;
pub const DEFAULT_CHILD_NAME: &str = "NFT CLI Wallet Token";
pub const DEFAULT_CHILD_TICKER: &str = "CLIC";

/// Settings for a new NFT group
#[derive(Debug, Clone)]
pub struct GroupConfig {
    pub name: String,
    pub ticker: String,
    pub amount: u64,
    pub document_url: String,
    pub document_hash: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GROUP_NAME.into(),
            ticker: DEFAULT_GROUP_TICKER.into(),
            amount: DEFAULT_GROUP_AMOUNT,
            document_url: String::new(),
            document_hash: String::new(),
        }
    }
}

/// Settings for a new NFT child
#[derive(Debug, Clone)]
pub struct ChildConfig {
    pub group_id: String,
    pub name: String,
    pub ticker: String,
    pub document_url: String,
    pub document_hash: String,
    /// Defaults to the index address
    pub receiver: Option<String>,
}

impl ChildConfig {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            name: DEFAULT_CHILD_NAME.into(),
            ticker: DEFAULT_CHILD_TICKER.into(),
            document_url: String::new(),
            document_hash: String::new(),
            receiver: None,
        }
    }
}

/// Outcome of `nft-create-child`. `split` is set when a group UTXO had to be
/// split down to quantity 1 first.
#[derive(Debug, Clone)]
pub struct ChildCreated {
    pub split: Option<BroadcastResult>,
    pub child: BroadcastResult,
}

/// Entry of the `nft-list-tokens` JSON output
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NftToken {
    pub token_id: String,
    pub ticker: String,
    pub name: String,
    pub document_url: String,
    pub document_hash: String,
    pub token_type: u8,
    pub qty: String,
}

/// Row of the `nft-list-addr` table
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRow {
    pub index: u32,
    pub address: String,
    pub has_tokens: bool,
    pub balance: f64,
}

fn check_hex_id(id: &str, field: &str) -> Result<(), WalletError> {
    let id = id.trim();
    if id.len() != 64 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::InvalidInput(format!(
            "{} must be provided as a 64 character hex string.",
            field
        )));
    }
    Ok(())
}

/// Owner and fee-funder indexes for an NFT command
#[derive(Debug, Clone, Copy)]
pub struct NftAccounts {
    pub index: u32,
    pub funder: Option<u32>,
}

impl NftAccounts {
    pub fn check(&self, wallet: &Wallet) -> Result<(), WalletError> {
        wallet.ensure_issued(self.index)?;
        if let Some(funder) = self.funder {
            if funder >= wallet.next_address_index {
                return Err(WalletError::InvalidInput(format!(
                    "You must specify a funder index between 0 and {}.",
                    wallet.next_address_index.saturating_sub(1)
                )));
            }
        }
        Ok(())
    }

    pub fn fee_index(&self) -> u32 {
        self.funder.unwrap_or(self.index)
    }
}

fn utxos_at<'a>(
    utxos: impl Iterator<Item = &'a Utxo>,
    index: u32,
) -> impl Iterator<Item = &'a Utxo> {
    utxos.filter(move |u| u.derivation_index == index)
}

fn nft_utxos<'a>(
    wallet: &'a Wallet,
    index: u32,
    token_type: u8,
) -> impl Iterator<Item = (&'a Utxo, &'a TokenMetadata)> {
    utxos_at(wallet.token_utxo_iter(), index).filter_map(move |u| {
        u.token
            .as_ref()
            .filter(|t| t.token_type == token_type)
            .map(|t| (u, t))
    })
}

/// GENESIS of a group token: quantity and baton both go to the owner.
pub fn assemble_group_genesis(
    signer: &WalletSigner,
    fee_utxo: &Utxo,
    owner_address: &str,
    config: &GroupConfig,
) -> Result<SignedTransaction, WalletError> {
    let script = slp::genesis_script(&GenesisParams {
        token_type: TOKEN_TYPE_NFT_GROUP,
        ticker: config.ticker.clone(),
        name: config.name.clone(),
        document_url: config.document_url.clone(),
        document_hash: config.document_hash.clone(),
        decimals: 0,
        mint_baton_vout: Some(2),
        quantity: config.amount,
    })?;
    let remainder = change_after(fee_utxo.value_sats, TX_FEE_SATS, DUST_SATS * 2)?;

    let mut builder = TransactionBuilder::new();
    builder.add_input(fee_utxo)?;
    builder.add_output(script, 0);
    builder.pay_to(owner_address, DUST_SATS)?;
    builder.pay_to(owner_address, DUST_SATS)?;
    builder.pay_to(&fee_utxo.owner_address, remainder)?;

    signer.sign_transaction(builder)
}

/// Split a group UTXO into a quantity-1 output (vout 1) and the rest (vout 2).
pub fn assemble_group_split(
    signer: &WalletSigner,
    group_utxo: &Utxo,
    fee_utxo: &Utxo,
) -> Result<SignedTransaction, WalletError> {
    let meta = group_utxo
        .token
        .as_ref()
        .ok_or_else(|| WalletError::Internal("Group UTXO carries no token data".into()))?;
    let qty = parse_token_qty(&meta.token_qty, meta.decimals)?;
    if qty < 2 {
        return Err(WalletError::InvalidInput(format!(
            "Group UTXO {}:{} cannot be split",
            group_utxo.transaction_id, group_utxo.output_index
        )));
    }

    let script = slp::send_script(TOKEN_TYPE_NFT_GROUP, &meta.token_id, &[1, qty - 1])?;
    let remainder = change_after(
        group_utxo.value_sats + fee_utxo.value_sats,
        TX_FEE_SATS,
        DUST_SATS * 2,
    )?;

    let mut builder = TransactionBuilder::new();
    builder.add_input(group_utxo)?;
    builder.add_input(fee_utxo)?;
    builder.add_output(script, 0);
    builder.pay_to(&group_utxo.owner_address, DUST_SATS)?;
    builder.pay_to(&group_utxo.owner_address, DUST_SATS)?;
    builder.pay_to(&fee_utxo.owner_address, remainder)?;

    signer.sign_transaction(builder)
}

/// GENESIS of a child token, spending a quantity-1 group UTXO as input 0.
pub fn assemble_child_genesis(
    signer: &WalletSigner,
    group_utxo: &Utxo,
    fee_utxo: &Utxo,
    receiver: &str,
    config: &ChildConfig,
) -> Result<SignedTransaction, WalletError> {
    ensure_valid(receiver)?;
    let meta = group_utxo
        .token
        .as_ref()
        .ok_or_else(|| WalletError::Internal("Group UTXO carries no token data".into()))?;
    if meta.token_type != TOKEN_TYPE_NFT_GROUP || parse_token_qty(&meta.token_qty, meta.decimals)? != 1 {
        return Err(WalletError::InvalidInput(
            "Child genesis must spend a group UTXO of quantity 1".into(),
        ));
    }

    let script = slp::genesis_script(&GenesisParams {
        token_type: TOKEN_TYPE_NFT_CHILD,
        ticker: config.ticker.clone(),
        name: config.name.clone(),
        document_url: config.document_url.clone(),
        document_hash: config.document_hash.clone(),
        decimals: 0,
        mint_baton_vout: None,
        quantity: 1,
    })?;
    let remainder = change_after(
        group_utxo.value_sats + fee_utxo.value_sats,
        TX_FEE_SATS,
        DUST_SATS,
    )?;

    let mut builder = TransactionBuilder::new();
    builder.add_input(group_utxo)?;
    builder.add_input(fee_utxo)?;
    builder.add_output(script, 0);
    builder.pay_to(receiver, DUST_SATS)?;
    builder.pay_to(&fee_utxo.owner_address, remainder)?;

    signer.sign_transaction(builder)
}

/// Burn a child token by spending it with no SLP payload.
pub fn assemble_child_burn(
    signer: &WalletSigner,
    child_utxo: &Utxo,
    fee_utxo: &Utxo,
) -> Result<SignedTransaction, WalletError> {
    let remainder = change_after(child_utxo.value_sats + fee_utxo.value_sats, TX_FEE_SATS, 0)?;

    let mut builder = TransactionBuilder::new();
    builder.add_input(child_utxo)?;
    builder.add_input(fee_utxo)?;
    builder.pay_to(&fee_utxo.owner_address, remainder)?;

    signer.sign_transaction(builder)
}

async fn broadcast(
    indexer: &dyn Indexer,
    wallet: &Wallet,
    signed: SignedTransaction,
) -> Result<BroadcastResult, WalletError> {
    log::debug!("hex: {}", signed.hex);
    let txid = indexer.broadcast(&signed.hex).await?;
    Ok(BroadcastResult {
        txid,
        hex: signed.hex,
        network: wallet.network,
    })
}

/// Lock, open and sync a wallet before building an NFT transaction
async fn synced_wallet(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
) -> Result<Wallet, WalletError> {
    let mut wallet = storage.open(wallet_name)?;
    refresh_wallet(&mut wallet, indexer).await?;
    storage.save(wallet_name, &wallet)?;
    Ok(wallet)
}

fn fee_utxo(wallet: &Wallet, accounts: NftAccounts, required: u64) -> Result<Utxo, WalletError> {
    select_utxo(utxos_at(wallet.plain_utxo_iter(), accounts.fee_index()), required)
}

pub async fn create_group(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
    accounts: NftAccounts,
    config: &GroupConfig,
) -> Result<BroadcastResult, WalletError> {
    if config.amount == 0 {
        return Err(WalletError::InvalidInput("Group amount must be greater than zero".into()));
    }
    let _lock = storage.lock(wallet_name)?;
    accounts.check(&storage.open(wallet_name)?)?;
    let wallet = synced_wallet(storage, indexer, wallet_name).await?;

    let owner = AddressManager::derive_address(&wallet, accounts.index)?;
    let fee = fee_utxo(&wallet, accounts, TX_FEE_SATS + DUST_SATS * 3)?;
    let signer = WalletSigner::new(&wallet)?;
    let signed = assemble_group_genesis(&signer, &fee, &owner, config)?;

    log::info!("Creating NFT group '{}'", config.ticker);
    broadcast(indexer, &wallet, signed).await
}

pub async fn create_child(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
    accounts: NftAccounts,
    config: &ChildConfig,
) -> Result<ChildCreated, WalletError> {
    check_hex_id(&config.group_id, "groupId")?;
    if let Some(receiver) = &config.receiver {
        ensure_valid(receiver).map_err(|_| {
            WalletError::InvalidAddress(format!("Invalid receiver address: {}", receiver))
        })?;
    }

    let _lock = storage.lock(wallet_name)?;
    accounts.check(&storage.open(wallet_name)?)?;
    let wallet = synced_wallet(storage, indexer, wallet_name).await?;

    let owner = AddressManager::derive_address(&wallet, accounts.index)?;
    let receiver = config.receiver.clone().unwrap_or_else(|| owner.clone());
    let signer = WalletSigner::new(&wallet)?;

    let mut groups: Vec<(&Utxo, u64)> = Vec::new();
    for (utxo, meta) in nft_utxos(&wallet, accounts.index, TOKEN_TYPE_NFT_GROUP) {
        if meta.token_id == config.group_id.trim() && meta.utxo_type == UtxoType::Token {
            groups.push((utxo, parse_token_qty(&meta.token_qty, meta.decimals)?));
        }
    }

    if let Some((single, _)) = groups.iter().find(|(_, qty)| *qty == 1) {
        let fee = fee_utxo(&wallet, accounts, TX_FEE_SATS + DUST_SATS)?;
        let signed = assemble_child_genesis(&signer, single, &fee, &receiver, config)?;
        log::info!("Creating NFT child '{}'", config.ticker);
        return Ok(ChildCreated {
            split: None,
            child: broadcast(indexer, &wallet, signed).await?,
        });
    }

    let (group, qty) = groups
        .iter()
        .filter(|(_, qty)| *qty > 1)
        .min_by_key(|(_, qty)| *qty)
        .ok_or_else(|| {
            WalletError::InsufficientFunds(format!(
                "No NFT group tokens of {} at index {}",
                config.group_id, accounts.index
            ))
        })?;

    // The split's BCH change funds the child genesis
    let fee = fee_utxo(&wallet, accounts, TX_FEE_SATS * 2 + DUST_SATS * 4)?;
    let split = assemble_group_split(&signer, group, &fee)?;
    log::info!("Splitting group UTXO of quantity {} for child genesis", qty);
    let split_change = split.tx.output[3].value.to_sat();
    let split = broadcast(indexer, &wallet, split).await?;

    let group_meta = group
        .token
        .clone()
        .ok_or_else(|| WalletError::Internal("Group UTXO carries no token data".into()))?;
    let single = Utxo {
        transaction_id: split.txid.clone(),
        output_index: 1,
        value_sats: DUST_SATS,
        owner_address: group.owner_address.clone(),
        derivation_index: group.derivation_index,
        height: 0,
        token: Some(TokenMetadata {
            token_qty: format_token_qty(1, group_meta.decimals),
            ..group_meta
        }),
    };
    let chained_fee = Utxo {
        transaction_id: split.txid.clone(),
        output_index: 3,
        value_sats: split_change,
        owner_address: fee.owner_address.clone(),
        derivation_index: fee.derivation_index,
        height: 0,
        token: None,
    };

    let signed = assemble_child_genesis(&signer, &single, &chained_fee, &receiver, config)?;
    log::info!("Creating NFT child '{}'", config.ticker);
    Ok(ChildCreated {
        split: Some(split),
        child: broadcast(indexer, &wallet, signed).await?,
    })
}

pub async fn remove_child(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
    accounts: NftAccounts,
    token_id: &str,
) -> Result<BroadcastResult, WalletError> {
    check_hex_id(token_id, "tokenId")?;

    let _lock = storage.lock(wallet_name)?;
    accounts.check(&storage.open(wallet_name)?)?;
    let wallet = synced_wallet(storage, indexer, wallet_name).await?;

    let (child, _) = nft_utxos(&wallet, accounts.index, TOKEN_TYPE_NFT_CHILD)
        .find(|(_, meta)| meta.token_id == token_id.trim())
        .ok_or_else(|| {
            WalletError::InvalidInput(format!(
                "NFT child {} not found at index {}",
                token_id, accounts.index
            ))
        })?;

    let fee = fee_utxo(&wallet, accounts, TX_FEE_SATS)?;
    let signer = WalletSigner::new(&wallet)?;
    let signed = assemble_child_burn(&signer, child, &fee)?;

    log::info!("Removing NFT child {}", token_id);
    broadcast(indexer, &wallet, signed).await
}

/// NFT children (or groups) held at one index, one entry per token id
pub fn nft_tokens_at(wallet: &Wallet, index: u32, groups: bool) -> Result<Vec<NftToken>, WalletError> {
    let token_type = if groups { TOKEN_TYPE_NFT_GROUP } else { TOKEN_TYPE_NFT_CHILD };
    let mut tokens: Vec<(NftToken, u64, u8)> = Vec::new();

    for (_, meta) in nft_utxos(wallet, index, token_type) {
        if meta.utxo_type != UtxoType::Token {
            continue;
        }
        let units = parse_token_qty(&meta.token_qty, meta.decimals)?;
        match tokens.iter_mut().find(|(t, _, _)| t.token_id == meta.token_id) {
            Some((_, total, _)) => *total += units,
            None => tokens.push((
                NftToken {
                    token_id: meta.token_id.clone(),
                    ticker: meta.token_ticker.clone(),
                    name: meta.token_name.clone(),
                    document_url: meta.token_document_url.clone(),
                    document_hash: meta.token_document_hash.clone(),
                    token_type: meta.token_type,
                    qty: String::new(),
                },
                units,
                meta.decimals,
            )),
        }
    }

    Ok(tokens
        .into_iter()
        .map(|(mut token, units, decimals)| {
            token.qty = format_token_qty(units, decimals);
            token
        })
        .collect())
}

pub async fn list_tokens(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
    index: u32,
    groups: bool,
) -> Result<Vec<NftToken>, WalletError> {
    let _lock = storage.lock(wallet_name)?;
    storage.open(wallet_name)?.ensure_issued(index)?;
    let wallet = synced_wallet(storage, indexer, wallet_name).await?;
    nft_tokens_at(&wallet, index, groups)
}

/// Issued addresses with token and balance flags
pub fn address_rows(wallet: &Wallet) -> Vec<AddressRow> {
    wallet
        .addresses
        .iter()
        .map(|(index, address)| AddressRow {
            index: *index,
            address: address.clone(),
            has_tokens: wallet.has_tokens_at(address),
            balance: wallet.balance_at(address),
        })
        .collect()
}

pub async fn list_addresses(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
) -> Result<Vec<AddressRow>, WalletError> {
    let _lock = storage.lock(wallet_name)?;
    let wallet = synced_wallet(storage, indexer, wallet_name).await?;
    Ok(address_rows(&wallet))
}
