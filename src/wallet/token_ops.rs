/// SLP token transfer operations
///
/// Handles plain token sends and the SLP-to-Avalanche bridge send. Both
/// spend every UTXO of the token so the token change lands in one output.
use bitcoin::ScriptBuf;

use crate::bch::address::ensure_valid;
use crate::bch::slp::{self, MEMO_POST_PREFIX};
use crate::bch::transaction::{change_after, select_utxo, TransactionBuilder, DUST_SATS, TX_FEE_SATS};
use crate::bch::units::parse_token_qty;
use crate::bch::Network;
use crate::error::WalletError;
use crate::indexer::Indexer;
use crate::storage::{Storage, Utxo};
use crate::wallet::address_ops::issue_next_key;
use crate::wallet::signer::{SignedTransaction, WalletSigner};
use crate::wallet::sync_ops::refresh_wallet;

/// Token the bridge moves by default
pub const DEFAULT_BRIDGE_TOKEN_ID: &str =
    "c43eb59134473addee345df4172f4432bd09a8f087ba683462f0d66f8d221213";
/// Address watched by the bridge operator
pub const DEFAULT_BRIDGE_ADDRESS: &str = "bitcoincash:qrmjjjhz0a7dhp46ymw36l9zd0wcfryahq3s4989yj";
/// BCH the bridge funding UTXO must cover
pub const BRIDGE_FUNDING_SATS: u64 = 3_200;

#[derive(Debug, Clone)]
pub struct BroadcastResult {
    pub txid: String,
    pub hex: String,
    pub network: Network,
}

impl BroadcastResult {
    pub fn explorer_url(&self) -> String {
        self.network.explorer_url(&self.txid)
    }
}

/// SEND payload for `qty` of the token held in `token_utxos`.
/// The bool is true when a token change output is required.
pub fn token_send_script(token_utxos: &[Utxo], qty: &str) -> Result<(ScriptBuf, bool), WalletError> {
    let first = token_utxos
        .first()
        .and_then(|u| u.token.as_ref())
        .ok_or_else(|| WalletError::InsufficientFunds("No token UTXOs found for this token".into()))?;

    let mut total: u64 = 0;
    for utxo in token_utxos {
        let meta = utxo.token.as_ref().ok_or_else(|| {
            WalletError::Internal(format!("{} is not a token UTXO", utxo.transaction_id))
        })?;
        if meta.token_id != first.token_id || meta.token_type != first.token_type {
            return Err(WalletError::Internal("Token UTXOs of different tokens mixed".into()));
        }
        total = total
            .checked_add(parse_token_qty(&meta.token_qty, meta.decimals)?)
            .ok_or_else(|| WalletError::Internal("Token total overflow".into()))?;
    }

    let amount = parse_token_qty(qty, first.decimals)?;
    if amount == 0 {
        return Err(WalletError::InvalidInput("Token quantity must be greater than zero".into()));
    }
    if amount > total {
        return Err(WalletError::InsufficientFunds(format!(
            "Wallet holds {} {} but {} were requested",
            crate::bch::units::format_token_qty(total, first.decimals),
            first.token_ticker,
            qty
        )));
    }

    let change = total - amount;
    let amounts: Vec<u64> = if change > 0 { vec![amount, change] } else { vec![amount] };
    let script = slp::send_script(first.token_type, &first.token_id, &amounts)?;
    Ok((script, change > 0))
}

/// Inputs to a bridge transaction
#[derive(Debug, Clone)]
pub struct BridgeRequest {
    pub funding: Utxo,
    pub token_utxos: Vec<Utxo>,
    pub qty: String,
    pub bridge_address: String,
    pub change_address: String,
    pub avax_address: String,
}

/// Assemble and sign a bridge send.
///
/// Outputs, in order: SLP SEND, dust to the bridge, dust token change (only
/// when tokens are left over), BCH change, memo `avax <address>`, dust change.
pub fn assemble_bridge(
    signer: &WalletSigner,
    request: &BridgeRequest,
) -> Result<SignedTransaction, WalletError> {
    ensure_valid(&request.bridge_address)?;
    ensure_valid(&request.change_address)?;

    let remainder = change_after(request.funding.value_sats, TX_FEE_SATS, DUST_SATS * 3)?;
    let (slp_script, token_change) = token_send_script(&request.token_utxos, &request.qty)?;

    let mut builder = TransactionBuilder::new();
    builder.add_input(&request.funding)?;
    for utxo in &request.token_utxos {
        builder.add_input(utxo)?;
    }

    builder.add_output(slp_script, 0);
    builder.pay_to(&request.bridge_address, DUST_SATS)?;
    if token_change {
        builder.pay_to(&request.change_address, DUST_SATS)?;
    }
    builder.pay_to(&request.change_address, remainder)?;
    let message = format!("avax {}", request.avax_address.trim());
    builder.add_output(slp::memo_script(MEMO_POST_PREFIX, &message), 0);
    builder.pay_to(&request.change_address, DUST_SATS)?;

    signer.sign_transaction(builder)
}

/// Inputs to a token send
#[derive(Debug, Clone)]
pub struct TokenSendRequest {
    pub funding: Utxo,
    pub token_utxos: Vec<Utxo>,
    pub qty: String,
    pub receiver: String,
    pub change_address: String,
}

/// Assemble and sign a token send: SLP SEND, dust to the receiver, dust token
/// change when needed, BCH change.
pub fn assemble_token_send(
    signer: &WalletSigner,
    request: &TokenSendRequest,
) -> Result<SignedTransaction, WalletError> {
    ensure_valid(&request.receiver)?;
    ensure_valid(&request.change_address)?;

    let (slp_script, token_change) = token_send_script(&request.token_utxos, &request.qty)?;
    let dust_outputs = if token_change { 2 } else { 1 };
    let remainder = change_after(
        request.funding.value_sats,
        TX_FEE_SATS,
        DUST_SATS * dust_outputs,
    )?;

    let mut builder = TransactionBuilder::new();
    builder.add_input(&request.funding)?;
    for utxo in &request.token_utxos {
        builder.add_input(utxo)?;
    }

    builder.add_output(slp_script, 0);
    builder.pay_to(&request.receiver, DUST_SATS)?;
    if token_change {
        builder.pay_to(&request.change_address, DUST_SATS)?;
    }
    builder.pay_to(&request.change_address, remainder)?;

    signer.sign_transaction(builder)
}

fn validate_qty(qty: &str) -> Result<(), WalletError> {
    let valid = !qty.trim().is_empty()
        && qty.trim().parse::<f64>().map(|q| q.is_finite() && q > 0.0).unwrap_or(false);
    if !valid {
        return Err(WalletError::InvalidInput(
            "You must specify a quantity of tokens with the -q flag.".into(),
        ));
    }
    Ok(())
}

/// Sync, pick UTXOs, issue a change address, sign and broadcast a token send
pub async fn send_tokens(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
    token_id: &str,
    qty: &str,
    receiver: &str,
) -> Result<BroadcastResult, WalletError> {
    slp::validate_token_id(token_id)?;
    validate_qty(qty)?;
    ensure_valid(receiver)?;

    let _lock = storage.lock(wallet_name)?;
    let mut wallet = storage.open(wallet_name)?;
    refresh_wallet(&mut wallet, indexer).await?;
    storage.save(wallet_name, &wallet)?;

    // Inputs are checked before a change address is issued
    let token_utxos = wallet.token_utxos_for(token_id);
    let (_, token_change) = token_send_script(&token_utxos, qty)?;
    let dust_outputs = if token_change { 2 } else { 1 };
    let funding = select_utxo(
        wallet.plain_utxo_iter(),
        TX_FEE_SATS + DUST_SATS * (dust_outputs + 1),
    )?;
    change_after(funding.value_sats, TX_FEE_SATS, DUST_SATS * dust_outputs)?;

    let change_address = issue_next_key(&mut wallet)?.cash_address()?;
    storage.save(wallet_name, &wallet)?;

    let signer = WalletSigner::new(&wallet)?;
    let signed = assemble_token_send(
        &signer,
        &TokenSendRequest {
            funding,
            token_utxos,
            qty: qty.to_string(),
            receiver: receiver.to_string(),
            change_address,
        },
    )?;

    log::debug!("hex: {}", signed.hex);
    let txid = indexer.broadcast(&signed.hex).await?;
    Ok(BroadcastResult {
        txid,
        hex: signed.hex,
        network: wallet.network,
    })
}

/// Sync, pick UTXOs, issue a change address, sign and broadcast a bridge send
pub async fn bridge_tokens(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
    token_id: &str,
    qty: &str,
    bridge_address: &str,
    avax_address: &str,
) -> Result<BroadcastResult, WalletError> {
    slp::validate_token_id(token_id)?;
    validate_qty(qty)?;
    ensure_valid(bridge_address)?;
    if avax_address.trim().is_empty() {
        return Err(WalletError::InvalidInput(
            "You must specify a send-to address with the -x flag.".into(),
        ));
    }

    let _lock = storage.lock(wallet_name)?;
    let mut wallet = storage.open(wallet_name)?;
    refresh_wallet(&mut wallet, indexer).await?;
    storage.save(wallet_name, &wallet)?;

    let token_utxos = wallet.token_utxos_for(token_id);
    token_send_script(&token_utxos, qty)?;
    let funding = select_utxo(wallet.plain_utxo_iter(), BRIDGE_FUNDING_SATS)?;
    change_after(funding.value_sats, TX_FEE_SATS, DUST_SATS * 3)?;

    let change_address = issue_next_key(&mut wallet)?.cash_address()?;
    storage.save(wallet_name, &wallet)?;

    let signer = WalletSigner::new(&wallet)?;
    let signed = assemble_bridge(
        &signer,
        &BridgeRequest {
            funding,
            token_utxos,
            qty: qty.to_string(),
            bridge_address: bridge_address.to_string(),
            change_address,
            avax_address: avax_address.to_string(),
        },
    )?;

    log::debug!("hex: {}", signed.hex);
    let txid = indexer.broadcast(&signed.hex).await?;
    Ok(BroadcastResult {
        txid,
        hex: signed.hex,
        network: wallet.network,
    })
}
