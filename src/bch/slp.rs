//! SLP (Simple Ledger Protocol) OP_RETURN payloads
//!
//! Every SLP transaction carries its token data in output 0:
//!
//! ```text
//! OP_RETURN <'SLP\0'> <token_type> <'GENESIS' | 'SEND'> <fields...>
//! ```
//!
//! SLP requires every field to be a data push, so single bytes are never
//! encoded as `OP_1..OP_16` and empty fields use `OP_PUSHDATA1 0x00`.
//! The script bytes are therefore written directly instead of going through
//! `bitcoin::script::Builder`, which minimally encodes small pushes.

use bitcoin::ScriptBuf;

use crate::error::WalletError;

pub const LOKAD_ID: &[u8; 4] = b"SLP\0";

/// Fungible token (type 1)
pub const TOKEN_TYPE_FUNGIBLE: u8 = 0x01;
/// NFT1 child token (type 65)
pub const TOKEN_TYPE_NFT_CHILD: u8 = 0x41;
/// NFT1 group token (type 129)
pub const TOKEN_TYPE_NFT_GROUP: u8 = 0x81;

/// memo.cash "post memo" action prefix
pub const MEMO_POST_PREFIX: [u8; 2] = [0x6d, 0x02];

/// An SLP SEND may carry at most 19 output quantities
pub const MAX_SEND_OUTPUTS: usize = 19;

const OP_RETURN: u8 = 0x6a;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;

fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0 => script.extend_from_slice(&[OP_PUSHDATA1, 0x00]),
        len @ 1..=75 => script.push(len as u8),
        len @ 76..=255 => script.extend_from_slice(&[OP_PUSHDATA1, len as u8]),
        len => {
            script.push(OP_PUSHDATA2);
            script.extend_from_slice(&(len as u16).to_le_bytes());
        }
    }
    script.extend_from_slice(data);
}

fn parse_token_id(token_id: &str) -> Result<[u8; 32], WalletError> {
    let bytes = hex::decode(token_id.trim()).map_err(|_| {
        WalletError::InvalidInput("TokenIdHex must be provided as a 64 character hex string.".into())
    })?;
    bytes.try_into().map_err(|_| {
        WalletError::InvalidInput("TokenIdHex must be provided as a 64 character hex string.".into())
    })
}

/// Check a token id is 32 bytes of hex
pub fn validate_token_id(token_id: &str) -> Result<(), WalletError> {
    parse_token_id(token_id).map(|_| ())
}

/// SEND payload moving `amounts[i]` base units to transaction output `i + 1`.
pub fn send_script(token_type: u8, token_id: &str, amounts: &[u64]) -> Result<ScriptBuf, WalletError> {
    if amounts.is_empty() || amounts.len() > MAX_SEND_OUTPUTS {
        return Err(WalletError::InvalidInput(format!(
            "SLP SEND needs between 1 and {} outputs, got {}",
            MAX_SEND_OUTPUTS,
            amounts.len()
        )));
    }
    let token_id = parse_token_id(token_id)?;

    let mut script = vec![OP_RETURN];
    push_data(&mut script, LOKAD_ID);
    push_data(&mut script, &[token_type]);
    push_data(&mut script, b"SEND");
    push_data(&mut script, &token_id);
    for amount in amounts {
        push_data(&mut script, &amount.to_be_bytes());
    }
    Ok(ScriptBuf::from_bytes(script))
}

/// Parameters of a GENESIS (token creation) payload
#[derive(Debug, Clone)]
pub struct GenesisParams {
    pub token_type: u8,
    pub ticker: String,
    pub name: String,
    pub document_url: String,
    /// Empty, or 32 bytes of hex
    pub document_hash: String,
    pub decimals: u8,
    pub mint_baton_vout: Option<u8>,
    pub quantity: u64,
}

pub fn genesis_script(params: &GenesisParams) -> Result<ScriptBuf, WalletError> {
    if params.decimals > crate::bch::units::MAX_TOKEN_DECIMALS {
        return Err(WalletError::InvalidInput(format!(
            "Token decimals must be 9 or less, got {}",
            params.decimals
        )));
    }
    if params.token_type == TOKEN_TYPE_NFT_CHILD
        && (params.decimals != 0 || params.quantity != 1 || params.mint_baton_vout.is_some())
    {
        return Err(WalletError::InvalidInput(
            "NFT child genesis must have quantity 1, 0 decimals and no minting baton".into(),
        ));
    }
    if let Some(vout) = params.mint_baton_vout {
        if vout < 2 {
            return Err(WalletError::InvalidInput(format!(
                "Minting baton output must be 2 or higher, got {}",
                vout
            )));
        }
    }

    let document_hash = if params.document_hash.is_empty() {
        Vec::new()
    } else {
        let bytes = hex::decode(&params.document_hash)
            .map_err(|e| WalletError::InvalidInput(format!("Invalid document hash: {}", e)))?;
        if bytes.len() != 32 {
            return Err(WalletError::InvalidInput(
                "Document hash must be 32 bytes of hex".into(),
            ));
        }
        bytes
    };

    let mut script = vec![OP_RETURN];
    push_data(&mut script, LOKAD_ID);
    push_data(&mut script, &[params.token_type]);
    push_data(&mut script, b"GENESIS");
    push_data(&mut script, params.ticker.as_bytes());
    push_data(&mut script, params.name.as_bytes());
    push_data(&mut script, params.document_url.as_bytes());
    push_data(&mut script, &document_hash);
    push_data(&mut script, &[params.decimals]);
    match params.mint_baton_vout {
        Some(vout) => push_data(&mut script, &[vout]),
        None => push_data(&mut script, &[]),
    }
    push_data(&mut script, &params.quantity.to_be_bytes());
    Ok(ScriptBuf::from_bytes(script))
}

/// memo.cash style data carrier: `OP_RETURN <prefix> <text>`
pub fn memo_script(prefix: [u8; 2], text: &str) -> ScriptBuf {
    let mut script = vec![OP_RETURN];
    push_data(&mut script, &prefix);
    push_data(&mut script, text.as_bytes());
    ScriptBuf::from_bytes(script)
}
