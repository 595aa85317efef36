use bitcoin::blockdata::script::{Script, ScriptBuf};
use bitcoin::blockdata::transaction::{Transaction, TxIn, TxOut};
use bitcoin::blockdata::witness::Witness;
use bitcoin::hashes::{sha256d, Hash};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::{OutPoint, Sequence};
use bitcoin::{absolute, Amount};

use crate::error::WalletError;
use crate::storage::Utxo;

/// Flat fee paid by every assembled transaction
pub const TX_FEE_SATS: u64 = 500;
/// Smallest output value accepted by the network
pub const DUST_SATS: u64 = 546;
/// Headroom added on top of the amount when picking a single funding UTXO
pub const SELECTION_FEE_SATS: u64 = 250;
/// SIGHASH_ALL | SIGHASH_FORKID
pub const SIGHASH_ALL_FORKID: u32 = 0x41;

/// Unsigned transaction plus the UTXOs it spends, in input order.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    tx: Transaction,
    spent: Vec<Utxo>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self {
            tx: Transaction {
                version: bitcoin::transaction::Version::TWO,
                lock_time: absolute::LockTime::ZERO,
                input: vec![],
                output: vec![],
            },
            spent: Vec::new(),
        }
    }

    pub fn add_input(&mut self, utxo: &Utxo) -> Result<&mut Self, WalletError> {
        self.tx.input.push(TxIn {
            previous_output: OutPoint {
                txid: utxo
                    .transaction_id
                    .parse()
                    .map_err(|e| WalletError::Bitcoin(format!("Invalid txid: {}", e)))?,
                vout: utxo.output_index,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        });
        self.spent.push(utxo.clone());
        Ok(self)
    }

    pub fn add_output(&mut self, script_pubkey: ScriptBuf, sats: u64) -> &mut Self {
        self.tx.output.push(TxOut {
            value: Amount::from_sat(sats),
            script_pubkey,
        });
        self
    }

    /// Append an output paying `sats` to a CashAddr or legacy address
    pub fn pay_to(&mut self, address: &str, sats: u64) -> Result<&mut Self, WalletError> {
        let script = crate::bch::address::script_pubkey(address)?;
        Ok(self.add_output(script, sats))
    }

    pub fn input_value(&self) -> u64 {
        self.spent.iter().map(|u| u.value_sats).sum()
    }

    pub fn output_value(&self) -> u64 {
        self.tx.output.iter().map(|o| o.value.to_sat()).sum()
    }

    pub fn inputs(&self) -> &[Utxo] {
        &self.spent
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.tx.output
    }

    pub fn into_parts(self) -> (Transaction, Vec<Utxo>) {
        (self.tx, self.spent)
    }
}

/// Signature digest for a BCH input.
///
/// BCH signs the BIP143 preimage for every input type, with the FORKID bit set
/// in the trailing sighash type field.
pub fn forkid_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    value_sats: u64,
) -> Result<[u8; 32], WalletError> {
    let mut preimage = Vec::new();
    let mut cache = SighashCache::new(tx);
    cache
        .segwit_v0_encode_signing_data_to(
            &mut preimage,
            input_index,
            script_code,
            Amount::from_sat(value_sats),
            EcdsaSighashType::All,
        )
        .map_err(|e| WalletError::Bitcoin(format!("Sighash failed: {}", e)))?;

    let type_offset = preimage.len() - 4;
    preimage[type_offset..].copy_from_slice(&SIGHASH_ALL_FORKID.to_le_bytes());

    Ok(sha256d::Hash::hash(&preimage).to_byte_array())
}

/// Pick the smallest single UTXO worth at least `required_sats` plus the
/// selection headroom.
pub fn select_utxo<'a, I>(utxos: I, required_sats: u64) -> Result<Utxo, WalletError>
where
    I: IntoIterator<Item = &'a Utxo>,
{
    let target = required_sats + SELECTION_FEE_SATS;
    utxos
        .into_iter()
        .filter(|u| u.token.is_none() && u.value_sats >= target)
        .min_by_key(|u| u.value_sats)
        .cloned()
        .ok_or_else(|| {
            WalletError::InsufficientFunds(
                "Could not find a UTXO big enough for this transaction. More BCH needed.".into(),
            )
        })
}

/// `input - fee - outputs`, rejected when the result would be dust.
pub fn change_after(input_sats: u64, fee_sats: u64, outputs_sats: u64) -> Result<u64, WalletError> {
    input_sats
        .checked_sub(fee_sats + outputs_sats)
        .filter(|remainder| *remainder >= DUST_SATS)
        .ok_or_else(|| {
            WalletError::InsufficientFunds(format!(
                "Selected UTXO does not have enough satoshis: {} sats in, {} sats needed",
                input_sats,
                fee_sats + outputs_sats + DUST_SATS
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(value: u64, txid_byte: u8) -> Utxo {
        Utxo {
            transaction_id: hex::encode([txid_byte; 32]),
            output_index: 0,
            value_sats: value,
            owner_address: "bitcoincash:qrpkufwnfdzp8cnxzer8d8fkhqmh0zyphq6u3gx6e3".into(),
            derivation_index: 0,
            height: 0,
            token: None,
        }
    }

    #[test]
    fn test_select_smallest_sufficient() {
        let utxos = vec![plain(10_000, 1), plain(4_000, 2), plain(3_000, 3)];
        let picked = select_utxo(&utxos, 3_200).unwrap();
        assert_eq!(picked.value_sats, 4_000);
    }

    #[test]
    fn test_select_fails_when_too_small() {
        let utxos = vec![plain(3_300, 1)];
        let err = select_utxo(&utxos, 3_200).unwrap_err();
        assert!(err.to_string().contains("More BCH needed"));
    }

    #[test]
    fn test_change_after() {
        assert_eq!(change_after(10_000, 500, 546).unwrap(), 8_954);
        assert!(change_after(1_500, 500, 546).is_err());
        assert!(change_after(100, 500, 0).is_err());
    }

    #[test]
    fn test_builder_tracks_values() {
        let mut builder = TransactionBuilder::new();
        builder.add_input(&plain(10_000, 1)).unwrap();
        builder
            .pay_to("bitcoincash:qrpkufwnfdzp8cnxzer8d8fkhqmh0zyphq6u3gx6e3", 546)
            .unwrap();
        assert_eq!(builder.input_value(), 10_000);
        assert_eq!(builder.output_value(), 546);
        assert_eq!(builder.inputs().len(), 1);
    }

    #[test]
    fn test_forkid_digest_differs_per_input() {
        let mut builder = TransactionBuilder::new();
        builder.add_input(&plain(10_000, 1)).unwrap();
        builder.add_input(&plain(20_000, 2)).unwrap();
        builder.add_output(ScriptBuf::from_bytes(vec![0x6a]), 0);
        let (tx, spent) = builder.into_parts();
        let script = crate::bch::address::script_pubkey(&spent[0].owner_address).unwrap();

        let first = forkid_signature_hash(&tx, 0, &script, 10_000).unwrap();
        let second = forkid_signature_hash(&tx, 1, &script, 20_000).unwrap();
        assert_ne!(first, second);
        assert!(forkid_signature_hash(&tx, 2, &script, 1).is_err());
    }
}
