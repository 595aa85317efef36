use bitcoin::blockdata::script::{Builder, PushBytesBuf, ScriptBuf};
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sign_message::{signed_msg_hash, MessageSignature};
use bitcoin::Transaction;
use std::collections::HashMap;

use crate::bch::transaction::{forkid_signature_hash, TransactionBuilder, SIGHASH_ALL_FORKID};
use crate::error::WalletError;
use crate::storage::{DerivedKey, HdAccount, Wallet};
use crate::wallet::AddressManager;

/// Signer for P2PKH inputs owned by one wallet.
///
/// Every input is signed with the key at its own UTXO's derivation index, so
/// a transaction may spend from any mix of wallet addresses.
pub struct WalletSigner {
    account: HdAccount,
}

/// Signed transaction ready for broadcast
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub hex: String,
    pub txid: String,
}

impl WalletSigner {
    pub fn new(wallet: &Wallet) -> Result<Self, WalletError> {
        Ok(Self {
            account: AddressManager::account(wallet)?,
        })
    }

    fn key_for(&self, index: u32, owner: &str) -> Result<DerivedKey, WalletError> {
        let key = self.account.derive(index)?;
        let address = key.cash_address()?;
        if address != owner {
            return Err(WalletError::Bitcoin(format!(
                "UTXO owner {} does not match derived address {} at index {}",
                owner, address, index
            )));
        }
        Ok(key)
    }

    pub fn sign_transaction(&self, builder: TransactionBuilder) -> Result<SignedTransaction, WalletError> {
        let (mut tx, spent) = builder.into_parts();
        let secp = Secp256k1::signing_only();
        let mut keys: HashMap<u32, DerivedKey> = HashMap::new();
        let mut script_sigs = Vec::with_capacity(spent.len());

        for (input_index, utxo) in spent.iter().enumerate() {
            if !keys.contains_key(&utxo.derivation_index) {
                let key = self.key_for(utxo.derivation_index, &utxo.owner_address)?;
                keys.insert(utxo.derivation_index, key);
            }
            let key = &keys[&utxo.derivation_index];

            let script_code = ScriptBuf::new_p2pkh(&key.public_key.pubkey_hash());
            let digest = forkid_signature_hash(&tx, input_index, &script_code, utxo.value_sats)?;

            let message = Message::from_digest(digest);
            let signature = secp.sign_ecdsa(&message, &key.secret_key);

            let mut sig_with_hashtype = signature.serialize_der().to_vec();
            sig_with_hashtype.push(SIGHASH_ALL_FORKID as u8);

            let sig_push = PushBytesBuf::try_from(sig_with_hashtype)
                .map_err(|e| WalletError::Bitcoin(e.to_string()))?;
            let script_sig = Builder::new()
                .push_slice(sig_push)
                .push_key(&key.public_key)
                .into_script();
            script_sigs.push(script_sig);
        }

        for (input, script_sig) in tx.input.iter_mut().zip(script_sigs) {
            input.script_sig = script_sig;
        }

        Ok(SignedTransaction {
            hex: bitcoin::consensus::encode::serialize_hex(&tx),
            txid: tx.compute_txid().to_string(),
            tx,
        })
    }

    /// Bitcoin signed-message signature (base64, compact recoverable)
    pub fn sign_message(&self, index: u32, message: &str) -> Result<String, WalletError> {
        let key = self.account.derive(index)?;
        let secp = Secp256k1::signing_only();

        let msg_hash = signed_msg_hash(message);
        let digest = Message::from_digest(msg_hash.to_byte_array());
        let signature = secp.sign_ecdsa_recoverable(&digest, &key.secret_key);

        Ok(MessageSignature::new(signature, true).to_base64())
    }
}
