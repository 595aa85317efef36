/// Synchronization operations
///
/// Brings a wallet document in line with the indexer: balances per address,
/// plain and token UTXO sets, and discovery of addresses used beyond the
/// wallet's cursor.

use chrono::Utc;
use std::collections::{HashMap, HashSet};

use crate::bch::address::to_cash_address;
use crate::bch::units::{format_token_qty, parse_token_qty, sats_to_bch};
use crate::error::WalletError;
use crate::indexer::{AddressUtxoEntry, Indexer, UtxoClass};
use crate::storage::{AddressBalance, AddressUtxos, Storage, Utxo, UtxoType, Wallet};
use crate::wallet::AddressManager;

/// Addresses per indexer round trip
pub const BATCH_SIZE: u32 = 20;
/// Scanning stops once the index passes this value
pub const SCAN_CEILING: u32 = 10_000;

/// Everything learned from one pass over the wallet's addresses
#[derive(Debug, Default, Clone)]
pub struct ScanResult {
    /// Every (index, address) pair that was queried
    pub scanned: Vec<(u32, String)>,
    pub balances: Vec<AddressBalance>,
    pub plain_utxos: Vec<AddressUtxos>,
    pub token_utxos: Vec<AddressUtxos>,
    /// `txid:vout` of UTXOs without a validity verdict
    pub unvalidated: Vec<String>,
    /// Highest index with a balance or an unspent output
    pub highest_used: Option<u32>,
}

/// Outcome of a sync, for display
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub previous_balance: f64,
    pub balance: f64,
    pub confirmed_balance: f64,
    pub unconfirmed_balance: f64,
    pub addresses_scanned: usize,
    pub next_address_index: u32,
    pub unvalidated: Vec<String>,
    pub tokens: Vec<TokenBalance>,
}

/// Per-token total across the wallet, minting batons excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub token_id: String,
    pub ticker: String,
    pub decimals: u8,
    pub units: u64,
}

impl TokenBalance {
    pub fn display_balance(&self) -> String {
        format_token_qty(self.units, self.decimals)
    }
}

fn index_of(lookup: &HashMap<String, u32>, address: &str) -> Result<u32, WalletError> {
    if let Some(index) = lookup.get(address) {
        return Ok(*index);
    }
    let normalized = to_cash_address(address)?;
    lookup.get(&normalized).copied().ok_or_else(|| {
        WalletError::Indexer(format!("Indexer returned data for unknown address {}", address))
    })
}

/// Walk derived addresses in batches until the used range ends.
///
/// Continues while the previous batch held any balance or the scan is still
/// below `next_address_index`. Any indexer failure aborts the whole scan.
pub async fn scan_wallet(wallet: &Wallet, indexer: &dyn Indexer) -> Result<ScanResult, WalletError> {
    let mut result = ScanResult::default();
    let mut index = 0u32;
    let mut batch_has_balance = true;
    let account = AddressManager::account(wallet)?;

    while batch_has_balance || index < wallet.next_address_index {
        log::info!(
            "Getting address data at index {} up to index {}",
            index,
            index + BATCH_SIZE
        );
        let batch = AddressManager::derive_addresses(&account, index, BATCH_SIZE)?;
        let lookup: HashMap<String, u32> = batch.iter().map(|(i, a)| (a.clone(), *i)).collect();
        let addresses: Vec<String> = batch.iter().map(|(_, a)| a.clone()).collect();

        let (balances, utxos) =
            futures::try_join!(indexer.balances(&addresses), indexer.utxos(&addresses))?;

        batch_has_balance = balances.iter().any(|b| b.has_balance());

        // Any nonzero amount is recorded, only a positive one extends the scan
        for entry in &balances {
            if entry.balance.confirmed == 0 && entry.balance.unconfirmed == 0 {
                continue;
            }
            let hd_index = index_of(&lookup, &entry.address)?;
            result.highest_used = result.highest_used.max(Some(hd_index));
            result.balances.push(AddressBalance {
                index: hd_index,
                address: addresses[(hd_index - index) as usize].clone(),
                confirmed_sats: entry.balance.confirmed,
                unconfirmed_sats: entry.balance.unconfirmed,
            });
        }

        let funded: Vec<AddressUtxoEntry> =
            utxos.into_iter().filter(|entry| !entry.utxos.is_empty()).collect();
        if !funded.is_empty() {
            let hydrated = indexer.hydrate_utxos(&funded).await?;
            let mut returned = HashSet::new();
            for group in hydrated {
                let hd_index = index_of(&lookup, &group.address)?;
                let address = addresses[(hd_index - index) as usize].clone();
                result.highest_used = result.highest_used.max(Some(hd_index));

                let mut plain = Vec::new();
                let mut tokens = Vec::new();
                for utxo in &group.utxos {
                    let outpoint = format!("{}:{}", utxo.tx_hash, utxo.tx_pos);
                    returned.insert(outpoint.clone());
                    let record = |token| Utxo {
                        transaction_id: utxo.tx_hash.clone(),
                        output_index: utxo.tx_pos,
                        value_sats: utxo.value,
                        owner_address: address.clone(),
                        derivation_index: hd_index,
                        height: utxo.height,
                        token,
                    };
                    match utxo.classify() {
                        UtxoClass::Plain => {
                            if utxo.has_token_fields() {
                                log::warn!(
                                    "Invalid SLP UTXO {} treated as plain BCH",
                                    outpoint
                                );
                            }
                            plain.push(record(None));
                        }
                        UtxoClass::Token(meta) => tokens.push(record(Some(meta))),
                        UtxoClass::Unvalidated => {
                            log::warn!("Warning: Unvalidated UTXO detected: {}", outpoint);
                            result.unvalidated.push(outpoint);
                        }
                    }
                }

                if !plain.is_empty() {
                    result.plain_utxos.push(AddressUtxos {
                        address: address.clone(),
                        utxos: plain,
                    });
                }
                if !tokens.is_empty() {
                    result.token_utxos.push(AddressUtxos {
                        address,
                        utxos: tokens,
                    });
                }
            }

            // Outputs the hydration dropped are reported, never silently lost
            for entry in &funded {
                for utxo in &entry.utxos {
                    let outpoint = format!("{}:{}", utxo.tx_hash, utxo.tx_pos);
                    if !returned.contains(&outpoint) {
                        log::warn!("Warning: UTXO {} missing from SLP hydration", outpoint);
                        result.unvalidated.push(outpoint);
                    }
                }
            }
        }

        result.scanned.extend(batch);
        index += BATCH_SIZE;

        if index > SCAN_CEILING {
            log::warn!("Stopping address scan at index {}", index);
            break;
        }
    }

    Ok(result)
}

/// Fold a scan into the wallet. Derived fields are replaced, `addresses` is
/// only extended and `next_address_index` only moves forward.
pub fn apply_scan(wallet: &mut Wallet, scan: ScanResult) {
    if let Some(used) = scan.highest_used {
        if used >= wallet.next_address_index {
            log::info!(
                "Found activity at index {}, advancing next address index from {} to {}",
                used,
                wallet.next_address_index,
                used + 1
            );
            wallet.next_address_index = used + 1;
        }
    }

    for (index, address) in scan.scanned {
        if index < wallet.next_address_index {
            wallet.record_address(index, address);
        }
    }

    let confirmed: i64 = scan.balances.iter().map(|b| b.confirmed_sats).sum();
    let unconfirmed: i64 = scan.balances.iter().map(|b| b.unconfirmed_sats).sum();

    wallet.confirmed_balance = sats_to_bch(confirmed);
    wallet.unconfirmed_balance = sats_to_bch(unconfirmed);
    wallet.balance = sats_to_bch(confirmed + unconfirmed);
    wallet.addresses_with_balance = scan.balances;
    wallet.plain_utxos = scan.plain_utxos;
    wallet.token_utxos = scan.token_utxos;
    wallet.last_synced = Some(Utc::now());
}

/// Scan and apply without touching disk. Callers own locking and saving.
pub async fn refresh_wallet(
    wallet: &mut Wallet,
    indexer: &dyn Indexer,
) -> Result<SyncReport, WalletError> {
    let previous_balance = wallet.balance;
    let scan = scan_wallet(wallet, indexer).await?;
    let addresses_scanned = scan.scanned.len();
    let unvalidated = scan.unvalidated.clone();

    apply_scan(wallet, scan);

    Ok(SyncReport {
        previous_balance,
        balance: wallet.balance,
        confirmed_balance: wallet.confirmed_balance,
        unconfirmed_balance: wallet.unconfirmed_balance,
        addresses_scanned,
        next_address_index: wallet.next_address_index,
        unvalidated,
        tokens: token_summary(wallet)?,
    })
}

/// Sync a stored wallet: lock, scan, apply, save atomically
pub async fn sync_wallet(
    storage: &Storage,
    indexer: &dyn Indexer,
    wallet_name: &str,
) -> Result<SyncReport, WalletError> {
    let _lock = storage.lock(wallet_name)?;
    let mut wallet = storage.open(wallet_name)?;

    let report = refresh_wallet(&mut wallet, indexer).await?;
    storage.save(wallet_name, &wallet)?;

    log::info!(
        "Synced {}: {} addresses scanned, balance {} BCH",
        wallet_name,
        report.addresses_scanned,
        report.balance
    );
    Ok(report)
}

/// Token totals in first-seen order
pub fn token_summary(wallet: &Wallet) -> Result<Vec<TokenBalance>, WalletError> {
    let mut totals: Vec<TokenBalance> = Vec::new();

    for utxo in wallet.token_utxo_iter() {
        let Some(meta) = &utxo.token else { continue };

        let position = match totals.iter().position(|t| t.token_id == meta.token_id) {
            Some(position) => position,
            None => {
                totals.push(TokenBalance {
                    token_id: meta.token_id.clone(),
                    ticker: meta.token_ticker.clone(),
                    decimals: meta.decimals,
                    units: 0,
                });
                totals.len() - 1
            }
        };

        if meta.utxo_type == UtxoType::MintingBaton {
            continue;
        }
        let units = parse_token_qty(&meta.token_qty, meta.decimals)?;
        let entry = &mut totals[position];
        entry.ticker = meta.token_ticker.clone();
        entry.units = entry.units.checked_add(units).ok_or_else(|| {
            WalletError::Internal(format!("Token total overflow for {}", meta.token_id))
        })?;
    }

    Ok(totals)
}
