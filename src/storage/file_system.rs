use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::models::Wallet;
use crate::error::{StorageError, WalletError};

#[derive(Clone)]
pub struct Storage {
    base_path: PathBuf,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    /// Create a new storage instance with the default base directory ("./wallets")
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("./wallets"),
        }
    }

    /// Create storage with custom base directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the base directory path for wallet storage
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    /// Path of the JSON document for a wallet
    pub fn wallet_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", name))
    }

    fn lock_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.json.lock", name))
    }

    /// Check if a wallet with the given name exists
    pub fn wallet_exists(&self, name: &str) -> bool {
        self.wallet_path(name).exists()
    }

    /// Load a wallet document. Missing and unparsable files are both
    /// reported as "Could not open".
    pub fn open(&self, name: &str) -> Result<Wallet, StorageError> {
        let path = self.wallet_path(name);
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(&path).map_err(|e| StorageError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| StorageError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write a new wallet document, refusing to replace an existing file
    pub fn create(&self, name: &str, wallet: &Wallet) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.wallet_path(name);
        let json = serde_json::to_string_pretty(wallet)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Replace a wallet document atomically (temp file in the same directory,
    /// then rename over the target).
    pub fn save(&self, name: &str, wallet: &Wallet) -> Result<(), StorageError> {
        if !self.base_path.is_dir() {
            return Err(StorageError::DirectoryNotFound(
                self.base_path.display().to_string(),
            ));
        }
        let path = self.wallet_path(name);
        let json = serde_json::to_string_pretty(wallet)?;

        let mut tmp = NamedTempFile::new_in(&self.base_path)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;

        log::debug!("Saved wallet to {}", path.display());
        Ok(())
    }

    /// List wallet names (JSON files in the base directory), sorted
    pub fn list_wallets(&self) -> Result<Vec<String>, StorageError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut wallets = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                wallets.push(name.to_string());
            }
        }
        wallets.sort();
        Ok(wallets)
    }

    /// Delete a wallet document and its lock file
    pub fn delete_wallet(&self, name: &str) -> Result<(), StorageError> {
        let path = self.wallet_path(name);
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        fs::remove_file(&path)?;

        let lock_path = self.lock_path(name);
        if lock_path.exists() {
            fs::remove_file(lock_path)?;
        }
        Ok(())
    }

    /// Take exclusive access to a wallet for a read-modify-write cycle.
    ///
    /// Fails fast with [`WalletError::WalletBusy`] if another command holds it.
    pub fn lock(&self, name: &str) -> Result<WalletLock, WalletError> {
        if !self.wallet_exists(name) {
            return Err(WalletError::WalletNotFound(
                self.wallet_path(name).display().to_string(),
            ));
        }
        WalletLock::acquire(&self.lock_path(name), name)
    }
}

/// Exclusive advisory lock on a wallet, released on drop
#[derive(Debug)]
pub struct WalletLock {
    file: File,
}

impl WalletLock {
    fn acquire(path: &Path, name: &str) -> Result<Self, WalletError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(StorageError::from)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file }),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(WalletError::WalletBusy(name.to_string()))
            }
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }
}

impl Drop for WalletLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("Failed to release wallet lock: {}", e);
        }
    }
}
