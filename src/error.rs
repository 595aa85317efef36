use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet already exists: {0}")]
    WalletExists(String),

    #[error("Could not open {0}")]
    WalletNotFound(String),

    #[error("Wallet {0} is in use by another command, try again")]
    WalletBusy(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Wallet has no mnemonic: {0}")]
    MissingMnemonic(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Bitcoin error: {0}")]
    Bitcoin(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not open {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Wallet directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Could not open {0}")]
    FileNotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),
}
