/// Indexer Mock Server
///
/// Serves the bch-api endpoints used by slp-wallet from an in-memory ledger.
/// Designed for local development against throwaway wallets.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use indexer_mock::{run_server, MockState};

#[derive(Debug)]
struct Config {
    // Optional JSON ledger to preload
    fixture: Option<PathBuf>,

    // Server
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let fixture = env::var("MOCK_FIXTURE").ok().map(PathBuf::from);

        let server_host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            fixture,
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting Indexer Mock Server...");

    // Load configuration
    let config = Config::from_env()
        .context("Failed to load configuration")?;

    let state = match &config.fixture {
        Some(path) => {
            log::info!("Loading ledger from {}", path.display());
            MockState::from_fixture(path)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => MockState::new(),
    };

    // Run server
    run_server(Arc::new(state), config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
