use clap::Parser;

use slp_wallet::cli::{handlers, Cli};
use slp_wallet::{WalletConfig, WalletManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok(); // Load .env file if present

    // Initialize logger (set RUST_LOG=debug for verbose output, RUST_LOG=info for normal)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = WalletConfig::from_env();
    log::debug!("Wallet directory: {}", config.wallets_dir.display());

    let manager = WalletManager::new(config);
    let code = handlers::run(&manager, cli.command).await;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
