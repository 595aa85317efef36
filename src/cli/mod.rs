//! Command-line interface
//!
//! One subcommand per wallet action. Handlers live in [`handlers`] and all
//! console formatting in [`output`].

pub mod handlers;
pub mod output;

use clap::{Args, Parser, Subcommand};

use crate::wallet::token_ops::{DEFAULT_BRIDGE_ADDRESS, DEFAULT_BRIDGE_TOKEN_ID};

#[derive(Parser, Debug)]
#[command(name = "slp-wallet", version, about = "HD wallet for Bitcoin Cash and SLP tokens")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new HD wallet
    #[command(name = "create-wallet")]
    CreateWallet(CreateWalletArgs),
    /// List existing wallets
    #[command(name = "list-wallets")]
    ListWallets,
    /// Remove an existing wallet
    #[command(name = "remove-wallet")]
    RemoveWallet(NameArgs),
    /// Generate a new address to receive BCH
    #[command(name = "get-address")]
    GetAddress(GetAddressArgs),
    /// Generate a new private/public key pair
    #[command(name = "get-key")]
    GetKey(NameArgs),
    /// Sign a message with the key at an address index
    #[command(name = "sign-message")]
    SignMessage(SignMessageArgs),
    /// Poll the network and update the balances of the wallet
    #[command(name = "update-balances")]
    UpdateBalances(NameArgs),
    /// Show or change the derivation coin type
    Derivation(DerivationArgs),
    /// Create an NFT group
    #[command(name = "nft-create-group", disable_help_flag = true)]
    NftCreateGroup(NftCreateGroupArgs),
    /// Create an NFT child token in a group
    #[command(name = "nft-create-child", disable_help_flag = true)]
    NftCreateChild(NftCreateChildArgs),
    /// Burn an NFT child token
    #[command(name = "nft-remove-child")]
    NftRemoveChild(NftRemoveChildArgs),
    /// List NFT tokens held at a wallet address
    #[command(name = "nft-list-tokens")]
    NftListTokens(NftListTokensArgs),
    /// List addresses inside the wallet
    #[command(name = "nft-list-addr")]
    NftListAddr(NameArgs),
    /// Send SLP tokens
    #[command(name = "send-tokens")]
    SendTokens(SendTokensArgs),
    /// Send SLP tokens to the Avalanche bridge
    #[command(name = "slp-avax-bridge")]
    SlpAvaxBridge(BridgeArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateWalletArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Create a testnet wallet
    #[arg(short = 't', long)]
    pub testnet: bool,
    /// Description of the wallet
    #[arg(short = 'd', long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct GetAddressArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Show the QR code of the legacy address
    #[arg(short = 'l', long)]
    pub legacy: bool,
}

#[derive(Args, Debug)]
pub struct SignMessageArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Address index
    #[arg(short = 'i', long = "sendAddrIndex", alias = "index")]
    pub index: Option<String>,
    /// Message to sign
    #[arg(short = 'm', long)]
    pub message: Option<String>,
}

#[derive(Args, Debug)]
pub struct DerivationArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Coin type to save
    #[arg(short = 's', long)]
    pub save: Option<String>,
}

#[derive(Args, Debug)]
pub struct NftCreateGroupArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Address index in the wallet
    #[arg(short = 'i', long)]
    pub index: Option<String>,
    /// Fee funder address index in the wallet
    #[arg(short = 'f', long)]
    pub funder: Option<String>,
    /// Name of the group
    #[arg(short = 'g', long)]
    pub group: Option<String>,
    /// Ticker of the group
    #[arg(short = 't', long)]
    pub ticker: Option<String>,
    /// Amount of tokens in the group
    #[arg(short = 'a', long)]
    pub amount: Option<u64>,
    /// Document URL of the group
    #[arg(short = 'u', long)]
    pub url: Option<String>,
    /// Document hash of the group
    #[arg(short = 'h', long)]
    pub hash: Option<String>,
}

#[derive(Args, Debug)]
pub struct NftCreateChildArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Address index in the wallet
    #[arg(short = 'i', long)]
    pub index: Option<String>,
    /// Fee funder address index in the wallet
    #[arg(short = 'f', long)]
    pub funder: Option<String>,
    /// NFT group ID
    #[arg(short = 'g', long = "groupId")]
    pub group_id: Option<String>,
    /// Name of the child
    #[arg(short = 'c', long)]
    pub child: Option<String>,
    /// Ticker of the child
    #[arg(short = 't', long)]
    pub ticker: Option<String>,
    /// Document URL of the child
    #[arg(short = 'u', long)]
    pub url: Option<String>,
    /// Document hash of the child
    #[arg(short = 'h', long)]
    pub hash: Option<String>,
    /// Address to send the token
    #[arg(short = 'r', long)]
    pub receiver: Option<String>,
}

#[derive(Args, Debug)]
pub struct NftRemoveChildArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Address index in the wallet
    #[arg(short = 'i', long)]
    pub index: Option<String>,
    /// Fee funder address index in the wallet
    #[arg(short = 'f', long)]
    pub funder: Option<String>,
    /// NFT child tokenId
    #[arg(short = 't', long = "tokenId")]
    pub token_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct NftListTokensArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Address index in the wallet
    #[arg(short = 'i', long)]
    pub index: Option<String>,
    /// List only NFT groups
    #[arg(short = 'g', long)]
    pub groups: bool,
}

#[derive(Args, Debug)]
pub struct SendTokensArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Token ID
    #[arg(short = 't', long = "tokenId")]
    pub token_id: Option<String>,
    /// Cash address to send tokens to
    #[arg(short = 'a', long = "sendAddr")]
    pub send_addr: Option<String>,
    /// Quantity of tokens to send
    #[arg(short = 'q', long)]
    pub qty: Option<String>,
}

#[derive(Args, Debug)]
pub struct BridgeArgs {
    /// Name of wallet
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// Token ID
    #[arg(short = 't', long = "tokenId", default_value = DEFAULT_BRIDGE_TOKEN_ID)]
    pub token_id: String,
    /// Cash bridge address
    #[arg(short = 'a', long = "sendAddr", default_value = DEFAULT_BRIDGE_ADDRESS)]
    pub send_addr: String,
    /// Avalanche address to send tokens to from the bridge
    #[arg(short = 'x', long = "avaxAddr")]
    pub avax_addr: Option<String>,
    /// Quantity of tokens to send
    #[arg(short = 'q', long)]
    pub qty: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bridge_defaults() {
        let cli = Cli::parse_from(["slp-wallet", "slp-avax-bridge", "-n", "alice", "-q", "1", "-x", "X-avax1"]);
        match cli.command {
            Command::SlpAvaxBridge(args) => {
                assert_eq!(args.token_id, DEFAULT_BRIDGE_TOKEN_ID);
                assert_eq!(args.send_addr, DEFAULT_BRIDGE_ADDRESS);
                assert_eq!(args.avax_addr.as_deref(), Some("X-avax1"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_nft_hash_uses_short_h() {
        let cli = Cli::parse_from(["slp-wallet", "nft-create-group", "-n", "a", "-i", "0", "-h", "ab"]);
        match cli.command {
            Command::NftCreateGroup(args) => assert_eq!(args.hash.as_deref(), Some("ab")),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
