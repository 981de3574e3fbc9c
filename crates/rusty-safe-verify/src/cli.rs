use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rusty_safe_verify_core::OnchainHashVariant;

#[derive(Parser)]
#[command(name = "rusty-safe-verify")]
#[command(about = "Hash and verify off-chain Safe messages (EIP-1271)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the raw message hash and SafeMessage hash without any network access
    Hash(HashArgs),

    /// Check that a Safe has signed a message off-chain
    Verify(VerifyArgs),

    /// List chain names accepted by --chain
    Chains,
}

#[derive(Args, Clone)]
pub struct TargetArgs {
    /// Chain id or name (e.g. 1, sepolia)
    #[arg(long, env = "RUSTY_SAFE_CHAIN")]
    pub chain: String,

    /// Safe contract address
    #[arg(long, env = "SAFE_ADDRESS")]
    pub safe: String,

    #[command(flatten)]
    pub input: MessageInput,

    /// Text placed in the sample document selected with --example
    #[arg(long, default_value = "Hello, Safe!")]
    pub example_text: String,
}

#[derive(Args, Clone)]
#[group(required = true, multiple = false)]
pub struct MessageInput {
    /// Plain text message (EIP-191)
    #[arg(long)]
    pub message: Option<String>,

    /// Path to an EIP-712 typed-data JSON document
    #[arg(long, value_name = "FILE")]
    pub typed_data: Option<PathBuf>,

    /// Built-in sample typed-data document
    #[arg(long, value_enum)]
    pub example: Option<ExampleKind>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExampleKind {
    /// Mail between two Persons
    Mail,
    /// Every elementary type plus nested structs
    Nested,
}

#[derive(Args, Clone)]
pub struct HashArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Clone)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// JSON-RPC endpoint (overrides RUSTY_SAFE_RPC_URL_<chainId>)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Transaction service base URL, e.g. https://safe-transaction-sepolia.safe.global/api
    #[arg(long)]
    pub tx_service_url: Option<String>,

    /// On-chain hash entry point: legacy (getMessageHash) or for-safe (getMessageHashForSafe)
    #[arg(long)]
    pub variant: Option<OnchainHashVariant>,

    /// Skip comparing the local SafeMessage hash with the Safe's own computation
    #[arg(long)]
    pub no_cross_check: bool,

    /// Upper bound for each remote step, in milliseconds
    #[arg(long)]
    pub step_timeout_ms: Option<u64>,
}
