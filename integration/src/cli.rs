//! Definition of the CLI arguments for integration tests

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_ARTIFACTS_PATH, DEFAULT_DEVNET_HOSTPORT, DEFAULT_DEVNET_PKEY};

/// CLI tool for running integration tests against a running devnet node.
///
/// Each test deploys the contracts it exercises from the compiled artifacts.
#[derive(Parser)]
pub(crate) struct Cli {
    /// Run only the test with this name, all tests if unset
    #[arg(short, long)]
    pub(crate) test: Option<String>,

    /// Path to the Hardhat artifacts directory
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_PATH)]
    pub(crate) artifacts_path: PathBuf,

    /// Devnet private key, defaults to the first default devnet account
    #[arg(short, long, env = "PKEY", default_value = DEFAULT_DEVNET_PKEY)]
    pub(crate) priv_key: String,

    /// Devnet RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_DEVNET_HOSTPORT)]
    pub(crate) rpc_url: String,
}
