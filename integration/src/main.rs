//! Integration tests for the deploy scripts. These assume that a devnet is
//! already running locally and that the contracts have been compiled.

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use eyre::{eyre, Result};
use scripts::{artifacts::ArtifactStore, provider::RpcChainProvider, utils::setup_client};
use test_inventory::{IntegrationTest, TestArgs};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod abis;
mod cli;
mod constants;
mod test_inventory;
mod tests;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Cli {
        test,
        artifacts_path,
        priv_key,
        rpc_url,
    } = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let (client, deployer) = setup_client(&priv_key, &rpc_url).await?;
    let args = TestArgs {
        provider: RpcChainProvider::new(client, vec![deployer], ArtifactStore::new(artifacts_path)),
        deployer,
    };

    let mut passed = 0;
    let mut failed = Vec::new();
    for integration_test in inventory::iter::<IntegrationTest> {
        if test.as_deref().is_some_and(|name| name != integration_test.name) {
            continue;
        }

        match (integration_test.test_fn)(args.clone()).await {
            Ok(()) => {
                println!("{} {}", integration_test.name, "PASSED".green());
                passed += 1;
            }
            Err(e) => {
                println!("{} {}: {}", integration_test.name, "FAILED".bright_red(), e);
                failed.push(integration_test.name);
            }
        }
    }

    if passed == 0 && failed.is_empty() {
        return Err(eyre!("no test named {}", test.unwrap_or_default()));
    }

    println!(
        "{} passed, {} failed",
        passed.to_string().green(),
        failed.len().to_string().bright_red()
    );
    if !failed.is_empty() {
        return Err(eyre!("failed tests: {}", failed.join(", ")));
    }

    Ok(())
}
