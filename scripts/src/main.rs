use std::time::Duration;

use clap::Parser;
use scripts::{
    artifacts::ArtifactStore, cli::Cli, config::DeployConfig, errors::ScriptError,
    provider::RpcChainProvider, reporter::StdoutReporter, utils::setup_client,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        rpc_url,
        deployments_path,
        artifacts_path,
        config,
        confirmation_timeout_secs,
        command,
    } = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DeployConfig::load(config.as_deref())?;

    let (client, deployer) = setup_client(&priv_key, &rpc_url).await?;
    let provider = RpcChainProvider::new(client, vec![deployer], ArtifactStore::new(artifacts_path))
        .with_timeout(confirmation_timeout_secs.map(Duration::from_secs));
    let mut reporter = StdoutReporter::new(deployments_path);

    command.run(&provider, config, &mut reporter).await
}
