//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy_all, deploy_market, deploy_nft, deploy_token},
    config::{BasisPoints, DeployConfig, MarketConfig, NftCollection, NftConfig, TokenConfig},
    constants::{DEFAULT_ARTIFACTS_PATH, DEFAULT_RPC_URL},
    errors::ScriptError,
    plan::DeploymentMode,
    provider::ChainProvider,
    reporter::Reporter,
};

/// The command line interface of the deploy scripts
#[derive(Parser)]
#[command(name = "nrgy-scripts", about = "Deploy the NRGY token, Axe NFTs, and marketplace")]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY", hide_env_values = true)]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Path to a `deployments.json` file in which to record deployed addresses
    #[arg(short, long)]
    pub deployments_path: Option<PathBuf>,

    /// Path to the Hardhat artifacts directory
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_PATH)]
    pub artifacts_path: PathBuf,

    /// Path to a JSON deployment configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How long to wait for each deployment to confirm, unbounded if unset
    #[arg(long)]
    pub confirmation_timeout_secs: Option<u64>,

    /// The deployment to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deployments the scripts can run
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the NRGY token
    DeployToken(TokenArgs),
    /// Deploy the Axe NFT collections
    DeployNft(NftArgs),
    /// Deploy the marketplace behind a UUPS proxy, with its royalty manager
    DeployMarket(MarketArgs),
    /// Deploy the token, royalty manager, marketplace, and NFT collections
    DeployAll(DeployAllArgs),
}

impl Command {
    /// Merge the command's overrides into `config` and run the deployment
    pub async fn run(
        self,
        provider: &impl ChainProvider,
        config: DeployConfig,
        reporter: &mut impl Reporter,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployToken(args) => {
                deploy_token(args.apply_to(config.token), provider, reporter).await
            }
            Command::DeployNft(args) => {
                deploy_nft(args.apply_to(config.nft)?, provider, reporter).await
            }
            Command::DeployMarket(args) => {
                deploy_market(args.apply_to(config.market)?, provider, reporter).await
            }
            Command::DeployAll(args) => {
                let config = DeployConfig {
                    token: args.token.apply_to(config.token),
                    nft: args.nft.apply_to(config.nft)?,
                    market: args.market.apply_to(config.market)?,
                };
                deploy_all(config, provider, reporter).await
            }
        }
    }
}

/// Deploy the fungible token
#[derive(Args, Default)]
pub struct TokenArgs {
    /// The token contract artifact name
    #[arg(long)]
    pub token_contract: Option<String>,
}

impl TokenArgs {
    /// Override the configured values with any given on the command line
    pub fn apply_to(self, mut config: TokenConfig) -> TokenConfig {
        if let Some(contract) = self.token_contract {
            config.contract = contract;
        }

        config
    }
}

/// Deploy the NFT collections, one contract per collection
#[derive(Args, Default)]
pub struct NftArgs {
    /// The NFT contract artifact name
    #[arg(long)]
    pub nft_contract: Option<String>,

    /// A collection to deploy, as `NAME:SYMBOL`; replaces the configured
    /// collections, may be repeated
    #[arg(long = "collection", value_parser = parse_collection)]
    pub collections: Vec<NftCollection>,

    /// The metadata base URI passed to each collection
    #[arg(long)]
    pub metadata_base_uri: Option<String>,
}

impl NftArgs {
    /// Override the configured values with any given on the command line
    pub fn apply_to(self, mut config: NftConfig) -> Result<NftConfig, ScriptError> {
        if let Some(contract) = self.nft_contract {
            config.contract = contract;
        }
        if !self.collections.is_empty() {
            config.collections = self.collections;
        }
        if self.metadata_base_uri.is_some() {
            config.metadata_base_uri = self.metadata_base_uri;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Deploy the marketplace, and a royalty manager for it unless one is given
#[derive(Args, Default)]
pub struct MarketArgs {
    /// The marketplace contract artifact name
    #[arg(long)]
    pub market_contract: Option<String>,

    /// The royalty manager contract artifact name
    #[arg(long)]
    pub royalty_manager_contract: Option<String>,

    /// Address of the ERC-20 token accepted as payment
    #[arg(long)]
    pub accepted_token: Option<Address>,

    /// Address receiving platform fees, the deployer if unset
    #[arg(long)]
    pub fee_recipient: Option<Address>,

    /// The platform fee, in basis points
    #[arg(long, allow_negative_numbers = true)]
    pub fee_basis_points: Option<i64>,

    /// Address of an existing royalty manager, skipping its deployment
    #[arg(long)]
    pub royalty_manager: Option<Address>,

    /// The royalty cap, in basis points
    #[arg(long, allow_negative_numbers = true)]
    pub royalty_cap_basis_points: Option<i64>,

    /// How to deploy the marketplace contract
    #[arg(long, value_enum)]
    pub deployment_mode: Option<DeploymentMode>,
}

impl MarketArgs {
    /// Override the configured values with any given on the command line
    pub fn apply_to(self, mut config: MarketConfig) -> Result<MarketConfig, ScriptError> {
        if let Some(contract) = self.market_contract {
            config.market_contract = contract;
        }
        if let Some(contract) = self.royalty_manager_contract {
            config.royalty_manager_contract = contract;
        }
        if let Some(token) = self.accepted_token {
            config.accepted_token_address = token;
        }
        if self.fee_recipient.is_some() {
            config.fee_recipient = self.fee_recipient;
        }
        if let Some(bps) = self.fee_basis_points {
            config.fee_basis_points = BasisPoints::new(bps)?;
        }
        if self.royalty_manager.is_some() {
            config.royalty_manager_address = self.royalty_manager;
        }
        if let Some(bps) = self.royalty_cap_basis_points {
            config.royalty_cap_basis_points = BasisPoints::new(bps)?;
        }
        if let Some(mode) = self.deployment_mode {
            config.deployment_mode = mode;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Deploy the token, a royalty manager, a marketplace accepting the token,
/// and the NFT collections, in that order
#[derive(Args, Default)]
pub struct DeployAllArgs {
    /// Overrides of the token configuration
    #[command(flatten)]
    pub token: TokenArgs,

    /// Overrides of the NFT configuration
    #[command(flatten)]
    pub nft: NftArgs,

    /// Overrides of the marketplace configuration; the accepted token is
    /// always the freshly deployed one
    #[command(flatten)]
    pub market: MarketArgs,
}

/// Parse a `NAME:SYMBOL` collection
fn parse_collection(s: &str) -> Result<NftCollection, String> {
    match s.split_once(':') {
        Some((name, symbol)) if !name.is_empty() && !symbol.is_empty() => {
            Ok(NftCollection::new(name, symbol))
        }
        _ => Err(format!("expected NAME:SYMBOL, got `{}`", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reporter::tests::RecordingReporter, sequencer::tests::MockProvider};

    #[test]
    fn test_parse_deploy_market() {
        let cli = Cli::try_parse_from([
            "nrgy-scripts",
            "--priv-key",
            "0x01",
            "deploy-market",
            "--fee-basis-points",
            "100",
            "--deployment-mode",
            "direct",
        ])
        .unwrap();

        assert_eq!(cli.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(cli.artifacts_path, PathBuf::from(DEFAULT_ARTIFACTS_PATH));
        let Command::DeployMarket(args) = cli.command else {
            panic!("expected deploy-market");
        };

        let config = args.apply_to(MarketConfig::default()).unwrap();
        assert_eq!(config.fee_basis_points.get(), 100);
        assert_eq!(config.deployment_mode, DeploymentMode::Direct);
        assert_eq!(config.royalty_cap_basis_points.get(), 10_000);
    }

    #[test]
    fn test_out_of_range_override_rejected() {
        let args = MarketArgs {
            fee_basis_points: Some(-5),
            ..Default::default()
        };
        assert!(matches!(
            args.apply_to(MarketConfig::default()),
            Err(ScriptError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_fee_makes_no_provider_calls() {
        let provider = MockProvider::new();
        let mut reporter = RecordingReporter::default();
        let command = Command::DeployMarket(MarketArgs {
            fee_basis_points: Some(20_000),
            ..Default::default()
        });

        let err = command
            .run(&provider, DeployConfig::default(), &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::Validation(_)));
        assert!(provider.calls.borrow().is_empty());
        assert!(reporter.deployed.is_empty());
        assert!(reporter.failed.is_empty());
    }

    #[tokio::test]
    async fn test_deploy_all_out_of_range_cap_makes_no_provider_calls() {
        let cli = Cli::try_parse_from([
            "nrgy-scripts",
            "--priv-key",
            "0x01",
            "deploy-all",
            "--royalty-cap-basis-points",
            "10001",
        ])
        .unwrap();

        let provider = MockProvider::new();
        let mut reporter = RecordingReporter::default();
        let err = cli
            .command
            .run(&provider, DeployConfig::default(), &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::Validation(_)));
        assert!(provider.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_market_command() {
        let provider = MockProvider::new();
        let mut reporter = RecordingReporter::default();

        Command::DeployMarket(MarketArgs::default())
            .run(&provider, DeployConfig::default(), &mut reporter)
            .await
            .unwrap();

        let labels: Vec<_> = reporter.deployed.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["RoyaltyManager", "Market"]);
    }

    #[test]
    fn test_collection_overrides() {
        let cli = Cli::try_parse_from([
            "nrgy-scripts",
            "--priv-key",
            "0x01",
            "deploy-nft",
            "--collection",
            "Axe3:AXE3",
        ])
        .unwrap();
        let Command::DeployNft(args) = cli.command else {
            panic!("expected deploy-nft");
        };

        let config = args.apply_to(NftConfig::default()).unwrap();
        assert_eq!(config.collections, vec![NftCollection::new("Axe3", "AXE3")]);
        assert!(parse_collection("AXE3").is_err());
    }
}
