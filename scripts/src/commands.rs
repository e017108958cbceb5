//! Implementations of the various deploy scripts

use tracing::info;

use crate::{
    config::{DeployConfig, MarketConfig, NftConfig, TokenConfig},
    errors::ScriptError,
    plan::DeploymentPlan,
    plans::{full_plan, market_plan, nft_plan, token_plan},
    provider::ChainProvider,
    reporter::Reporter,
    sequencer::{RunRecord, Sequencer},
};

/// Deploy the fungible token
pub async fn deploy_token(
    config: TokenConfig,
    provider: &impl ChainProvider,
    reporter: &mut impl Reporter,
) -> Result<(), ScriptError> {
    execute(&token_plan(&config)?, provider, reporter).await?;
    Ok(())
}

/// Deploy one NFT contract per configured collection
pub async fn deploy_nft(
    config: NftConfig,
    provider: &impl ChainProvider,
    reporter: &mut impl Reporter,
) -> Result<(), ScriptError> {
    execute(&nft_plan(&config)?, provider, reporter).await?;
    Ok(())
}

/// Deploy the marketplace, and its royalty manager unless one is configured
pub async fn deploy_market(
    config: MarketConfig,
    provider: &impl ChainProvider,
    reporter: &mut impl Reporter,
) -> Result<(), ScriptError> {
    execute(&market_plan(&config)?, provider, reporter).await?;
    Ok(())
}

/// Deploy the token, royalty manager, marketplace, and NFT collections
pub async fn deploy_all(
    config: DeployConfig,
    provider: &impl ChainProvider,
    reporter: &mut impl Reporter,
) -> Result<(), ScriptError> {
    execute(&full_plan(&config)?, provider, reporter).await?;
    Ok(())
}

/// Run a plan to completion, returning its record
async fn execute(
    plan: &DeploymentPlan,
    provider: &impl ChainProvider,
    reporter: &mut impl Reporter,
) -> Result<RunRecord, ScriptError> {
    let mut sequencer = Sequencer::new(provider, reporter);
    let res = sequencer.run(plan).await;

    let record = sequencer.into_record();
    if res.is_err() {
        info!(
            "{} of {} deployments confirmed before the failure",
            record.len(),
            plan.len()
        );
    }

    res.map(|_| record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reporter::tests::RecordingReporter, sequencer::tests::MockProvider};

    #[tokio::test]
    async fn test_deploy_all() {
        let provider = MockProvider::new();
        let mut reporter = RecordingReporter::default();

        deploy_all(DeployConfig::default(), &provider, &mut reporter)
            .await
            .unwrap();

        let labels: Vec<_> = reporter.deployed.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(
            labels,
            vec!["NRGY", "RoyaltyManager", "Market", "Axe NFT", "Axe NFT"]
        );
    }

    #[tokio::test]
    async fn test_deploy_market_failure_reported() {
        let provider = MockProvider::failing_at(0);
        let mut reporter = RecordingReporter::default();

        let err = deploy_market(MarketConfig::default(), &provider, &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, ScriptError::StepFailed { index: 0, .. }));
        assert!(reporter.deployed.is_empty());
        assert_eq!(reporter.failed, vec![(0, "RoyaltiesManager".to_string())]);
    }
}
