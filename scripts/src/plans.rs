//! Builders for the deployment plans the scripts execute

use alloy_primitives::U256;

use crate::{
    config::{DeployConfig, MarketConfig, NftConfig, TokenConfig},
    constants::{
        MARKET_CONTRACT_KEY, MARKET_LABEL, NFT_CONTRACT_KEY_PREFIX, NFT_LABEL,
        ROYALTY_MANAGER_CONTRACT_KEY, ROYALTY_MANAGER_LABEL, TOKEN_CONTRACT_KEY,
    },
    errors::ScriptError,
    plan::{ConstructorArg, DeploymentPlan, DeploymentStep, StepRef},
};

/// The plan deploying the fungible token
pub fn token_plan(config: &TokenConfig) -> Result<DeploymentPlan, ScriptError> {
    config.validate()?;

    let mut plan = DeploymentPlan::new();
    push_token(&mut plan, config);
    Ok(plan)
}

/// The plan deploying one NFT contract per configured collection
pub fn nft_plan(config: &NftConfig) -> Result<DeploymentPlan, ScriptError> {
    config.validate()?;

    let mut plan = DeploymentPlan::new();
    push_nfts(&mut plan, config);
    Ok(plan)
}

/// The plan deploying the marketplace, preceded by a royalty manager unless
/// an existing one is configured
pub fn market_plan(config: &MarketConfig) -> Result<DeploymentPlan, ScriptError> {
    config.validate()?;

    let mut plan = DeploymentPlan::new();
    push_market(
        &mut plan,
        config,
        ConstructorArg::Address(config.accepted_token_address),
    );
    Ok(plan)
}

/// The plan deploying everything: the token, then a marketplace accepting
/// that token, then the NFT collections
pub fn full_plan(config: &DeployConfig) -> Result<DeploymentPlan, ScriptError> {
    config.validate()?;

    let mut plan = DeploymentPlan::new();
    let token = push_token(&mut plan, &config.token);
    push_market(&mut plan, &config.market, ConstructorArg::Step(token));
    push_nfts(&mut plan, &config.nft);
    Ok(plan)
}

/// Append the token deployment
fn push_token(plan: &mut DeploymentPlan, config: &TokenConfig) -> StepRef {
    plan.push(DeploymentStep::direct(
        TOKEN_CONTRACT_KEY,
        &config.contract,
        &config.contract,
    ))
}

/// Append the NFT deployments
fn push_nfts(plan: &mut DeploymentPlan, config: &NftConfig) {
    for collection in &config.collections {
        let key = format!(
            "{}_{}",
            NFT_CONTRACT_KEY_PREFIX,
            collection.symbol.to_lowercase()
        );

        let mut step = DeploymentStep::direct(&key, NFT_LABEL, &config.contract)
            .arg(ConstructorArg::Str(collection.name.clone()))
            .arg(ConstructorArg::Str(collection.symbol.clone()));
        if let Some(uri) = &config.metadata_base_uri {
            step = step.arg(ConstructorArg::Str(uri.clone()));
        }

        plan.push(step);
    }
}

/// Append the royalty manager, if needed, and the marketplace
fn push_market(plan: &mut DeploymentPlan, config: &MarketConfig, accepted_token: ConstructorArg) {
    let royalty_manager = match config.royalty_manager_address {
        Some(address) => ConstructorArg::Address(address),
        None => ConstructorArg::Step(plan.push(DeploymentStep::direct(
            ROYALTY_MANAGER_CONTRACT_KEY,
            ROYALTY_MANAGER_LABEL,
            &config.royalty_manager_contract,
        ))),
    };

    let fee_recipient = config
        .fee_recipient
        .map(ConstructorArg::Address)
        .unwrap_or(ConstructorArg::Signer(0));

    plan.push(
        DeploymentStep::new(
            MARKET_CONTRACT_KEY,
            MARKET_LABEL,
            &config.market_contract,
            config.deployment_mode,
        )
        .arg(accepted_token)
        .arg(fee_recipient)
        .arg(ConstructorArg::Uint(U256::from(config.fee_basis_points.get())))
        .arg(royalty_manager)
        .arg(ConstructorArg::Uint(U256::from(
            config.royalty_cap_basis_points.get(),
        ))),
    );
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;
    use crate::{
        config::{BasisPoints, NftCollection},
        plan::DeploymentMode,
    };

    #[test]
    fn test_token_plan() {
        let plan = token_plan(&TokenConfig::default()).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps()[0].contract, "NRGY");
        assert_eq!(plan.steps()[0].key, TOKEN_CONTRACT_KEY);
        assert!(plan.steps()[0].args.is_empty());
    }

    #[test]
    fn test_nft_plan_keys_and_metadata() {
        let config = NftConfig {
            collections: vec![NftCollection::new("Axe1", "AXE1")],
            metadata_base_uri: Some("ipfs://axe/".to_string()),
            ..Default::default()
        };
        let plan = nft_plan(&config).unwrap();

        let step = &plan.steps()[0];
        assert_eq!(step.key, "nft_contract_axe1");
        assert_eq!(
            step.args,
            vec![
                ConstructorArg::Str("Axe1".to_string()),
                ConstructorArg::Str("AXE1".to_string()),
                ConstructorArg::Str("ipfs://axe/".to_string()),
            ]
        );
    }

    #[test]
    fn test_market_plan_with_existing_royalty_manager() {
        let royalty_manager = Address::repeat_byte(0x42);
        let fee_recipient = Address::repeat_byte(0xfe);
        let config = MarketConfig {
            royalty_manager_address: Some(royalty_manager),
            fee_recipient: Some(fee_recipient),
            fee_basis_points: BasisPoints::new(100).unwrap(),
            deployment_mode: DeploymentMode::Direct,
            ..Default::default()
        };
        let plan = market_plan(&config).unwrap();

        assert_eq!(plan.len(), 1);
        let market = &plan.steps()[0];
        assert_eq!(market.mode, DeploymentMode::Direct);
        assert_eq!(market.args[1], ConstructorArg::Address(fee_recipient));
        assert_eq!(market.args[2], ConstructorArg::Uint(U256::from(100)));
        assert_eq!(market.args[3], ConstructorArg::Address(royalty_manager));
    }

    #[test]
    fn test_full_plan_order() {
        let plan = full_plan(&DeployConfig::default()).unwrap();
        let contracts: Vec<_> = plan.steps().iter().map(|s| s.contract.as_str()).collect();
        assert_eq!(
            contracts,
            vec!["NRGY", "RoyaltiesManager", "MarketPlace", "Axe", "Axe"]
        );

        // The marketplace accepts the freshly deployed token
        let market = &plan.steps()[2];
        assert_eq!(market.args[0], ConstructorArg::Step(StepRef(0)));
        assert_eq!(market.args[3], ConstructorArg::Step(StepRef(1)));
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MarketConfig {
            accepted_token_address: Address::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            market_plan(&config),
            Err(ScriptError::Validation(_))
        ));

        let config = NftConfig {
            collections: vec![NftCollection::new("Axe1", "")],
            ..Default::default()
        };
        assert!(matches!(nft_plan(&config), Err(ScriptError::Validation(_))));
    }
}
