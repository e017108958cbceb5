//! Structured configuration for the deploy scripts
//!
//! Every value has a default matching the values the contracts were first
//! deployed with, and may be overridden from a JSON file and then from the
//! command line.

use std::{fs, path::Path};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_ACCEPTED_TOKEN, DEFAULT_FEE_BASIS_POINTS, DEFAULT_MARKET_CONTRACT,
        DEFAULT_NFT_CONTRACT, DEFAULT_ROYALTY_CAP_BASIS_POINTS, DEFAULT_ROYALTY_MANAGER_CONTRACT,
        DEFAULT_TOKEN_CONTRACT, MAX_BASIS_POINTS,
    },
    errors::ScriptError,
    plan::DeploymentMode,
};

/// A percentage expressed in basis points, where 10000 is 100%
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "i64", into = "u16")]
pub struct BasisPoints(u16);

impl BasisPoints {
    /// Construct a value, rejecting anything outside `0..=10000`
    pub fn new(value: i64) -> Result<Self, ScriptError> {
        if !(0..=MAX_BASIS_POINTS as i64).contains(&value) {
            return Err(ScriptError::Validation(format!(
                "basis points must be between 0 and {}, got {}",
                MAX_BASIS_POINTS, value
            )));
        }

        Ok(Self(value as u16))
    }

    /// The raw value
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for BasisPoints {
    type Error = ScriptError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BasisPoints> for u16 {
    fn from(bps: BasisPoints) -> Self {
        bps.0
    }
}

/// Configuration of every deployment the scripts know about
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DeployConfig {
    /// The fungible token deployment
    pub token: TokenConfig,
    /// The NFT collection deployments
    pub nft: NftConfig,
    /// The marketplace deployment
    pub market: MarketConfig,
}

impl DeployConfig {
    /// Read a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ScriptError::Validation(format!("could not read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::Validation(format!("{}: {}", path.display(), e)))
    }

    /// Read a configuration from a JSON file if one is given, else use the defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ScriptError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ScriptError> {
        self.token.validate()?;
        self.nft.validate()?;
        self.market.validate()
    }
}

/// Configuration of the fungible token deployment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TokenConfig {
    /// The token contract artifact name
    pub contract: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            contract: DEFAULT_TOKEN_CONTRACT.to_string(),
        }
    }
}

impl TokenConfig {
    /// Validate the token configuration
    pub fn validate(&self) -> Result<(), ScriptError> {
        non_empty("token contract", &self.contract)
    }
}

/// A single NFT collection to deploy
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NftCollection {
    /// The collection name
    pub name: String,
    /// The collection symbol
    pub symbol: String,
}

impl NftCollection {
    /// Construct a collection
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// Configuration of the NFT collection deployments
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct NftConfig {
    /// The NFT contract artifact name
    pub contract: String,
    /// The collections to deploy, one contract instance each
    pub collections: Vec<NftCollection>,
    /// The metadata base URI, appended to the constructor arguments when set
    #[serde(rename = "metadataBaseURI")]
    pub metadata_base_uri: Option<String>,
}

impl Default for NftConfig {
    fn default() -> Self {
        Self {
            contract: DEFAULT_NFT_CONTRACT.to_string(),
            collections: vec![
                NftCollection::new("Axe1", "AXE1"),
                NftCollection::new("Axe2", "AXE2"),
            ],
            metadata_base_uri: None,
        }
    }
}

impl NftConfig {
    /// Validate the NFT configuration
    pub fn validate(&self) -> Result<(), ScriptError> {
        non_empty("nft contract", &self.contract)?;
        if self.collections.is_empty() {
            return Err(ScriptError::Validation(
                "at least one nft collection is required".to_string(),
            ));
        }

        for collection in &self.collections {
            non_empty("nft collection name", &collection.name)?;
            non_empty("nft collection symbol", &collection.symbol)?;
        }

        if let Some(uri) = &self.metadata_base_uri {
            non_empty("metadata base URI", uri)?;
        }

        Ok(())
    }
}

/// Configuration of the marketplace deployment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MarketConfig {
    /// The marketplace contract artifact name
    pub market_contract: String,
    /// The royalty manager contract artifact name
    pub royalty_manager_contract: String,
    /// The ERC-20 token accepted as payment
    pub accepted_token_address: Address,
    /// The recipient of platform fees, defaults to the first signer
    pub fee_recipient: Option<Address>,
    /// The platform fee
    pub fee_basis_points: BasisPoints,
    /// An already deployed royalty manager; when unset, one is deployed first
    pub royalty_manager_address: Option<Address>,
    /// The maximum royalty
    pub royalty_cap_basis_points: BasisPoints,
    /// How the marketplace contract is deployed
    pub deployment_mode: DeploymentMode,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            market_contract: DEFAULT_MARKET_CONTRACT.to_string(),
            royalty_manager_contract: DEFAULT_ROYALTY_MANAGER_CONTRACT.to_string(),
            accepted_token_address: DEFAULT_ACCEPTED_TOKEN,
            fee_recipient: None,
            fee_basis_points: BasisPoints(DEFAULT_FEE_BASIS_POINTS),
            royalty_manager_address: None,
            royalty_cap_basis_points: BasisPoints(DEFAULT_ROYALTY_CAP_BASIS_POINTS),
            deployment_mode: DeploymentMode::ProxyUups,
        }
    }
}

impl MarketConfig {
    /// Validate the marketplace configuration
    pub fn validate(&self) -> Result<(), ScriptError> {
        non_empty("market contract", &self.market_contract)?;
        non_empty("royalty manager contract", &self.royalty_manager_contract)?;
        if self.accepted_token_address == Address::ZERO {
            return Err(ScriptError::Validation(
                "accepted token address must not be the zero address".to_string(),
            ));
        }

        Ok(())
    }
}

/// Reject empty strings for the named field
fn non_empty(field: &str, value: &str) -> Result<(), ScriptError> {
    if value.trim().is_empty() {
        return Err(ScriptError::Validation(format!("{} must not be empty", field)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    /// A placeholder fee recipient
    const TEST_FEE_RECIPIENT: Address = address!("00000000000000000000000000000000000000fe");

    #[test]
    fn test_basis_points_range() {
        assert_eq!(BasisPoints::new(0).unwrap().get(), 0);
        assert_eq!(BasisPoints::new(10_000).unwrap().get(), 10_000);
        assert!(matches!(
            BasisPoints::new(10_001),
            Err(ScriptError::Validation(_))
        ));
        assert!(matches!(BasisPoints::new(-1), Err(ScriptError::Validation(_))));
    }

    #[test]
    fn test_defaults_match_first_deployment() {
        let config = DeployConfig::default();
        assert_eq!(config.token.contract, "NRGY");
        assert_eq!(config.nft.collections.len(), 2);
        assert_eq!(config.market.fee_basis_points.get(), 2000);
        assert_eq!(config.market.royalty_cap_basis_points.get(), 10_000);
        assert_eq!(config.market.deployment_mode, DeploymentMode::ProxyUups);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{
            "market": {
                "acceptedTokenAddress": "0x00000000000000000000000000000000000000aa",
                "feeRecipient": "0x00000000000000000000000000000000000000fe",
                "feeBasisPoints": 100,
                "deploymentMode": "direct"
            },
            "nft": { "metadataBaseURI": "ipfs://axe/" }
        }"#;
        let config: DeployConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.market.fee_basis_points.get(), 100);
        assert_eq!(config.market.fee_recipient, Some(TEST_FEE_RECIPIENT));
        assert_eq!(config.market.deployment_mode, DeploymentMode::Direct);
        assert_eq!(config.market.royalty_cap_basis_points.get(), 10_000);
        assert_eq!(config.nft.metadata_base_uri.as_deref(), Some("ipfs://axe/"));
        assert_eq!(config.token, TokenConfig::default());
    }

    #[test]
    fn test_out_of_range_fee_in_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "market": { "feeBasisPoints": 20000 } }"#).unwrap();

        let err = DeployConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ScriptError::Validation(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let res = serde_json::from_str::<DeployConfig>(r#"{ "market": { "feeBps": 1 } }"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_empty_collections_rejected() {
        let nft = NftConfig {
            collections: vec![],
            ..Default::default()
        };
        assert!(matches!(nft.validate(), Err(ScriptError::Validation(_))));
    }

    #[test]
    fn test_default_accepted_token() {
        assert_eq!(
            MarketConfig::default().accepted_token_address,
            address!("12381D72b130376a00C73658755ea621071787D6")
        );
    }
}
