//! Utilities for the deploy scripts.

use std::{fs, path::Path, str::FromStr};

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use serde_json::{Map, Value};
use tracing::info;

use crate::{constants::DEPLOYMENTS_KEY, errors::ScriptError};

/// Sets up the RPC client with which to deploy contracts, signing with the
/// given private key. Returns the client and the deployer's address.
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<(DynProvider, Address), ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let deployer = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    info!("connected to chain {} at {} as {}", chain_id, rpc_url, deployer);

    Ok((DynProvider::new(provider), deployer))
}

/// Read the `deployments.json` file, or an empty manifest if it does not exist
fn read_deployments(file_path: &Path) -> Result<Value, ScriptError> {
    if !file_path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(file_path)
        .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Read the address recorded under `contract_key` in the deployments file
pub fn parse_addr_from_deployments_file(
    file_path: &Path,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let parsed_json = read_deployments(file_path)?;

    let addr_str = parsed_json
        .get(DEPLOYMENTS_KEY)
        .and_then(|deployments| deployments.get(contract_key))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ScriptError::ReadDeployments(format!(
                "no address for `{}` in {}",
                contract_key,
                file_path.display()
            ))
        })?;

    Address::from_str(addr_str).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Record `address` under `contract_key` in the deployments file, creating
/// the file if needed and preserving every other entry
pub fn write_deployed_address(
    file_path: &Path,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut parsed_json = read_deployments(file_path)?;

    let root = parsed_json.as_object_mut().ok_or_else(|| {
        ScriptError::WriteDeployments(format!("{} is not a JSON object", file_path.display()))
    })?;
    let deployments = root
        .entry(DEPLOYMENTS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            ScriptError::WriteDeployments(format!(
                "`{}` in {} is not a JSON object",
                DEPLOYMENTS_KEY,
                file_path.display()
            ))
        })?;
    deployments.insert(
        contract_key.to_string(),
        Value::String(format!("{address:#x}")),
    );

    let contents = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_deployments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let token = Address::repeat_byte(0x11);
        let market = Address::repeat_byte(0x22);

        write_deployed_address(&path, "token_contract", token).unwrap();
        write_deployed_address(&path, "market_contract", market).unwrap();

        assert_eq!(
            parse_addr_from_deployments_file(&path, "token_contract").unwrap(),
            token
        );
        assert_eq!(
            parse_addr_from_deployments_file(&path, "market_contract").unwrap(),
            market
        );
    }

    #[test]
    fn test_overwrite_preserves_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(
            &path,
            r#"{ "network": "devnet", "deployments": { "token_contract": "0x1111111111111111111111111111111111111111" } }"#,
        )
        .unwrap();

        let redeployed = Address::repeat_byte(0x33);
        write_deployed_address(&path, "token_contract", redeployed).unwrap();

        let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["network"], "devnet");
        assert_eq!(
            parse_addr_from_deployments_file(&path, "token_contract").unwrap(),
            redeployed
        );
    }

    #[test]
    fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");

        let err = parse_addr_from_deployments_file(&path, "token_contract").unwrap_err();
        assert!(matches!(err, ScriptError::ReadDeployments(_)));
    }
}
