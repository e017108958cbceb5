//! Constants used in the integration tests

/// The default hostport that a local Hardhat or Anvil devnet node runs on
pub(crate) const DEFAULT_DEVNET_HOSTPORT: &str = "http://localhost:8545";

/// The default private key, the first default account in a Hardhat or Anvil node
pub(crate) const DEFAULT_DEVNET_PKEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The default directory containing the Hardhat compilation artifacts
pub(crate) const DEFAULT_ARTIFACTS_PATH: &str = "artifacts";
