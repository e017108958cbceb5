//! Constants used in the deploy scripts

use alloy_primitives::{address, b256, Address, B256};

/// The number of confirmations to wait for a deployment transaction
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The default RPC URL, a local Hardhat or Anvil node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default directory containing the Hardhat compilation artifacts
pub const DEFAULT_ARTIFACTS_PATH: &str = "artifacts";

/// The extension of a compilation artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The directory in which Hardhat stores full compiler inputs and outputs,
/// which never contains contract artifacts
pub const BUILD_INFO_DIR: &str = "build-info";

/// The marker solc leaves in bytecode with unlinked library references
pub const UNLINKED_LIBRARY_MARKER: &str = "__$";

/// The name of the proxy contract artifact used for UUPS deployments. When
/// the artifacts have no such contract, the bundled proxy is deployed instead
pub const ERC1967_PROXY_CONTRACT: &str = "ERC1967Proxy";

/// The name of the initializer called through a UUPS proxy
pub const INITIALIZER_NAME: &str = "initialize";

/// The storage slot containing the implementation address of an ERC1967 proxy,
/// which is also the value a UUPS implementation returns from `proxiableUUID`.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const IMPLEMENTATION_STORAGE_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// The event an ERC1967 proxy emits when its implementation changes
pub const UPGRADED_EVENT_SIGNATURE: &str = "Upgraded(address)";

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The largest valid basis points value, i.e. 100%
pub const MAX_BASIS_POINTS: u16 = 10_000;

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

// ---------------------
// | Default Contracts |
// ---------------------

/// The fungible token contract
pub const DEFAULT_TOKEN_CONTRACT: &str = "NRGY";

/// The NFT collection contract
pub const DEFAULT_NFT_CONTRACT: &str = "Axe";

/// The royalty manager contract
pub const DEFAULT_ROYALTY_MANAGER_CONTRACT: &str = "RoyaltiesManager";

/// The marketplace contract
pub const DEFAULT_MARKET_CONTRACT: &str = "MarketPlace";

/// The token accepted as payment by the marketplace
pub const DEFAULT_ACCEPTED_TOKEN: Address = address!("12381D72b130376a00C73658755ea621071787D6");

/// The marketplace platform fee
pub const DEFAULT_FEE_BASIS_POINTS: u16 = 2000;

/// The marketplace royalty cap
pub const DEFAULT_ROYALTY_CAP_BASIS_POINTS: u16 = 10_000;

// -----------------
// | Manifest Keys |
// -----------------

/// The token contract key in the `deployments.json` file
pub const TOKEN_CONTRACT_KEY: &str = "token_contract";

/// The royalty manager contract key in the `deployments.json` file
pub const ROYALTY_MANAGER_CONTRACT_KEY: &str = "royalty_manager_contract";

/// The marketplace contract key in the `deployments.json` file
pub const MARKET_CONTRACT_KEY: &str = "market_contract";

/// The prefix of the NFT contract keys in the `deployments.json` file,
/// suffixed with the collection symbol
pub const NFT_CONTRACT_KEY_PREFIX: &str = "nft_contract";

// ----------
// | Labels |
// ----------

/// The label with which the royalty manager deployment is reported
pub const ROYALTY_MANAGER_LABEL: &str = "RoyaltyManager";

/// The label with which the marketplace deployment is reported
pub const MARKET_LABEL: &str = "Market";

/// The label with which NFT deployments are reported
pub const NFT_LABEL: &str = "Axe NFT";
