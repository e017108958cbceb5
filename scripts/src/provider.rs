//! The chain provider: the boundary between the deployment sequencer and the chain
//!
//! [`RpcChainProvider`] publishes contracts through a JSON-RPC node. Tests
//! substitute an in-memory implementation of [`ChainProvider`].

use std::time::Duration;

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::Param,
    network::TransactionBuilder,
    primitives::{Address, U256},
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
    transports::TransportError,
};
use tracing::{debug, info};

use crate::{
    artifacts::{ArtifactStore, ContractFactory},
    constants::{
        ERC1967_PROXY_CONTRACT, IMPLEMENTATION_STORAGE_SLOT, INITIALIZER_NAME,
        NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT, NUM_DEPLOY_CONFIRMATIONS,
    },
    errors::ScriptError,
    plan::ResolvedArg,
    proxy,
    solidity::IERC1822Proxiable,
};

/// The addresses produced by a confirmed deployment
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// The address callers interact with; the proxy for proxied deployments
    pub address: Address,
    /// The logic contract behind the proxy, for proxied deployments
    pub implementation: Option<Address>,
}

impl Deployment {
    /// A deployment with no proxy in front of it
    pub fn direct(address: Address) -> Self {
        Self {
            address,
            implementation: None,
        }
    }
}

/// Supplies signer accounts and contract factories, and publishes contracts
///
/// Every deployment method resolves only once the deployment is confirmed
/// on-chain.
#[allow(async_fn_in_trait)]
pub trait ChainProvider {
    /// The accounts available to sign transactions, the deployer first
    async fn signers(&self) -> Result<Vec<Address>, ScriptError>;

    /// Resolve the named contract to a factory
    fn contract_factory(&self, name: &str) -> Result<ContractFactory, ScriptError>;

    /// Deploy a contract, passing `args` to its constructor
    async fn deploy(
        &self,
        factory: &ContractFactory,
        args: &[ResolvedArg],
    ) -> Result<Deployment, ScriptError>;

    /// Deploy a contract behind an ERC1967 proxy, passing `args` to its
    /// `initialize` method through the proxy
    async fn deploy_uups_proxy(
        &self,
        factory: &ContractFactory,
        args: &[ResolvedArg],
    ) -> Result<Deployment, ScriptError>;
}

/// A [`ChainProvider`] backed by a JSON-RPC node and a local wallet
#[derive(Clone)]
pub struct RpcChainProvider {
    /// The RPC client, with the deployer's wallet attached
    client: DynProvider,
    /// The addresses of the wallet's signers
    signers: Vec<Address>,
    /// The compilation artifacts
    artifacts: ArtifactStore,
    /// The number of confirmations to wait for each deployment
    confirmations: u64,
    /// How long to wait for each confirmation, if bounded
    timeout: Option<Duration>,
}

impl RpcChainProvider {
    /// Construct a provider from a client with a wallet attached
    pub fn new(client: DynProvider, signers: Vec<Address>, artifacts: ArtifactStore) -> Self {
        Self {
            client,
            signers,
            artifacts,
            confirmations: NUM_DEPLOY_CONFIRMATIONS,
            timeout: None,
        }
    }

    /// Bound the time spent waiting for each deployment to confirm
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying RPC client
    pub fn client(&self) -> &DynProvider {
        &self.client
    }

    /// Send a contract creation transaction and wait for it to confirm,
    /// returning the created contract's address
    async fn send_create(&self, name: &str, code: Vec<u8>) -> Result<Address, ScriptError> {
        let tx = TransactionRequest::default().with_deploy_code(code);
        let pending = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| map_send_error(name, e))?;

        let tx_hash = *pending.tx_hash();
        info!("{} deployment submitted in {:#x}", name, tx_hash);

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(self.timeout)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::Provider(format!("{} ({:#x}): {}", name, tx_hash, e)))?;

        if !receipt.status() {
            return Err(ScriptError::TransactionReverted(format!(
                "{} deployment {:#x}",
                name, tx_hash
            )));
        }

        receipt.contract_address.ok_or_else(|| {
            ScriptError::Provider(format!(
                "receipt for {} deployment {:#x} has no contract address",
                name, tx_hash
            ))
        })
    }

    /// Read the implementation address stored in an ERC1967 proxy.
    ///
    /// This is the recommended way to get the implementation address:
    /// https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/ERC1967/ERC1967Utils.sol#L51-L53
    async fn read_implementation(&self, proxy: Address) -> Result<Address, ScriptError> {
        let slot = U256::from_be_bytes(IMPLEMENTATION_STORAGE_SLOT.0);
        let word: [u8; NUM_BYTES_STORAGE_SLOT] = self
            .client
            .get_storage_at(proxy, slot)
            .await
            .map_err(|e| ScriptError::Provider(e.to_string()))?
            .to_be_bytes();

        Ok(Address::from_slice(
            &word[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..],
        ))
    }

    /// Check that the contract at `implementation` can be upgraded through a
    /// UUPS proxy, i.e. that it reports the ERC1967 implementation slot
    async fn assert_proxiable(
        &self,
        name: &str,
        implementation: Address,
    ) -> Result<(), ScriptError> {
        let expected = IMPLEMENTATION_STORAGE_SLOT;
        let uuid = IERC1822Proxiable::new(implementation, &self.client)
            .proxiableUUID()
            .call()
            .await
            .map_err(|e| {
                ScriptError::Validation(format!("{} is not UUPS upgradeable: {}", name, e))
            })?
            ._0;

        if uuid != expected {
            return Err(ScriptError::Validation(format!(
                "{} reports proxiable UUID {}, expected {}",
                name, uuid, expected
            )));
        }

        Ok(())
    }
}

impl ChainProvider for RpcChainProvider {
    async fn signers(&self) -> Result<Vec<Address>, ScriptError> {
        Ok(self.signers.clone())
    }

    fn contract_factory(&self, name: &str) -> Result<ContractFactory, ScriptError> {
        self.artifacts.factory(name)
    }

    async fn deploy(
        &self,
        factory: &ContractFactory,
        args: &[ResolvedArg],
    ) -> Result<Deployment, ScriptError> {
        let encoded_args = encode_constructor_args(factory, args)?;
        let code = [factory.bytecode.as_ref(), encoded_args.as_slice()].concat();

        let address = self.send_create(&factory.name, code).await?;
        Ok(Deployment::direct(address))
    }

    async fn deploy_uups_proxy(
        &self,
        factory: &ContractFactory,
        args: &[ResolvedArg],
    ) -> Result<Deployment, ScriptError> {
        // Encode everything up front so that malformed arguments
        // fail before any transaction is sent
        let implementation_args = encode_constructor_args(factory, &[])?;
        let init_data = encode_initializer_call(factory, args)?;
        let proxy_factory = proxy_factory(&self.artifacts)?;

        let implementation_code =
            [factory.bytecode.as_ref(), implementation_args.as_slice()].concat();
        let implementation = self.send_create(&factory.name, implementation_code).await?;
        info!("{} implementation deployed at {:#x}", factory.name, implementation);

        self.assert_proxiable(&factory.name, implementation).await?;

        let proxy_code = proxy_creation_code(proxy_factory.as_ref(), implementation, init_data)?;
        let proxy = self.send_create(ERC1967_PROXY_CONTRACT, proxy_code).await?;

        let stored_implementation = self.read_implementation(proxy).await?;
        if stored_implementation != implementation {
            return Err(ScriptError::Provider(format!(
                "proxy {:#x} points to {:#x}, expected {:#x}",
                proxy, stored_implementation, implementation
            )));
        }

        Ok(Deployment {
            address: proxy,
            implementation: Some(implementation),
        })
    }
}

/// The `ERC1967Proxy` artifact, if the artifacts include one. `None` selects
/// the bundled proxy
fn proxy_factory(artifacts: &ArtifactStore) -> Result<Option<ContractFactory>, ScriptError> {
    match artifacts.factory(ERC1967_PROXY_CONTRACT) {
        Ok(factory) => Ok(Some(factory)),
        Err(ScriptError::UnknownContract(_)) => {
            debug!(
                "no {} artifact under {}, using the bundled proxy",
                ERC1967_PROXY_CONTRACT,
                artifacts.root().display()
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// The creation code of a proxy in front of `implementation`, including its
/// constructor arguments
fn proxy_creation_code(
    proxy_factory: Option<&ContractFactory>,
    implementation: Address,
    init_data: Vec<u8>,
) -> Result<Vec<u8>, ScriptError> {
    match proxy_factory {
        Some(factory) => {
            let args = encode_proxy_constructor_args(factory, implementation, init_data)?;
            Ok([factory.bytecode.as_ref(), args.as_slice()].concat())
        }
        None => Ok(proxy::creation_code(implementation, &init_data)),
    }
}

/// Classify an error from submitting a transaction
fn map_send_error(name: &str, err: TransportError) -> ScriptError {
    let reverted = err
        .as_error_resp()
        .is_some_and(|payload| payload.message.contains("revert"));

    if reverted {
        ScriptError::TransactionReverted(format!("{}: {}", name, err))
    } else {
        ScriptError::Provider(format!("{}: {}", name, err))
    }
}

// ------------
// | Encoding |
// ------------

/// ABI-encode the constructor arguments of a contract
pub fn encode_constructor_args(
    factory: &ContractFactory,
    args: &[ResolvedArg],
) -> Result<Vec<u8>, ScriptError> {
    match factory.abi.constructor() {
        Some(constructor) => {
            let context = format!("{} constructor", factory.name);
            let values = coerce_args(&context, &constructor.inputs, args)?;
            constructor
                .abi_encode_input(&values)
                .map_err(|e| ScriptError::Validation(format!("{}: {}", context, e)))
        }
        None if args.is_empty() => Ok(Vec::new()),
        None => Err(ScriptError::Validation(format!(
            "{} has no constructor but was given {} arguments",
            factory.name,
            args.len()
        ))),
    }
}

/// ABI-encode a call to the `initialize` method of a contract, selecting the
/// overload whose arity matches `args`
pub fn encode_initializer_call(
    factory: &ContractFactory,
    args: &[ResolvedArg],
) -> Result<Vec<u8>, ScriptError> {
    let context = format!("{}.{}", factory.name, INITIALIZER_NAME);
    let initializer = factory
        .abi
        .function(INITIALIZER_NAME)
        .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == args.len()))
        .ok_or_else(|| {
            ScriptError::Validation(format!(
                "{} taking {} arguments not found",
                context,
                args.len()
            ))
        })?;

    let values = coerce_args(&context, &initializer.inputs, args)?;
    initializer
        .abi_encode_input(&values)
        .map_err(|e| ScriptError::Validation(format!("{}: {}", context, e)))
}

/// ABI-encode the `(address implementation, bytes data)` constructor
/// arguments of an ERC1967 proxy
fn encode_proxy_constructor_args(
    proxy_factory: &ContractFactory,
    implementation: Address,
    init_data: Vec<u8>,
) -> Result<Vec<u8>, ScriptError> {
    let constructor = proxy_factory.abi.constructor().ok_or_else(|| {
        ScriptError::ArtifactParsing(format!("{} has no constructor", proxy_factory.name))
    })?;

    constructor
        .abi_encode_input(&[
            DynSolValue::Address(implementation),
            DynSolValue::Bytes(init_data),
        ])
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", proxy_factory.name, e)))
}

/// Coerce each argument to the type of the corresponding ABI parameter
fn coerce_args(
    context: &str,
    params: &[Param],
    args: &[ResolvedArg],
) -> Result<Vec<DynSolValue>, ScriptError> {
    if params.len() != args.len() {
        return Err(ScriptError::Validation(format!(
            "{} expects {} arguments, got {}",
            context,
            params.len(),
            args.len()
        )));
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty: DynSolType = param
                .resolve()
                .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", context, e)))?;

            // Strings and addresses are passed through as-is, anything else
            // is parsed from its text form
            match (&ty, arg) {
                (DynSolType::String, ResolvedArg::Str(s)) => Ok(DynSolValue::String(s.clone())),
                (DynSolType::Address, ResolvedArg::Address(a)) => Ok(DynSolValue::Address(*a)),
                _ => ty.coerce_str(&arg.to_string()).map_err(|e| {
                    ScriptError::Validation(format!(
                        "{}: `{}` is not a valid {} for `{}`: {}",
                        context, arg, param.ty, param.name, e
                    ))
                }),
            }
        })
        .collect()
}
