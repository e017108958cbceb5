//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// The requested contract name has no resolvable artifact
    UnknownContract(String),
    /// A step referenced an address that has not been produced yet
    UnresolvedReference(String),
    /// The deployment transaction was mined but reverted
    TransactionReverted(String),
    /// Network or RPC-level failure reaching the chain
    Provider(String),
    /// Malformed configuration or deployment plan
    Validation(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error parsing a compilation artifact
    ArtifactParsing(String),
    /// Error reading the deployments manifest
    ReadDeployments(String),
    /// Error writing the deployments manifest
    WriteDeployments(String),
    /// A step of a deployment plan failed, aborting the rest of the plan
    StepFailed {
        /// The position of the failing step in the plan
        index: usize,
        /// The contract the failing step was deploying
        contract: String,
        /// The underlying error
        cause: Box<ScriptError>,
    },
}

impl ScriptError {
    /// Wrap this error with the context of the plan step it occurred in
    pub fn at_step(self, index: usize, contract: &str) -> Self {
        ScriptError::StepFailed {
            index,
            contract: contract.to_string(),
            cause: Box::new(self),
        }
    }

    /// The originating error, unwrapping any step context
    pub fn root_cause(&self) -> &ScriptError {
        match self {
            ScriptError::StepFailed { cause, .. } => cause.root_cause(),
            e => e,
        }
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownContract(s) => write!(f, "unknown contract: {}", s),
            ScriptError::UnresolvedReference(s) => write!(f, "unresolved reference: {}", s),
            ScriptError::TransactionReverted(s) => write!(f, "transaction reverted: {}", s),
            ScriptError::Provider(s) => write!(f, "provider error: {}", s),
            ScriptError::Validation(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::StepFailed {
                index,
                contract,
                cause,
            } => write!(f, "step {} ({}) failed: {}", index, contract, cause),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScriptError::StepFailed { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}
