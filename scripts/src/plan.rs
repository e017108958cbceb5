//! Declarative deployment plans
//!
//! A plan is an ordered list of steps. A step may reference the address
//! produced by an earlier step through a [`StepRef`], which can only be
//! obtained by pushing that earlier step onto the plan.

use std::fmt::{self, Display};

use alloy_primitives::{Address, U256};
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::ScriptError;

/// How a contract is published on-chain
#[derive(ValueEnum, Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    /// Deploy the contract directly, passing the arguments to its constructor
    Direct,
    /// Deploy the contract behind an ERC1967 proxy, passing the arguments to
    /// its `initialize` method
    ProxyUups,
}

impl Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Direct => write!(f, "direct"),
            DeploymentMode::ProxyUups => write!(f, "proxy-uups"),
        }
    }
}

/// A handle to the output address of an earlier step in a plan
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StepRef(pub(crate) usize);

impl StepRef {
    /// The position of the referenced step in its plan
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A single constructor (or initializer) argument
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstructorArg {
    /// A literal address
    Address(Address),
    /// A literal unsigned integer
    Uint(U256),
    /// A literal string
    Str(String),
    /// The address deployed by an earlier step
    Step(StepRef),
    /// The address of the chain provider's signer at the given index
    Signer(usize),
}

/// A constructor argument with every reference substituted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedArg {
    /// An address
    Address(Address),
    /// An unsigned integer
    Uint(U256),
    /// A string
    Str(String),
}

impl Display for ResolvedArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedArg::Address(a) => write!(f, "{:#x}", a),
            ResolvedArg::Uint(v) => write!(f, "{}", v),
            ResolvedArg::Str(s) => write!(f, "{}", s),
        }
    }
}

/// One contract deployment in a plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentStep {
    /// The key under which the deployed address is recorded in the manifest
    pub key: String,
    /// The label used when reporting the deployed address
    pub label: String,
    /// The name of the contract artifact to deploy
    pub contract: String,
    /// The constructor, or initializer, arguments
    pub args: Vec<ConstructorArg>,
    /// Whether to deploy directly or behind a proxy
    pub mode: DeploymentMode,
}

impl DeploymentStep {
    /// A step deploying `contract` directly, with no arguments
    pub fn direct(key: &str, label: &str, contract: &str) -> Self {
        Self::new(key, label, contract, DeploymentMode::Direct)
    }

    /// A step deploying `contract` with the given mode, with no arguments
    pub fn new(key: &str, label: &str, contract: &str, mode: DeploymentMode) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            contract: contract.to_string(),
            args: Vec::new(),
            mode,
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: ConstructorArg) -> Self {
        self.args.push(arg);
        self
    }

    /// The step references contained in this step's arguments
    pub fn step_refs(&self) -> impl Iterator<Item = StepRef> + '_ {
        self.args.iter().filter_map(|arg| match arg {
            ConstructorArg::Step(r) => Some(*r),
            _ => None,
        })
    }
}

/// An ordered sequence of deployment steps
#[derive(Clone, Debug, Default)]
pub struct DeploymentPlan {
    /// The steps, in execution order
    steps: Vec<DeploymentStep>,
}

impl DeploymentPlan {
    /// An empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, returning a reference to its eventual address
    pub fn push(&mut self, step: DeploymentStep) -> StepRef {
        self.steps.push(step);
        StepRef(self.steps.len() - 1)
    }

    /// The steps of the plan, in execution order
    pub fn steps(&self) -> &[DeploymentStep] {
        &self.steps
    }

    /// The number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check the plan is executable in order: it is non-empty, its manifest
    /// keys are unique, and every step reference points backwards
    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.steps.is_empty() {
            return Err(ScriptError::Validation("deployment plan is empty".to_string()));
        }

        if let Some(key) = self.steps.iter().map(|s| s.key.as_str()).duplicates().next() {
            return Err(ScriptError::Validation(format!(
                "duplicate deployment key `{}`",
                key
            )));
        }

        for (index, step) in self.steps.iter().enumerate() {
            if let Some(r) = step.step_refs().find(|r| r.index() >= index) {
                return Err(ScriptError::UnresolvedReference(format!(
                    "step {} ({}) references step {}, which does not precede it",
                    index,
                    step.contract,
                    r.index()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_positional_refs() {
        let mut plan = DeploymentPlan::new();
        let a = plan.push(DeploymentStep::direct("a", "A", "A"));
        let b = plan.push(DeploymentStep::direct("b", "B", "B").arg(ConstructorArg::Step(a)));

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(plan.len(), 2);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_empty_plan_rejected() {
        let err = DeploymentPlan::new().validate().unwrap_err();
        assert!(matches!(err, ScriptError::Validation(_)));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut plan = DeploymentPlan::new();
        plan.push(DeploymentStep::direct("axe", "Axe NFT", "Axe"));
        plan.push(DeploymentStep::direct("axe", "Axe NFT", "Axe"));

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ScriptError::Validation(_)));
    }

    #[test]
    fn test_self_reference_rejected() {
        let mut plan = DeploymentPlan::new();
        plan.push(DeploymentStep::direct("a", "A", "A").arg(ConstructorArg::Step(StepRef(0))));

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ScriptError::UnresolvedReference(_)));
    }

    #[test]
    fn test_resolved_arg_display() {
        let addr = Address::repeat_byte(0xaa);
        assert_eq!(
            ResolvedArg::Address(addr).to_string(),
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        );
        assert_eq!(ResolvedArg::Uint(U256::from(2000)).to_string(), "2000");
        assert_eq!(ResolvedArg::Str("AXE1".to_string()).to_string(), "AXE1");
    }
}
