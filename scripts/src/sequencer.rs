//! The deployment sequencer, which executes a [`DeploymentPlan`] one step at
//! a time against a [`ChainProvider`]
//!
//! Steps run strictly in plan order, each waiting for the previous one to
//! confirm. The first failure aborts the rest of the plan; steps that already
//! confirmed stay deployed and remain in the run record.

use alloy_primitives::Address;
use itertools::Itertools;
use tracing::{error, info, warn};

use crate::{
    errors::ScriptError,
    plan::{ConstructorArg, DeploymentMode, DeploymentPlan, DeploymentStep, ResolvedArg},
    provider::{ChainProvider, Deployment},
    reporter::Reporter,
};

/// A confirmed deployment of one plan step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    /// The position of the step in its plan
    pub index: usize,
    /// The step that was deployed
    pub step: DeploymentStep,
    /// The arguments the step was deployed with
    pub args: Vec<ResolvedArg>,
    /// The deployed address; the proxy for proxied deployments
    pub address: Address,
    /// The logic contract behind the proxy, for proxied deployments
    pub implementation: Option<Address>,
    /// Whether the deployment transaction confirmed
    pub confirmed: bool,
}

/// The append-only record of a run, indexed by step position
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunRecord {
    /// The confirmed deployments, in plan order
    entries: Vec<DeployedContract>,
}

impl RunRecord {
    /// The confirmed deployments, in plan order
    pub fn entries(&self) -> &[DeployedContract] {
        &self.entries
    }

    /// The deployment of the step at `index`, if it has confirmed
    pub fn get(&self, index: usize) -> Option<&DeployedContract> {
        self.entries.get(index)
    }

    /// The address deployed by the step with the given manifest key
    pub fn address_of(&self, key: &str) -> Option<Address> {
        self.entries
            .iter()
            .find(|entry| entry.step.key == key)
            .map(|entry| entry.address)
    }

    /// The number of confirmed deployments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no deployment has confirmed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a confirmed deployment, returning it
    fn push(&mut self, entry: DeployedContract) -> &DeployedContract {
        debug_assert_eq!(entry.index, self.entries.len());
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }
}

/// Executes deployment plans, accumulating a [`RunRecord`]
pub struct Sequencer<'a, P, R> {
    /// The chain provider steps are deployed through
    provider: &'a P,
    /// Where confirmed deployments and failures are reported
    reporter: &'a mut R,
    /// The confirmed deployments of the current, or last, run
    record: RunRecord,
    /// The provider's signers, fetched on first use
    signers: Option<Vec<Address>>,
}

impl<'a, P: ChainProvider, R: Reporter> Sequencer<'a, P, R> {
    /// A sequencer with an empty run record
    pub fn new(provider: &'a P, reporter: &'a mut R) -> Self {
        Self {
            provider,
            reporter,
            record: RunRecord::default(),
            signers: None,
        }
    }

    /// The confirmed deployments so far
    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    /// Consume the sequencer, returning its run record
    pub fn into_record(self) -> RunRecord {
        self.record
    }

    /// Execute `plan` to completion, or until the first failing step.
    ///
    /// Each run starts a fresh record, so step references only ever resolve
    /// to deployments of the same plan. On failure the returned error is a
    /// [`ScriptError::StepFailed`] naming the step, and the record holds the
    /// strictly earlier steps. If the reporter cannot record a confirmed
    /// deployment, its error is returned as is and the run stops, with the
    /// deployment kept in the record.
    pub async fn run(&mut self, plan: &DeploymentPlan) -> Result<(), ScriptError> {
        self.record = RunRecord::default();
        plan.validate()?;
        info!("executing deployment plan of {} steps", plan.len());

        for (index, step) in plan.steps().iter().enumerate() {
            let entry = match self.run_step(index, step).await {
                Ok(entry) => self.record.push(entry),
                Err(e) => {
                    self.reporter.failed(index, step, &e);
                    return Err(e.at_step(index, &step.contract));
                }
            };

            // The contract is on-chain whether or not it can be recorded
            if let Err(e) = self.reporter.deployed(entry) {
                error!(
                    "{} deployed to {:#x} but could not be recorded: {}",
                    step.label, entry.address, e
                );
                return Err(e);
            }
        }

        info!("deployment plan complete");
        Ok(())
    }

    /// Resolve and deploy a single step, returning its record entry
    async fn run_step(
        &mut self,
        index: usize,
        step: &DeploymentStep,
    ) -> Result<DeployedContract, ScriptError> {
        let args = self.resolve_args(index, step).await?;
        let factory = self.provider.contract_factory(&step.contract)?;

        info!(
            "step {} pending: deploying {} ({}) with args [{}]",
            index,
            step.contract,
            step.mode,
            args.iter().join(", ")
        );
        if step.mode == DeploymentMode::ProxyUups && factory.abi.constructor().is_some() {
            warn!(
                "{} has a constructor; it will not run in the proxy's storage context",
                step.contract
            );
        }

        let Deployment {
            address,
            implementation,
        } = match step.mode {
            DeploymentMode::Direct => self.provider.deploy(&factory, &args).await?,
            DeploymentMode::ProxyUups => self.provider.deploy_uups_proxy(&factory, &args).await?,
        };
        info!("step {} confirmed: {} at {:#x}", index, step.contract, address);

        Ok(DeployedContract {
            index,
            step: step.clone(),
            args,
            address,
            implementation,
            confirmed: true,
        })
    }

    /// Substitute every reference in a step's arguments
    async fn resolve_args(
        &mut self,
        index: usize,
        step: &DeploymentStep,
    ) -> Result<Vec<ResolvedArg>, ScriptError> {
        let mut resolved = Vec::with_capacity(step.args.len());
        for arg in &step.args {
            let value = match arg {
                ConstructorArg::Address(a) => ResolvedArg::Address(*a),
                ConstructorArg::Uint(v) => ResolvedArg::Uint(*v),
                ConstructorArg::Str(s) => ResolvedArg::Str(s.clone()),
                ConstructorArg::Step(r) => {
                    let entry = self
                        .record
                        .get(r.index())
                        .filter(|entry| entry.confirmed && r.index() < index)
                        .ok_or_else(|| {
                            ScriptError::UnresolvedReference(format!(
                                "step {} has no confirmed address",
                                r.index()
                            ))
                        })?;
                    ResolvedArg::Address(entry.address)
                }
                ConstructorArg::Signer(i) => ResolvedArg::Address(self.signer(*i).await?),
            };
            resolved.push(value);
        }

        Ok(resolved)
    }

    /// The address of the signer at index `i`
    async fn signer(&mut self, i: usize) -> Result<Address, ScriptError> {
        if self.signers.is_none() {
            self.signers = Some(self.provider.signers().await?);
        }

        self.signers
            .as_ref()
            .and_then(|signers| signers.get(i))
            .copied()
            .ok_or_else(|| ScriptError::UnresolvedReference(format!("no signer at index {}", i)))
    }
}
