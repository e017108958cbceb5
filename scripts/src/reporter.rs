//! Reporting of deployment results

use std::path::PathBuf;

use tracing::{error, info};

use crate::{
    errors::ScriptError, plan::DeploymentStep, sequencer::DeployedContract,
    utils::write_deployed_address,
};

/// A sink for the outcome of each plan step
pub trait Reporter {
    /// Report a confirmed deployment
    fn deployed(&mut self, contract: &DeployedContract) -> Result<(), ScriptError>;

    /// Report a step that failed, aborting the plan
    fn failed(&mut self, index: usize, step: &DeploymentStep, err: &ScriptError);
}

/// Prints each deployed address to stdout, optionally recording it in a
/// deployments file as well
#[derive(Clone, Debug, Default)]
pub struct StdoutReporter {
    /// The deployments file to record addresses in
    manifest: Option<PathBuf>,
}

impl StdoutReporter {
    /// A reporter that records addresses in the given deployments file, if any
    pub fn new(manifest: Option<PathBuf>) -> Self {
        Self { manifest }
    }
}

impl Reporter for StdoutReporter {
    fn deployed(&mut self, contract: &DeployedContract) -> Result<(), ScriptError> {
        let label = &contract.step.label;
        println!("{} deployed to: {:#x}", label, contract.address);
        if let Some(implementation) = contract.implementation {
            println!("{} implementation deployed to: {:#x}", label, implementation);
        }
        info!("{} deployed to {:#x}", label, contract.address);

        if let Some(manifest) = &self.manifest {
            write_deployed_address(manifest, &contract.step.key, contract.address)?;
        }

        Ok(())
    }

    fn failed(&mut self, index: usize, step: &DeploymentStep, err: &ScriptError) {
        eprintln!("{} failed to deploy: {}", step.label, err);
        error!("step {} ({}) failed: {}", index, step.contract, err);
    }
}
