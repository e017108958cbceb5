//! Integration tests for the deploy scripts

use eyre::Result;
use scripts::{
    plan::DeploymentPlan,
    reporter::StdoutReporter,
    sequencer::{RunRecord, Sequencer},
};

use crate::TestArgs;


/// Execute a plan against the devnet, returning the run record
pub(crate) async fn run_plan(args: &TestArgs, plan: &DeploymentPlan) -> Result<RunRecord> {
    let mut reporter = StdoutReporter::default();
    let mut sequencer = Sequencer::new(&args.provider, &mut reporter);
    sequencer.run(plan).await?;

    Ok(sequencer.into_record())
}
