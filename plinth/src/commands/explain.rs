use clap::Args;
use eyre::Result;

use super::ConfigArg;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ExplainCommand {
    #[command(flatten)]
    pub config: ConfigArg,
}

impl ExplainCommand {
    pub fn run(&self) -> Result<()> {
        let stack_toml = self.config.open();

        let report = ops::explain(stack_toml.manifest(), stack_toml.path())?;
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}
