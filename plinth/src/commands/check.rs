use clap::Args;
use eyre::Result;

use super::ConfigArg;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub config: ConfigArg,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let stack_toml = self.config.open();

        let report = ops::check(stack_toml.manifest(), stack_toml.path());
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
