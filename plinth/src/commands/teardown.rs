use clap::Args;
use eyre::{Context, Result};

use super::ConfigArg;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct TeardownCommand {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl TeardownCommand {
    pub fn run(&self) -> Result<()> {
        let stack_toml = self.config.open();
        let report = ops::teardown(stack_toml.manifest())?;

        if self.json {
            let json =
                serde_json::to_string_pretty(&report).wrap_err("Failed to serialize result")?;
            println!("{}", json);
        } else {
            report.render(&mut TerminalOutput::new());
        }

        if report.failure.is_some() {
            std::process::exit(1);
        }
        Ok(())
    }
}
