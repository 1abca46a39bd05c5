use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};

use super::ConfigArg;
use crate::{
    ops::{self, plan::PlanOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct PlanCommand {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Write a JSON snapshot of the pipeline state after each phase to this directory
    #[arg(long, value_name = "DIR")]
    pub snapshots: Option<PathBuf>,
}

impl PlanCommand {
    pub fn run(&self) -> Result<()> {
        let stack_toml = self.config.open();

        let report = ops::plan(
            stack_toml.manifest(),
            PlanOptions {
                snapshots: self.snapshots.as_deref(),
            },
        )?;

        if self.json {
            let json = serde_json::to_string_pretty(&report).wrap_err("Failed to serialize plan")?;
            println!("{}", json);
        } else {
            report.render(&mut TerminalOutput::new());
        }

        if let Some(dir) = &self.snapshots {
            eprintln!("Snapshots written to {}", dir.display());
        }
        Ok(())
    }
}
