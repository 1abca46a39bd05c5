mod apply;
mod check;
mod completions;
mod explain;
mod init;
mod plan;
mod teardown;

use std::path::PathBuf;

use apply::ApplyCommand;
use check::CheckCommand;
use clap::{Args, Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use explain::ExplainCommand;
use init::InitCommand;
use plan::PlanCommand;
use plinth_manifest::{MANIFEST_FILE, StackToml};
use teardown::TeardownCommand;

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for plinth_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

/// The manifest a command reads.
#[derive(Args)]
pub(crate) struct ConfigArg {
    /// Path to plinth.toml (defaults to ./plinth.toml)
    #[arg(short, long, default_value = MANIFEST_FILE)]
    pub config: PathBuf,
}

impl ConfigArg {
    /// Open the manifest, exiting with a rendered diagnostic if it is invalid.
    pub fn open(&self) -> StackToml {
        StackToml::open(&self.config).unwrap_or_exit()
    }
}

#[derive(Parser)]
#[command(name = "plinth")]
#[command(version)]
#[command(about = "Plan and preview declarative resource stacks")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Init(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Plan(cmd) => cmd.run(),
            Commands::Explain(cmd) => cmd.run(),
            Commands::Apply(cmd) => cmd.run(),
            Commands::Teardown(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter plinth.toml
    Init(InitCommand),

    /// Validate plinth.toml and report diagnostics
    Check(CheckCommand),

    /// Show the materialization order and parallel levels
    Plan(PlanCommand),

    /// Describe the pipeline phases and lints
    Explain(ExplainCommand),

    /// Preview materialization with generated outputs
    Apply(ApplyCommand),

    /// Preview teardown after a full apply
    Teardown(TeardownCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["plinth", "-vv", "check"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn test_plan_flags() {
        let cli =
            Cli::try_parse_from(["plinth", "plan", "--json", "-c", "stack.toml"]).unwrap();
        let Commands::Plan(cmd) = cli.command else {
            panic!("expected plan");
        };
        assert!(cmd.json);
        assert_eq!(cmd.config.config, PathBuf::from("stack.toml"));
    }
}
