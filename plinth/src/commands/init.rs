use std::path::{Path, PathBuf};

use clap::Args;
use eyre::{Context, Result, bail};
use plinth_manifest::{MANIFEST_FILE, StackToml};

use super::UnwrapOrExit;

const TEMPLATE: &str = r#"[stack]
name = "{name}"
region = "us-east-1"

[[resource]]
id = "UploadBucket"
kind = "bucket"

[[resource]]
id = "HistoryTable"
kind = "table"
removal = "retain"

[resource.config]
partitionKey = { name = "userId", type = "S" }
billingMode = "PAY_PER_REQUEST"

[[resource]]
id = "Processor"
kind = "function"

[resource.config]
runtime = "nodejs22.x"
handler = "index.handler"

[resource.environment]
TABLE_NAME = "${HistoryTable.tableName}"

[[grant]]
principal = "Processor"
resource = "HistoryTable"
access = "read-write"

[[grant]]
principal = "Processor"
resource = "UploadBucket"
access = "read"

[[notification]]
bucket = "UploadBucket"
event = "object-created"
function = "Processor"
"#;

#[derive(Args)]
pub struct InitCommand {
    /// Stack name (defaults to the output directory name)
    pub name: Option<String>,

    /// Directory to create plinth.toml in
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Overwrite an existing plinth.toml
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(&self) -> Result<()> {
        let path = self.output.join(MANIFEST_FILE);
        if path.exists() && !self.force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }

        let name = match &self.name {
            Some(name) => name.clone(),
            None => Self::directory_name(&self.output)?,
        };

        std::fs::create_dir_all(&self.output)
            .wrap_err_with(|| format!("Failed to create {}", self.output.display()))?;
        StackToml::create(&path, render(&name)).unwrap_or_exit();

        println!("Created {}", path.display());
        println!();
        println!("Next steps:");
        println!("  plinth check -c {}", path.display());
        println!("  plinth plan -c {}", path.display());
        Ok(())
    }

    fn directory_name(dir: &Path) -> Result<String> {
        let dir = std::fs::canonicalize(dir)
            .or_else(|_| std::env::current_dir().map(|cwd| cwd.join(dir)))
            .wrap_err("Failed to get current directory")?;
        dir.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| eyre::eyre!("{} has no valid name", dir.display()))
    }
}

fn render(name: &str) -> String {
    TEMPLATE.replace("{name}", name)
}
