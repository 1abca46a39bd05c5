use serde::Deserialize;

/// Stack metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    /// Name of the stack
    pub name: String,

    /// Stack description
    pub description: Option<String>,

    /// Region resources are declared in
    #[serde(default = "default_region")]
    pub region: String,

    /// Account id used when previewing generated ARNs
    #[serde(default = "default_account")]
    pub account: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_account() -> String {
    "000000000000".to_string()
}
