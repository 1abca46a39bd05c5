//! A provisioner that creates nothing.
//!
//! Outputs are derived from the resource id, its resolved configuration and
//! the stack's region and account, so the same graph always previews to the
//! same values.

use plinth_ir::{GeneratedOutput, ResourceDescriptor, ResourceKind};

use super::{ProvisionError, Provisioner};
use crate::binder::ResolvedConfig;

/// Synthesizes deterministic outputs and records every call.
#[derive(Debug, Clone)]
pub struct DryRunProvisioner {
    region: String,
    account: String,
    materialized: Vec<String>,
    destroyed: Vec<String>,
}

impl DryRunProvisioner {
    pub fn new(region: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account: account.into(),
            materialized: Vec::new(),
            destroyed: Vec::new(),
        }
    }

    /// Ids passed to `materialize`, in call order.
    pub fn materialized(&self) -> &[String] {
        &self.materialized
    }

    /// Ids passed to `destroy`, in call order.
    pub fn destroyed(&self) -> &[String] {
        &self.destroyed
    }

    /// Total number of calls received.
    pub fn calls(&self) -> usize {
        self.materialized.len() + self.destroyed.len()
    }

    fn outputs(&self, resolved: &ResolvedConfig) -> Vec<(&'static str, String)> {
        let (region, account) = (&self.region, &self.account);
        let slug = slug(&resolved.id);
        let name = |key: &str| {
            resolved
                .get_str(key)
                .map(str::to_string)
                .unwrap_or_else(|| slug.clone())
        };

        match resolved.kind {
            ResourceKind::Bucket => {
                let name = name("bucketName");
                vec![
                    ("bucketName", name.clone()),
                    ("bucketArn", format!("arn:aws:s3:::{name}")),
                    ("bucketDomainName", format!("{name}.s3.amazonaws.com")),
                ]
            }
            ResourceKind::Distribution => vec![
                ("distributionId", format!("E{}", token(&resolved.id, 13))),
                ("distributionDomainName", format!("{slug}.cloudfront.net")),
            ],
            ResourceKind::UserPool => {
                let id = format!("{region}_{}", token(&resolved.id, 9));
                vec![
                    (
                        "userPoolArn",
                        format!("arn:aws:cognito-idp:{region}:{account}:userpool/{id}"),
                    ),
                    (
                        "providerUrl",
                        format!("https://cognito-idp.{region}.amazonaws.com/{id}"),
                    ),
                    ("userPoolId", id),
                ]
            }
            ResourceKind::UserPoolClient => {
                vec![("userPoolClientId", token(&resolved.id, 26).to_lowercase())]
            }
            ResourceKind::UserPoolGroup => vec![("groupName", name("groupName"))],
            ResourceKind::UserPoolDomain => {
                let domain = name("domainPrefix");
                vec![
                    (
                        "baseUrl",
                        format!("https://{domain}.auth.{region}.amazoncognito.com"),
                    ),
                    ("domainName", domain),
                ]
            }
            ResourceKind::ManagedLoginBranding => vec![(
                "managedLoginBrandingId",
                token(&resolved.id, 20).to_lowercase(),
            )],
            ResourceKind::Table => {
                let name = name("tableName");
                vec![
                    (
                        "tableArn",
                        format!("arn:aws:dynamodb:{region}:{account}:table/{name}"),
                    ),
                    ("tableName", name),
                ]
            }
            ResourceKind::Function => {
                let name = name("functionName");
                vec![
                    (
                        "functionArn",
                        format!("arn:aws:lambda:{region}:{account}:function:{name}"),
                    ),
                    ("roleArn", format!("arn:aws:iam::{account}:role/{name}-role")),
                    ("functionName", name),
                ]
            }
            ResourceKind::Api => {
                let api_id = token(&resolved.id, 10).to_lowercase();
                let stage = resolved.get_str("stageName").unwrap_or("prod").to_string();
                vec![
                    (
                        "url",
                        format!("https://{api_id}.execute-api.{region}.amazonaws.com/{stage}/"),
                    ),
                    ("restApiId", api_id),
                    ("stageName", stage),
                ]
            }
            ResourceKind::Authorizer => {
                vec![("authorizerId", token(&resolved.id, 6).to_lowercase())]
            }
            ResourceKind::Method => vec![("methodId", slug.clone())],
            ResourceKind::LogGroup => {
                let name = resolved
                    .get_str("logGroupName")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("/plinth/{slug}"));
                vec![
                    (
                        "logGroupArn",
                        format!("arn:aws:logs:{region}:{account}:log-group:{name}"),
                    ),
                    ("logGroupName", name),
                ]
            }
            ResourceKind::Deployment => {
                vec![("deploymentId", token(&resolved.id, 8).to_lowercase())]
            }
            ResourceKind::BucketNotification => Vec::new(),
        }
    }
}

impl Provisioner for DryRunProvisioner {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    fn materialize(
        &mut self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedConfig,
    ) -> Result<Vec<GeneratedOutput>, ProvisionError> {
        let outputs = self
            .outputs(resolved)
            .into_iter()
            .map(|(key, value)| GeneratedOutput::new(descriptor.id(), key, value))
            .collect();
        self.materialized.push(descriptor.id().to_string());
        Ok(outputs)
    }

    fn destroy(&mut self, descriptor: &ResourceDescriptor) -> Result<(), ProvisionError> {
        self.destroyed.push(descriptor.id().to_string());
        Ok(())
    }
}

/// Lowercase, dash-separated form of an id, e.g. `HistoryTable` → `history-table`.
fn slug(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    let mut prev_lower = false;
    for c in id.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_lower = true;
        } else {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower = false;
        }
    }
    out
}

/// Uppercase alphanumeric token of exactly `len` characters derived from `id`.
fn token(id: &str, len: usize) -> String {
    id.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .chain(std::iter::repeat('X'))
        .take(len)
        .collect()
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn resolved(id: &str, kind: ResourceKind) -> ResolvedConfig {
        ResolvedConfig {
            id: id.to_string(),
            kind,
            config: IndexMap::new(),
            policy: None,
        }
    }

    fn materialize(id: &str, kind: ResourceKind) -> Vec<GeneratedOutput> {
        let mut provisioner = DryRunProvisioner::new("us-east-1", "123456789012");
        let descriptor = ResourceDescriptor::new(id, kind);
        provisioner
            .materialize(&descriptor, &resolved(id, kind))
            .unwrap()
    }

    #[test]
    fn test_outputs_match_kind() {
        for kind in ResourceKind::ALL {
            let mut keys: Vec<String> = materialize("Sample", *kind)
                .into_iter()
                .map(|o| o.key)
                .collect();
            let mut expected: Vec<String> = kind.outputs().iter().map(|k| k.to_string()).collect();
            keys.sort();
            expected.sort();
            assert_eq!(keys, expected, "outputs for {kind}");
        }
    }

    #[test]
    fn test_table_outputs_use_configured_name() {
        let mut provisioner = DryRunProvisioner::new("eu-west-1", "123456789012");
        let descriptor = ResourceDescriptor::new("History", ResourceKind::Table);
        let mut config = resolved("History", ResourceKind::Table);
        config.config.insert("tableName".into(), "history-v2".into());

        let outputs = provisioner.materialize(&descriptor, &config).unwrap();
        let arn = outputs.iter().find(|o| o.key == "tableArn").unwrap();
        assert_eq!(
            arn.value,
            "arn:aws:dynamodb:eu-west-1:123456789012:table/history-v2"
        );
        assert_eq!(provisioner.materialized(), ["History"]);
    }

    #[test]
    fn test_user_pool_id_is_region_scoped() {
        let outputs = materialize("Pool", ResourceKind::UserPool);
        let id = outputs.iter().find(|o| o.key == "userPoolId").unwrap();
        assert_eq!(id.value, "us-east-1_POOLXXXXX");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("HistoryTable"), "history-table");
        assert_eq!(slug("upload_bucket"), "upload-bucket");
        assert_eq!(slug("Gateway-POST-users"), "gateway-post-users");
    }

    #[test]
    fn test_destroy_is_recorded() {
        let mut provisioner = DryRunProvisioner::new("us-east-1", "123456789012");
        provisioner
            .destroy(&ResourceDescriptor::new("Site", ResourceKind::Bucket))
            .unwrap();
        assert_eq!(provisioner.destroyed(), ["Site"]);
        assert_eq!(provisioner.calls(), 1);
    }
}
