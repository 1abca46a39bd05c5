//! Resource descriptors.
//!
//! A descriptor is the declared specification of one managed resource before
//! it is materialized. Descriptors are plain data: the id and kind are fixed
//! at construction and only configuration can be added afterwards.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ConfigValue;

/// The type of managed entity a descriptor declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Object storage bucket.
    Bucket,
    /// CDN distribution in front of a bucket.
    Distribution,
    /// Identity provider user pool.
    UserPool,
    /// Application client registered with a user pool.
    UserPoolClient,
    /// Group of users inside a user pool.
    UserPoolGroup,
    /// Hosted sign-in domain for a user pool.
    UserPoolDomain,
    /// Managed login page styling for a user pool client.
    ManagedLoginBranding,
    /// Managed NoSQL table.
    Table,
    /// Compute function.
    Function,
    /// Request gateway.
    Api,
    /// Gateway authorizer backed by a user pool.
    Authorizer,
    /// Gateway route + method bound to a function.
    Method,
    /// Log sink.
    LogGroup,
    /// Static asset upload into a bucket.
    Deployment,
    /// Bucket change notification bound to a function.
    BucketNotification,
}

impl ResourceKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::Bucket,
        ResourceKind::Distribution,
        ResourceKind::UserPool,
        ResourceKind::UserPoolClient,
        ResourceKind::UserPoolGroup,
        ResourceKind::UserPoolDomain,
        ResourceKind::ManagedLoginBranding,
        ResourceKind::Table,
        ResourceKind::Function,
        ResourceKind::Api,
        ResourceKind::Authorizer,
        ResourceKind::Method,
        ResourceKind::LogGroup,
        ResourceKind::Deployment,
        ResourceKind::BucketNotification,
    ];

    /// Get the manifest spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Bucket => "bucket",
            ResourceKind::Distribution => "distribution",
            ResourceKind::UserPool => "user-pool",
            ResourceKind::UserPoolClient => "user-pool-client",
            ResourceKind::UserPoolGroup => "user-pool-group",
            ResourceKind::UserPoolDomain => "user-pool-domain",
            ResourceKind::ManagedLoginBranding => "managed-login-branding",
            ResourceKind::Table => "table",
            ResourceKind::Function => "function",
            ResourceKind::Api => "api",
            ResourceKind::Authorizer => "authorizer",
            ResourceKind::Method => "method",
            ResourceKind::LogGroup => "log-group",
            ResourceKind::Deployment => "deployment",
            ResourceKind::BucketNotification => "bucket-notification",
        }
    }

    /// The fixed set of output keys a materialized resource of this kind exposes.
    pub fn outputs(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Bucket => &["bucketName", "bucketArn", "bucketDomainName"],
            ResourceKind::Distribution => &["distributionId", "distributionDomainName"],
            ResourceKind::UserPool => &["userPoolId", "userPoolArn", "providerUrl"],
            ResourceKind::UserPoolClient => &["userPoolClientId"],
            ResourceKind::UserPoolGroup => &["groupName"],
            ResourceKind::UserPoolDomain => &["domainName", "baseUrl"],
            ResourceKind::ManagedLoginBranding => &["managedLoginBrandingId"],
            ResourceKind::Table => &["tableName", "tableArn"],
            ResourceKind::Function => &["functionName", "functionArn", "roleArn"],
            ResourceKind::Api => &["restApiId", "url", "stageName"],
            ResourceKind::Authorizer => &["authorizerId"],
            ResourceKind::Method => &["methodId"],
            ResourceKind::LogGroup => &["logGroupName", "logGroupArn"],
            ResourceKind::Deployment => &["deploymentId"],
            ResourceKind::BucketNotification => &[],
        }
    }

    /// Returns true if resources of this kind expose the given output key.
    pub fn produces(&self, key: &str) -> bool {
        self.outputs().contains(&key)
    }

    /// The output holding this kind's resource ARN, if it has one.
    ///
    /// This is the narrowest pattern a permission on the resource can be
    /// scoped to.
    pub fn arn_output(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Bucket => Some("bucketArn"),
            ResourceKind::UserPool => Some("userPoolArn"),
            ResourceKind::Table => Some("tableArn"),
            ResourceKind::Function => Some("functionArn"),
            ResourceKind::LogGroup => Some("logGroupArn"),
            _ => None,
        }
    }

    /// Returns true if resources of this kind can hold a permission policy.
    pub fn is_principal(&self) -> bool {
        matches!(self, ResourceKind::Function)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// What happens to the materialized resource when the graph is torn down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Remove the underlying resource.
    #[default]
    Destroy,
    /// Leave the underlying resource in place.
    Retain,
}

impl RemovalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "destroy",
            RemovalPolicy::Retain => "retain",
        }
    }
}

/// Configuration key holding a function's environment mapping.
const ENVIRONMENT_KEY: &str = "environment";

/// A declared specification of one managed resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    id: String,
    kind: ResourceKind,
    config: IndexMap<String, ConfigValue>,
    removal_policy: RemovalPolicy,
}

impl ResourceDescriptor {
    /// Create a descriptor with empty configuration and the default removal policy.
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            config: IndexMap::new(),
            removal_policy: RemovalPolicy::default(),
        }
    }

    /// Set a configuration value.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Add an environment entry (only meaningful for functions).
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let entry = self
            .config
            .entry(ENVIRONMENT_KEY.to_string())
            .or_insert_with(|| ConfigValue::Map(IndexMap::new()));
        if let ConfigValue::Map(env) = entry {
            env.insert(key.into(), ConfigValue::String(value.into()));
        }
        self
    }

    /// Set the removal policy.
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn config(&self) -> &IndexMap<String, ConfigValue> {
        &self.config
    }

    /// Get a single configuration value.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.config.get(key)
    }

    /// Get a configuration value as a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(ConfigValue::as_str)
    }

    /// The declared (unresolved) environment mapping, if any.
    pub fn environment(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self.config.get(ENVIRONMENT_KEY) {
            Some(ConfigValue::Map(env)) => Some(env),
            _ => None,
        }
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }
}
