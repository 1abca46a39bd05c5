//! Output binding.
//!
//! Once a resource is materialized its outputs are recorded in an
//! [`OutputStore`]. Before a dependent is materialized the [`OutputBinder`]
//! replaces every `${Id.outputKey}` in its configuration and policy with the
//! recorded literal.

use indexmap::IndexMap;
use plinth_ir::{
    ConfigValue, GeneratedOutput, OutputRef, Policy, PolicyStatement, ResourceDescriptor,
    ResourceKind, interpolate,
};
use serde::Serialize;

use crate::BindError;

/// Generated outputs keyed by resource id, then output key.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputStore {
    outputs: IndexMap<String, IndexMap<String, String>>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one output, replacing any earlier value for the same key.
    pub fn record(&mut self, output: GeneratedOutput) {
        self.outputs
            .entry(output.resource_id)
            .or_default()
            .insert(output.key, output.value);
    }

    pub fn extend(&mut self, outputs: impl IntoIterator<Item = GeneratedOutput>) {
        for output in outputs {
            self.record(output);
        }
    }

    pub fn get(&self, reference: &OutputRef) -> Option<&str> {
        self.outputs
            .get(&reference.resource)
            .and_then(|keys| keys.get(&reference.key))
            .map(String::as_str)
    }

    /// All outputs recorded for one resource.
    pub fn outputs_of(&self, resource: &str) -> Option<&IndexMap<String, String>> {
        self.outputs.get(resource)
    }

    /// Forget everything recorded for a resource.
    pub fn remove(&mut self, resource: &str) {
        self.outputs.shift_remove(resource);
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// A descriptor with every reference replaced by a literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub id: String,
    pub kind: ResourceKind,
    pub config: IndexMap<String, ConfigValue>,
    /// The principal's policy with bound resource patterns.
    pub policy: Option<Policy>,
}

impl ResolvedConfig {
    /// The resolved environment mapping of a function.
    ///
    /// Non-string values are rendered with their display form.
    pub fn environment(&self) -> IndexMap<String, String> {
        match self.config.get("environment") {
            Some(ConfigValue::Map(env)) => env
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        ConfigValue::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect(),
            _ => IndexMap::new(),
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(ConfigValue::as_str)
    }
}

/// Resolves references against an [`OutputStore`].
pub struct OutputBinder<'s> {
    store: &'s OutputStore,
}

impl<'s> OutputBinder<'s> {
    pub fn new(store: &'s OutputStore) -> Self {
        Self { store }
    }

    /// Look up a single reference.
    pub fn resolve(&self, reference: &OutputRef) -> Result<String, BindError> {
        self.store
            .get(reference)
            .map(str::to_string)
            .ok_or_else(|| BindError::UnresolvedOutput {
                reference: reference.clone(),
            })
    }

    /// Replace every reference in a string.
    pub fn resolve_str(&self, input: &str) -> Result<String, BindError> {
        interpolate(input, |reference| self.resolve(reference))
    }

    /// Replace every reference in a value, recursively.
    pub fn resolve_value(&self, value: &ConfigValue) -> Result<ConfigValue, BindError> {
        value.try_map_strings(&mut |s| self.resolve_str(s))
    }

    /// Bind a descriptor's configuration and, for principals, its policy.
    pub fn bind(
        &self,
        descriptor: &ResourceDescriptor,
        policy: Option<&Policy>,
    ) -> Result<ResolvedConfig, BindError> {
        let mut config = IndexMap::with_capacity(descriptor.config().len());
        for (key, value) in descriptor.config() {
            config.insert(key.clone(), self.resolve_value(value)?);
        }

        let policy = match policy {
            Some(policy) => {
                let mut bound = Policy::new();
                for statement in policy.statements() {
                    let resources = statement
                        .resources
                        .iter()
                        .map(|pattern| self.resolve_str(pattern))
                        .collect::<Result<Vec<_>, _>>()?;
                    bound.add(
                        PolicyStatement::allow(statement.actions.iter().cloned(), resources)
                            .with_effect(statement.effect),
                    );
                }
                Some(bound)
            }
            None => None,
        };

        Ok(ResolvedConfig {
            id: descriptor.id().to_string(),
            kind: descriptor.kind(),
            config,
            policy,
        })
    }
}
