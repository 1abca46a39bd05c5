//! Lint for function deployment units.

use plinth_ir::ResourceKind;
use plinth_manifest::Manifest;

use super::super::Lint;
use crate::pipeline::{Diagnostic, Location};

/// Keys a function needs for its deployment unit to be usable.
const REQUIRED_KEYS: &[&str] = &["runtime", "handler"];

/// Lint that warns about functions missing a runtime or handler.
pub struct FunctionHandlerLint;

impl Lint for FunctionHandlerLint {
    fn name(&self) -> &'static str {
        "function-handler"
    }

    fn description(&self) -> &'static str {
        "Check functions declare a runtime and handler"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        let functions = manifest
            .resources
            .iter()
            .filter(|r| r.kind == ResourceKind::Function);

        for function in functions {
            let missing: Vec<&str> = REQUIRED_KEYS
                .iter()
                .copied()
                .filter(|key| !function.config.contains_key(*key))
                .collect();
            if !missing.is_empty() {
                diagnostics.push(
                    Diagnostic::warning(
                        "validate",
                        format!(
                            "function '{}' has no {} configured",
                            function.id(),
                            missing.join(" or ")
                        ),
                    )
                    .at(Location::Config(function.id().to_string())),
                );
            }
        }
    }
}
