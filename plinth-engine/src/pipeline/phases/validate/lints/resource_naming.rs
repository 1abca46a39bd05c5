//! Lint for resource id conventions.

use plinth_manifest::Manifest;

use super::super::Lint;
use crate::pipeline::{Diagnostic, Location};

/// Lint that warns about resource ids that aren't PascalCase.
///
/// PascalCase means: starts with an uppercase letter, then letters and
/// digits only. Examples: `HistoryTable`, `UploadBucket`, `ApiV2`
pub struct ResourceNamingLint;

impl Lint for ResourceNamingLint {
    fn name(&self) -> &'static str {
        "resource-naming"
    }

    fn description(&self) -> &'static str {
        "Check resource ids follow PascalCase conventions"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        for resource in &manifest.resources {
            let id = resource.id();
            if !is_pascal_case(id) {
                diagnostics.push(
                    Diagnostic::warning(
                        "validate",
                        format!(
                            "resource '{}' should use PascalCase (e.g., 'UploadBucket' not 'upload_bucket' or 'upload-bucket')",
                            id
                        ),
                    )
                    .at(Location::Resource(id.to_string())),
                );
            }
        }
    }
}

fn is_pascal_case(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric())
}
