//! Explain command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from pipeline explanation.
#[derive(Debug)]
pub struct ExplainReport {
    /// Path to the manifest file.
    pub config_path: PathBuf,
    /// Manifest information.
    pub manifest: ManifestInfo,
    /// Pipeline phases.
    pub phases: Vec<PhaseInfo>,
    /// Validation lints.
    pub lints: Vec<LintInfo>,
    /// Analysis results from running the pipeline.
    pub analysis: AnalysisResult,
}

/// Information extracted from the manifest.
#[derive(Debug)]
pub struct ManifestInfo {
    /// Stack name.
    pub name: String,
    pub region: String,
    pub account: String,
}

/// Information about a pipeline phase.
#[derive(Debug)]
pub struct PhaseInfo {
    /// Phase name.
    pub name: String,
    /// Phase description.
    pub description: String,
}

/// Information about a validation lint.
#[derive(Debug)]
pub struct LintInfo {
    /// Lint name.
    pub name: String,
    /// Lint description.
    pub description: String,
}

/// Analysis results from running the pipeline.
#[derive(Debug)]
pub struct AnalysisResult {
    /// Resources declared in the manifest.
    pub declared: usize,
    /// Method and notification descriptors derived from routes and notifications.
    pub synthesized: usize,
    /// Dependency edges, explicit and implicit.
    pub dependencies: usize,
    pub grants: usize,
    /// Resources holding a policy.
    pub principals: usize,
    pub levels: usize,
    /// Resources in the largest level.
    pub widest_level: usize,
}

impl Report for ExplainReport {
    fn render(&self, out: &mut dyn Output) {
        out.title("Plinth Pipeline Explanation");
        out.newline();

        out.key_value("Input", &self.config_path.display().to_string());
        out.key_value_indented("Stack", &self.manifest.name);
        out.key_value_indented("Region", &self.manifest.region);
        out.key_value_indented("Account", &self.manifest.account);
        out.newline();

        out.section("Pipeline Phases");
        for (i, phase) in self.phases.iter().enumerate() {
            out.numbered_item(i + 1, &format!("{} - {}", phase.name, phase.description));
        }
        out.newline();

        out.section("Validation Lints");
        for lint in &self.lints {
            out.list_item(&format!("{}: {}", lint.name, lint.description));
        }
        out.newline();

        let a = &self.analysis;
        out.section("Analysis Results");
        out.key_value_indented(
            "Resources",
            &format!("{} declared, {} synthesized", a.declared, a.synthesized),
        );
        out.key_value_indented("Dependencies", &a.dependencies.to_string());
        out.key_value_indented(
            "Grants",
            &format!("{} across {} principals", a.grants, a.principals),
        );
        out.key_value_indented(
            "Levels",
            &format!("{} (widest has {})", a.levels, a.widest_level),
        );
    }
}
