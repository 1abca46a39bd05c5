//! Pipeline orchestrator.

use eyre::Result;
use plinth_manifest::Manifest;

use super::{
    CompilationContext, Phase, PhaseInfo, Plugin,
    phases::{AuditPhase, LowerPhase, PlanPhase, ValidatePhase},
};

/// The compilation pipeline orchestrator.
///
/// The pipeline manages the execution of compilation phases and plugin hooks.
/// It runs built-in phases (validate, lower, plan, audit) followed by any user
/// phases, calling plugin hooks before and after each phase.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new()
///     .plugin(TracingPlugin::new())
///     .phase(MyCustomPhase);
///
/// let ctx = pipeline.run(manifest)?;
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Create a new pipeline with default built-in phases.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Describe every phase this pipeline will run, in order.
    pub fn phase_info(&self) -> Vec<PhaseInfo> {
        builtin_phases()
            .iter()
            .chain(self.phases.iter())
            .map(|p| p.info())
            .collect()
    }

    /// Run the pipeline on a manifest.
    ///
    /// Executes all phases in order:
    /// 1. ValidatePhase - lints the manifest, collects diagnostics
    /// 2. LowerPhase - builds the relationship graph
    /// 3. PlanPhase - orders the graph
    /// 4. AuditPhase - reports policy conflicts and retained resources
    /// 5. User phases (if any)
    ///
    /// Plugin hooks are called before and after each phase.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally.
    pub fn run(&self, manifest: Manifest) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(manifest);
        self.run_with(&mut ctx)?;
        Ok(ctx)
    }

    /// Run the pipeline on an existing context.
    ///
    /// Unlike [`Pipeline::run`], the context survives a failing phase, so
    /// callers can report the diagnostics recorded before the failure.
    pub fn run_with(&self, ctx: &mut CompilationContext) -> Result<()> {
        for phase in builtin_phases().iter().chain(self.phases.iter()) {
            self.run_phase(phase.as_ref(), ctx)?;
        }
        Ok(())
    }

    /// Run a single phase with plugin hooks.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in phases in execution order.
fn builtin_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(ValidatePhase::new()),
        Box::new(LowerPhase),
        Box::new(PlanPhase),
        Box::new(AuditPhase),
    ]
}

#[cfg(test)]
mod tests {
    use std::{
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use super::*;

    struct CountingPlugin {
        before_count: Arc<AtomicUsize>,
        after_count: Arc<AtomicUsize>,
    }

    impl CountingPlugin {
        fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let before = Arc::new(AtomicUsize::new(0));
            let after = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    before_count: before.clone(),
                    after_count: after.clone(),
                },
                before,
                after,
            )
        }
    }

    impl Plugin for CountingPlugin {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn on_before_phase(&self, _phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
            self.before_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_after_phase(&self, _phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
            self.after_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn parse_manifest(content: &str) -> Manifest {
        Manifest::from_str(content).expect("Failed to parse test manifest")
    }

    fn make_test_manifest() -> Manifest {
        parse_manifest(
            r#"
            [stack]
            name = "test"

            [[resource]]
            id = "History"
            kind = "table"

            [[resource]]
            id = "Handler"
            kind = "function"

            [resource.config]
            runtime = "nodejs20.x"
            handler = "index.handler"

            [resource.environment]
            TABLE_NAME = "${History.tableName}"
        "#,
        )
    }

    #[test]
    fn test_pipeline_runs_phases() {
        let manifest = make_test_manifest();
        let pipeline = Pipeline::new();

        let ctx = pipeline.run(manifest).expect("pipeline should succeed");

        assert!(ctx.graph.is_some());
        let plan = ctx.plan().expect("plan should be set");
        assert_eq!(plan.order(), ["History", "Handler"]);
    }

    #[test]
    fn test_pipeline_plugin_hooks() {
        let manifest = make_test_manifest();
        let (plugin, before_count, after_count) = CountingPlugin::new();

        let pipeline = Pipeline::new().plugin(plugin);
        let _ = pipeline.run(manifest).expect("pipeline should succeed");

        // 4 built-in phases = 4 before + 4 after hooks
        assert_eq!(before_count.load(Ordering::SeqCst), 4);
        assert_eq!(after_count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_phase_info() {
        let names: Vec<_> = Pipeline::new()
            .phase_info()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["validate", "lower", "plan", "audit"]);
    }

    #[test]
    fn test_failing_phase_keeps_diagnostics() {
        let manifest = parse_manifest(
            r#"
            [stack]
            name = "test"

            [[resource]]
            id = "Handler"
            kind = "function"

            [resource.config]
            runtime = "nodejs20.x"
            handler = "index.handler"

            [resource.environment]
            TABLE_NAME = "${Missing.tableName}"
        "#,
        );
        let mut ctx = CompilationContext::new(manifest);

        assert!(Pipeline::new().run_with(&mut ctx).is_err());
        assert_eq!(ctx.error_count(), 1);
        assert!(ctx.graph.is_none());
    }
}
