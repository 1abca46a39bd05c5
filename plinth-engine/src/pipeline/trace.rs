//! Phase timing through `tracing`.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::Instant,
};

use eyre::Result;

use super::{CompilationContext, Plugin};

/// Emits a debug event when each phase starts and finishes.
#[derive(Default)]
pub struct TracingPlugin {
    started: Mutex<HashMap<String, Instant>>,
}

impl TracingPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for TracingPlugin {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn on_before_phase(&self, phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
        tracing::debug!(phase, "phase started");
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(phase.to_string(), Instant::now());
        Ok(())
    }

    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        let elapsed = self
            .started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(phase)
            .map(|start| start.elapsed());
        tracing::debug!(
            phase,
            elapsed = ?elapsed,
            diagnostics = ctx.diagnostics.len(),
            "phase finished"
        );
        Ok(())
    }
}
