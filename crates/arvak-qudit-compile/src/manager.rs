//! Pass manager for orchestrating compilation.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use arvak_qudit_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::{CompilerPass, PassKind};
use crate::passes::{NaiveLocResynthPass, NativeGateVerification};
use crate::target::TargetContext;

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn CompilerPass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl CompilerPass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes, each on the previous pass's output.
    ///
    /// Analysis passes only inspect the circuit: whatever they return is
    /// discarded and the next pass sees the same circuit. The first failing
    /// pass aborts the run and its error is returned.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &Circuit) -> CompileResult<Circuit> {
        info!(
            "Running pass manager with {} passes on circuit with {} qudits",
            self.passes.len(),
            circuit.num_qudits()
        );

        let mut current = circuit.copy();
        for pass in &self.passes {
            if pass.should_run(&current) {
                debug!("Running pass: {}", pass.name());
                match pass.kind() {
                    PassKind::Analysis => {
                        pass.transpile(&current)?;
                        debug!("Analysis pass {} completed", pass.name());
                    }
                    PassKind::Transformation => {
                        current = pass.transpile(&current)?;
                        debug!("Pass {} completed, ops: {}", pass.name(), current.len());
                    }
                }
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, ops: {}, multi-qudit ops: {}",
            current.len(),
            current.multi_qudit_count()
        );

        Ok(current)
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Names of the passes, in order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard resynthesis pipeline.
pub struct PassManagerBuilder {
    context: Arc<TargetContext>,
    verification: bool,
}

impl PassManagerBuilder {
    /// Create a new builder with the default target.
    pub fn new() -> Self {
        Self {
            context: Arc::new(TargetContext::default()),
            verification: true,
        }
    }

    /// Set the target.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<Arc<TargetContext>>) -> Self {
        self.context = context.into();
        self
    }

    /// Append native gate verification after resynthesis (on by default).
    #[must_use]
    pub fn with_verification(mut self, verification: bool) -> Self {
        self.verification = verification;
        self
    }

    /// Build the pass manager.
    pub fn build(self) -> PassManager {
        let mut pm = PassManager::new();
        pm.add_pass(NaiveLocResynthPass::new(Arc::clone(&self.context)));
        if self.verification {
            pm.add_pass(NativeGateVerification::new(self.context));
        }
        pm
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
