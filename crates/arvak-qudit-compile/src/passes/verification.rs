//! Verification passes for ensuring compilation correctness.

use std::sync::Arc;

use tracing::debug;

use arvak_qudit_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::{CompilerPass, PassKind};
use crate::target::TargetContext;

/// Analysis pass that fails if any gate is outside the native gate set.
///
/// Meant to close a pipeline, after every rewriting pass.
pub struct NativeGateVerification {
    context: Arc<TargetContext>,
}

impl NativeGateVerification {
    /// Create the pass for a target.
    pub fn new(context: Arc<TargetContext>) -> Self {
        Self { context }
    }
}

impl CompilerPass for NativeGateVerification {
    fn name(&self) -> &'static str {
        "native_gate_verification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn transpile(&self, circuit: &Circuit) -> CompileResult<Circuit> {
        let native = self.context.native_gates();
        if let Some(inst) = circuit
            .instructions()
            .iter()
            .find(|inst| inst.is_gate() && !native.is_native(inst))
        {
            return Err(CompileError::GateNotNative(inst.to_string()));
        }
        debug!(gates = circuit.len(), "All gates native");
        Ok(circuit.copy())
    }
}
