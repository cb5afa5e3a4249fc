//! Pass trait and types for compilation passes.

use arvak_qudit_ir::Circuit;

use crate::error::CompileResult;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Checks the circuit and returns it unchanged.
    Analysis,
    /// Produces a rewritten circuit.
    Transformation,
}

/// A compilation pass over qudit circuits.
///
/// Passes never mutate their input: `transpile` returns a new circuit, which
/// may share storage with the input when nothing changed.
pub trait CompilerPass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on `circuit`.
    fn transpile(&self, circuit: &Circuit) -> CompileResult<Circuit>;

    /// Check if this pass should run on `circuit`.
    ///
    /// This can be overridden to skip passes that are not needed.
    fn should_run(&self, _circuit: &Circuit) -> bool {
        true
    }
}
