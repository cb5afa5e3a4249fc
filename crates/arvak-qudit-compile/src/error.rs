//! Error types for the compilation crate.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate (dimension mismatches, invalid operands).
    #[error("IR error: {0}")]
    Ir(#[from] arvak_qudit_ir::IrError),

    /// A generator was asked for levels the qudit pair does not have.
    #[error("Generator '{generator}' cannot use levels {levels:?} on dimensions {dims:?}")]
    UnsupportedLevelPair {
        /// Generator name.
        generator: String,
        /// Requested levels.
        levels: (usize, usize),
        /// Dimensions of the qudit pair.
        dims: (usize, usize),
    },

    /// The variational search exhausted its budget.
    #[error(
        "Synthesis unreachable: best distance {best_distance:.3e} after {layers} layers exceeds tolerance {tolerance:.3e}"
    )]
    SynthesisUnreachable {
        /// Lowest distance found.
        best_distance: f64,
        /// Largest layer count tried.
        layers: usize,
        /// Requested tolerance.
        tolerance: f64,
        /// Best distance reached at each layer count, starting at one layer.
        layer_distances: Vec<f64>,
    },

    /// An instruction the pass cannot handle.
    #[error("Unsupported instruction '{name}' on {num_qudits} qudits")]
    UnsupportedInstruction {
        /// Instruction name.
        name: String,
        /// Number of qudits it touches.
        num_qudits: usize,
    },

    /// Gate not in the native gate set.
    #[error("Gate '{0}' not in native gate set")]
    GateNotNative(String),

    /// Invalid pass or synthesis configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file or environment error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
