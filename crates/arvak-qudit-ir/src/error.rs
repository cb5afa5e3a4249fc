//! Error types for the IR crate.

use crate::qudit::QuditId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Two matrices (or a matrix and a register) have incompatible sizes.
    #[error("Dimension mismatch in {operation}: {left} vs {right}")]
    DimensionMismatch {
        /// The operation that was attempted.
        operation: &'static str,
        /// Size of the left-hand operand.
        left: usize,
        /// Size of the right-hand operand.
        right: usize,
    },

    /// A matrix was expected to be square.
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// A qudit dimension below 2.
    #[error("Qudit dimension must be at least 2, got {0}")]
    InvalidDimension(usize),

    /// A register with no qudits.
    #[error("Register must contain at least one qudit")]
    EmptyRegister,

    /// Qudit not found in circuit.
    #[error("Qudit {qudit} not found in register{}", format_gate_context(.gate_name))]
    QuditNotFound {
        /// The qudit that was not found.
        qudit: QuditId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Duplicate qudit in operation.
    #[error("Duplicate qudit {qudit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQudit {
        /// The duplicate qudit.
        qudit: QuditId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires a different number of qudits.
    #[error("Gate '{gate_name}' requires {expected} qudits, got {got}")]
    QuditCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qudits.
        expected: usize,
        /// Actual number of qudits provided.
        got: usize,
    },

    /// A gate addresses a level the qudit does not have.
    #[error("Gate '{gate_name}' addresses level {level} on a qudit of dimension {dimension}")]
    LevelOutOfRange {
        /// Name of the gate.
        gate_name: String,
        /// The offending level.
        level: usize,
        /// Dimension of the qudit.
        dimension: usize,
    },

    /// The two levels of a two-level operation must differ.
    #[error("Gate '{gate_name}' needs two distinct levels, got {lev_a} and {lev_b}")]
    InvalidLevels {
        /// Name of the gate.
        gate_name: String,
        /// First level.
        lev_a: usize,
        /// Second level.
        lev_b: usize,
    },

    /// Malformed control specification.
    #[error("Invalid control specification: {0}")]
    InvalidControl(String),

    /// Instruction has no unitary matrix (e.g. measurement).
    #[error("Instruction '{0}' is not unitary")]
    NonUnitaryInstruction(String),

    /// Circuit (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
