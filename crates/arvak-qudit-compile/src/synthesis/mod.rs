//! Unitary synthesis.
//!
//! - [`layered`]: variational search over layered two-qudit ansätze.
//! - [`local`]: exact decomposition of single-qudit unitaries.
//! - [`optimizer`]: the local minimizers driving the search.

pub mod ansatz;
pub mod layered;
pub mod local;
pub mod optimizer;

pub use ansatz::Ansatz;
pub use layered::{LayeredCompiler, SynthesisResult, SynthesisTarget, variational_compile};
pub use local::decompose_single_qudit;
pub use optimizer::{Adam, NelderMead, OptimizationResult, Optimizer};
