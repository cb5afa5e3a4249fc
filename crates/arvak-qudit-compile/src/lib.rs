//! Arvak Qudit Synthesis and Resynthesis Framework
//!
//! This crate rewrites qudit circuits into the gates a trapped-ion qudit
//! device executes natively: level rotations (`r`, `rz`, `virtrz`) plus one
//! entangling family per qudit pair.
//!
//! # Overview
//!
//! - **Generators** ([`generators`]): exact native pulse sequences for the
//!   controlled-rotation, parametric-SWAP and Mølmer–Sørensen families,
//!   together with their closed-form matrices
//! - **Synthesis** ([`synthesis`]): exact single-qudit decomposition and a
//!   layered variational compiler for two-qudit unitaries
//! - **Passes** ([`passes`]): windowed resynthesis and native gate
//!   verification, driven by a [`PassManager`]
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── TargetContext (native gates, pair families, config)
//! └─────────────┘
//!       │
//!       ├── NaiveLocResynthPass ──► decompose_single_qudit / LayeredCompiler
//!       └── NativeGateVerification
//!       │
//!       ▼
//! Output Circuit (native gates only)
//! ```
//!
//! # Example: Exact Generator Sequence
//!
//! ```rust
//! use arvak_qudit_compile::generators::{NativeGenerator, PSwapGen};
//! use arvak_qudit_ir::{Circuit, distance};
//! use std::f64::consts::PI;
//!
//! let generator = PSwapGen::new((2, 3)).unwrap();
//! let sequence = generator.instructions_for(PI / 3.0, PI / 2.0).unwrap();
//!
//! let circuit = Circuit::new("pswap", vec![2, 3])
//!     .unwrap()
//!     .set_instructions(sequence)
//!     .unwrap();
//! let expected = generator.matrix_for(PI / 3.0, PI / 2.0).unwrap();
//! assert!(distance(&circuit.to_matrix().unwrap(), &expected).unwrap() < 1e-10);
//! ```
//!
//! # Example: Resynthesis Pipeline
//!
//! ```rust
//! use arvak_qudit_compile::{PassManagerBuilder, SynthesisConfig, TargetContext};
//! use arvak_qudit_ir::{Circuit, QuditId};
//!
//! let mut circuit = Circuit::new("fourier", vec![3]).unwrap();
//! circuit.h(QuditId(0)).unwrap();
//!
//! let pm = PassManagerBuilder::new()
//!     .with_context(TargetContext::new(SynthesisConfig::default()))
//!     .build();
//! let compiled = pm.run(&circuit).unwrap();
//! assert!(compiled.instructions().iter().all(|i| i.name() == "r" || i.name() == "virtrz"));
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`CompilerPass`] trait to create custom compilation passes:
//!
//! ```rust
//! use arvak_qudit_compile::{CompilerPass, CompileResult, PassKind};
//! use arvak_qudit_ir::Circuit;
//!
//! struct MyCustomPass;
//!
//! impl CompilerPass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn transpile(&self, circuit: &Circuit) -> CompileResult<Circuit> {
//!         Ok(circuit.copy())
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod generators;
pub mod manager;
pub mod pass;
pub mod synthesis;
pub mod target;

// Built-in passes
pub mod passes;

pub use config::{ConfigError, ENV_PREFIX, NativeFamily, OptimizerKind, SynthesisConfig};
pub use error::{CompileError, CompileResult};
pub use generators::{CZRotGen, MsGen, NativeGenerator, PSwapGen, generator_for};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{CompilerPass, PassKind};
pub use passes::{NaiveLocResynthPass, NativeGateVerification};
pub use synthesis::{
    LayeredCompiler, SynthesisResult, SynthesisTarget, decompose_single_qudit, variational_compile,
};
pub use target::{NativeGateSet, TargetContext};
