//! Arvak Qudit Circuit Intermediate Representation
//!
//! This crate provides the data structures the qudit synthesis stack works
//! on: mixed-dimension registers, dense unitary matrices, gates,
//! instructions and circuits.
//!
//! # Core Components
//!
//! - **Registers**: [`QuditRegister`] lists per-qudit dimensions; qudits are
//!   addressed with [`QuditId`]
//! - **Matrices**: [`UnitaryMatrix`] with composition, tensor product,
//!   conjugate transpose, the phase-insensitive [`distance`] and register
//!   embedding
//! - **Gates**: [`QuditGate`], a closed set of level rotations, native
//!   two-qudit pulses and generic gates
//! - **Instructions**: [`Instruction`] combining a gate with targets and
//!   optional [`ControlData`]
//! - **Circuit**: [`Circuit`], an immutable-by-default container with
//!   copy-on-write instruction storage
//!
//! # Example: A Controlled Exchange on a Qubit–Qutrit Pair
//!
//! ```rust
//! use arvak_qudit_ir::{Circuit, QuditId};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::new("cex", vec![2, 3]).unwrap();
//! circuit.r(PI / 2.0, 0.0, 0, 1, QuditId(0)).unwrap();
//! circuit.cex(1, 0, 2, 0.0, QuditId(0), QuditId(1)).unwrap();
//!
//! let u = circuit.to_matrix().unwrap();
//! assert_eq!(u.dim(), 6);
//! assert!(u.is_unitary(1e-9));
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qudits | Description |
//! |------|--------|-------------|
//! | `r` | 1 | Givens rotation `R(θ, φ)` between two levels |
//! | `rz` | 1 | Relative Z rotation between two levels |
//! | `virtrz` | 1 | Phase on a single level |
//! | `cex` | 2 | Controlled exchange |
//! | `ms` | 2 | Mølmer–Sørensen on levels 0/1 |
//! | `h` | 1 | Qudit Fourier transform |
//! | `x` | 1 | Cyclic level shift |
//! | `csum` | 2 | Controlled modular addition |
//! | `unitary` | any | Arbitrary matrix |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qudit;
pub mod unitary;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{GateCategory, PHASE_PERIOD, QuditGate, ROTATION_PERIOD};
pub use instruction::{ControlData, Instruction, InstructionKind};
pub use qudit::{QuditId, QuditRegister};
pub use unitary::{UNITARITY_TOLERANCE, UnitaryMatrix, compose, dagger, distance, tensor};
