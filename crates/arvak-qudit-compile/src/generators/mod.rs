//! Native two-qudit generators.
//!
//! A generator knows the exact native pulse sequence realizing one
//! parameterized family of two-qudit gates, and the dense matrix of that
//! family in closed form. Sequences are emitted on the local qudits
//! `QuditId(0)` (first) and `QuditId(1)` (second); callers remap them.
//!
//! | Generator | Family | Parameters |
//! |-----------|--------|------------|
//! | [`CZRotGen`] | controlled rotation | angle, phase |
//! | [`PSwapGen`] | parametric SWAP | angle, phase |
//! | [`MsGen`] | Mølmer–Sørensen | angle |

mod crot;
mod ms;
mod pswap;

pub use crot::CZRotGen;
pub use ms::MsGen;
pub use pswap::PSwapGen;

pub(crate) use crot::crot_sequence;

use ndarray::Array2;
use num_complex::Complex64;

use arvak_qudit_ir::{Instruction, QuditId, UnitaryMatrix};

use crate::config::NativeFamily;
use crate::error::{CompileError, CompileResult};

/// First local qudit of an emitted sequence.
pub const LOCAL_FIRST: QuditId = QuditId(0);
/// Second local qudit of an emitted sequence.
pub const LOCAL_SECOND: QuditId = QuditId(1);

/// A parameterized native two-qudit gate family.
pub trait NativeGenerator: Send + Sync {
    /// Generator name.
    fn name(&self) -> &'static str;

    /// Dimensions of the qudit pair.
    fn dims(&self) -> (usize, usize);

    /// Number of meaningful parameters (1 ignores the phase).
    fn num_params(&self) -> usize;

    /// Exact native instruction sequence, in execution order.
    fn instructions_for(&self, angle: f64, phase: f64) -> CompileResult<Vec<Instruction>>;

    /// The matrix the sequence realizes.
    fn matrix_for(&self, angle: f64, phase: f64) -> CompileResult<UnitaryMatrix>;
}

/// Generator of `family` for a qudit pair of the given dimensions.
pub fn generator_for(
    family: NativeFamily,
    dims: (usize, usize),
) -> CompileResult<Box<dyn NativeGenerator>> {
    Ok(match family {
        NativeFamily::Ms => Box::new(MsGen::new(dims)?),
        NativeFamily::CRot => Box::new(CZRotGen::new(dims)?),
        NativeFamily::PSwap => Box::new(PSwapGen::new(dims)?),
    })
}

fn unsupported(generator: &str, levels: (usize, usize), dims: (usize, usize)) -> CompileError {
    CompileError::UnsupportedLevelPair {
        generator: generator.to_string(),
        levels,
        dims,
    }
}

/// Identity of size `total` with a 2×2 block on basis states `i` and `j`.
fn two_level_block(
    total: usize,
    (i, j): (usize, usize),
    block: [[Complex64; 2]; 2],
) -> UnitaryMatrix {
    let mut m = Array2::eye(total);
    m[[i, i]] = block[0][0];
    m[[i, j]] = block[0][1];
    m[[j, i]] = block[1][0];
    m[[j, j]] = block[1][1];
    UnitaryMatrix::from_square(m)
}

/// The `R(θ, φ)` block.
fn r_block(theta: f64, phi: f64) -> [[Complex64; 2]; 2] {
    let (s, c) = (theta / 2.0).sin_cos();
    let minus_i = Complex64::new(0.0, -1.0);
    [
        [Complex64::new(c, 0.0), minus_i * Complex64::from_polar(s, -phi)],
        [minus_i * Complex64::from_polar(s, phi), Complex64::new(c, 0.0)],
    ]
}
