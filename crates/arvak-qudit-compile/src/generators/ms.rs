//! Mølmer–Sørensen generator.

use ndarray::Array2;
use num_complex::Complex64;

use arvak_qudit_ir::{Instruction, QuditGate, UnitaryMatrix};

use super::{LOCAL_FIRST, LOCAL_SECOND, NativeGenerator, unsupported};
use crate::error::CompileResult;

const NAME: &str = "ms";

/// `exp(-iθ/2 · X₀₁⊗X₀₁)` on the lowest two levels of both qudits.
///
/// The phase argument is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsGen {
    dims: (usize, usize),
}

impl MsGen {
    /// Generator for a qudit pair of the given dimensions.
    pub fn new(dims: (usize, usize)) -> CompileResult<Self> {
        if dims.0 < 2 || dims.1 < 2 {
            return Err(unsupported(NAME, (0, 1), dims));
        }
        Ok(Self { dims })
    }

    /// Closed form `I - P⊗P + cos(θ/2)·P⊗P - i·sin(θ/2)·X⊗X`, with `P` the
    /// projector on levels 0 and 1.
    pub fn ms_matrix(&self, theta: f64) -> UnitaryMatrix {
        let d2 = self.dims.1;
        let (s, c) = (theta / 2.0).sin_cos();
        let mut m = Array2::<Complex64>::eye(self.dims.0 * d2);
        for i in 0..2 {
            for j in 0..2 {
                let idx = i * d2 + j;
                let flipped = (1 - i) * d2 + (1 - j);
                m[[idx, idx]] = Complex64::new(c, 0.0);
                m[[idx, flipped]] = Complex64::new(0.0, -s);
            }
        }
        UnitaryMatrix::from_square(m)
    }
}

impl NativeGenerator for MsGen {
    fn name(&self) -> &'static str {
        NAME
    }

    fn dims(&self) -> (usize, usize) {
        self.dims
    }

    fn num_params(&self) -> usize {
        1
    }

    fn instructions_for(&self, angle: f64, _phase: f64) -> CompileResult<Vec<Instruction>> {
        Ok(vec![Instruction::two_qudit_gate(
            QuditGate::Ms { theta: angle }.canonicalize(),
            LOCAL_FIRST,
            LOCAL_SECOND,
        )])
    }

    fn matrix_for(&self, angle: f64, _phase: f64) -> CompileResult<UnitaryMatrix> {
        Ok(self.ms_matrix(angle))
    }
}
