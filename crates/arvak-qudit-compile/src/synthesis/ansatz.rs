//! Layered two-qudit ansatz.
//!
//! Execution order is `L₀, E₁, L₁, …, E_k, L_k`: each `Lᵢ` is a complete
//! parameterization of `U(d₁) ⊗ U(d₂)` up to global phase, each `Eᵢ` is one
//! application of the native generator. The parameter vector is laid out in
//! the same order, so appending zeros appends identity layers.
//!
//! A local layer on a `d`-level qudit is `Rz` on every adjacent level pair
//! followed by a Givens rotation `R(θ, φ)` on every level pair, `d² − 1`
//! parameters in all. The rotation order is the reverse of a column-by-column
//! elimination, which covers every unitary.

use ndarray::Array2;
use ndarray::linalg::kron;
use num_complex::Complex64;

use arvak_qudit_ir::gate::wrap;
use arvak_qudit_ir::{Instruction, QuditGate, QuditId, ROTATION_PERIOD, UnitaryMatrix};

use crate::error::CompileResult;
use crate::generators::{LOCAL_FIRST, LOCAL_SECOND, NativeGenerator};

/// Angles within this of a multiple of their period are dropped on emit.
pub const IDENTITY_ANGLE: f64 = 1e-10;

/// Level pairs of a local layer on one qudit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalLayout {
    dim: usize,
    rotations: Vec<(usize, usize)>,
}

impl LocalLayout {
    /// Layout for a `dim`-level qudit.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            rotations: elimination_order(dim).into_iter().rev().collect(),
        }
    }

    /// Qudit dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `d² − 1`.
    pub fn num_params(&self) -> usize {
        self.dim * self.dim - 1
    }

    /// Dense matrix of the layer.
    pub fn matrix(&self, params: &[f64]) -> Array2<Complex64> {
        debug_assert_eq!(params.len(), self.num_params());
        let d = self.dim;
        let (rz, rest) = params.split_at(d - 1);

        let mut phases = vec![Complex64::new(1.0, 0.0); d];
        for (lev, &theta) in rz.iter().enumerate() {
            phases[lev] *= Complex64::from_polar(1.0, -theta / 2.0);
            phases[lev + 1] *= Complex64::from_polar(1.0, theta / 2.0);
        }
        let mut m = Array2::from_diag(&ndarray::arr1(&phases));

        for (&(a, b), angles) in self.rotations.iter().zip(rest.chunks_exact(2)) {
            apply_rotation(&mut m, a, b, angles[0], angles[1]);
        }
        m
    }

    /// Native instructions of the layer on `qudit`, identities dropped.
    pub fn instructions(&self, params: &[f64], qudit: QuditId) -> Vec<Instruction> {
        let d = self.dim;
        let (rz, rest) = params.split_at(d - 1);
        let rz_gates = rz.iter().enumerate().map(|(lev, &theta)| QuditGate::Rz {
            theta,
            lev_a: lev,
            lev_b: lev + 1,
        });
        let r_gates = self
            .rotations
            .iter()
            .zip(rest.chunks_exact(2))
            .map(|(&(lev_a, lev_b), angles)| QuditGate::R {
                theta: angles[0],
                phi: angles[1],
                lev_a,
                lev_b,
            });
        rz_gates
            .chain(r_gates)
            .filter(|gate| !gate.is_identity(IDENTITY_ANGLE))
            .map(|gate| Instruction::single_qudit_gate(gate.canonicalize(), qudit))
            .collect()
    }
}

/// Level pairs `(col, row)` in the order a column-by-column Givens
/// elimination visits them.
pub fn elimination_order(dim: usize) -> Vec<(usize, usize)> {
    (0..dim.saturating_sub(1))
        .flat_map(|col| ((col + 1)..dim).rev().map(move |row| (col, row)))
        .collect()
}

/// Left-multiply `m` by `R(θ, φ)` on levels `a`, `b`.
pub fn apply_rotation(m: &mut Array2<Complex64>, a: usize, b: usize, theta: f64, phi: f64) {
    let (s, c) = (theta / 2.0).sin_cos();
    let minus_i = Complex64::new(0.0, -1.0);
    let ab = minus_i * Complex64::from_polar(s, -phi);
    let ba = minus_i * Complex64::from_polar(s, phi);
    for col in 0..m.ncols() {
        let xa = m[[a, col]];
        let xb = m[[b, col]];
        m[[a, col]] = xa * c + ab * xb;
        m[[b, col]] = ba * xa + xb * c;
    }
}

/// `L₀, E₁, L₁, …, E_k, L_k` for a fixed generator and layer count.
pub struct Ansatz<'a> {
    generator: &'a dyn NativeGenerator,
    first: LocalLayout,
    second: LocalLayout,
    layers: usize,
}

impl<'a> Ansatz<'a> {
    /// Ansatz with `layers` entangling layers.
    pub fn new(generator: &'a dyn NativeGenerator, layers: usize) -> Self {
        let (d1, d2) = generator.dims();
        Self {
            generator,
            first: LocalLayout::new(d1),
            second: LocalLayout::new(d2),
            layers,
        }
    }

    /// Number of entangling layers.
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Parameters of one local layer (both qudits).
    pub fn local_params(&self) -> usize {
        self.first.num_params() + self.second.num_params()
    }

    /// Parameters of one entangler.
    pub fn entangler_params(&self) -> usize {
        self.generator.num_params()
    }

    /// Length of the parameter vector.
    pub fn num_params(&self) -> usize {
        (self.layers + 1) * self.local_params() + self.layers * self.entangler_params()
    }

    /// Dense matrix for `params`.
    pub fn unitary(&self, params: &[f64]) -> CompileResult<UnitaryMatrix> {
        let mut cursor = params;
        let mut total = self.local_matrix(take(&mut cursor, self.local_params()));
        for _ in 0..self.layers {
            let (angle, phase) = entangler_angles(take(&mut cursor, self.entangler_params()));
            let entangler = self.generator.matrix_for(angle, phase)?;
            total = entangler.as_array().dot(&total);
            total = self
                .local_matrix(take(&mut cursor, self.local_params()))
                .dot(&total);
        }
        Ok(UnitaryMatrix::from_square(total))
    }

    /// Native instructions for `params`, on local qudits 0 and 1.
    pub fn instructions(&self, params: &[f64]) -> CompileResult<Vec<Instruction>> {
        let mut cursor = params;
        let mut out = self.local_instructions(take(&mut cursor, self.local_params()));
        for _ in 0..self.layers {
            let (angle, phase) = entangler_angles(take(&mut cursor, self.entangler_params()));
            let w = wrap(angle, ROTATION_PERIOD);
            if w > IDENTITY_ANGLE && ROTATION_PERIOD - w > IDENTITY_ANGLE {
                out.extend(self.generator.instructions_for(angle, phase)?);
            }
            out.extend(self.local_instructions(take(&mut cursor, self.local_params())));
        }
        Ok(out)
    }

    fn local_matrix(&self, params: &[f64]) -> Array2<Complex64> {
        let (p1, p2) = params.split_at(self.first.num_params());
        kron(&self.first.matrix(p1), &self.second.matrix(p2))
    }

    fn local_instructions(&self, params: &[f64]) -> Vec<Instruction> {
        let (p1, p2) = params.split_at(self.first.num_params());
        let mut out = self.first.instructions(p1, LOCAL_FIRST);
        out.extend(self.second.instructions(p2, LOCAL_SECOND));
        out
    }
}

fn take<'p>(cursor: &mut &'p [f64], n: usize) -> &'p [f64] {
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    head
}

fn entangler_angles(params: &[f64]) -> (f64, f64) {
    (
        params.first().copied().unwrap_or(0.0),
        params.get(1).copied().unwrap_or(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{CZRotGen, MsGen, PSwapGen};
    use arvak_qudit_ir::Circuit;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 0.3 + 0.17 * i as f64).collect()
    }

    #[test]
    fn test_elimination_order() {
        assert_eq!(elimination_order(3), vec![(0, 2), (0, 1), (1, 2)]);
        assert!(elimination_order(1).is_empty());
    }

    #[test]
    fn test_parameter_counts() {
        let generator = CZRotGen::new((2, 3)).unwrap();
        let ansatz = Ansatz::new(&generator, 2);
        assert_eq!(ansatz.local_params(), 3 + 8);
        assert_eq!(ansatz.num_params(), 3 * 11 + 2 * 2);
    }

    #[test]
    fn test_zero_params_give_identity() {
        let generator = MsGen::new((3, 2)).unwrap();
        let ansatz = Ansatz::new(&generator, 2);
        let u = ansatz.unitary(&vec![0.0; ansatz.num_params()]).unwrap();
        assert!(u.approx_eq(&UnitaryMatrix::identity(6), 1e-14));
        assert!(ansatz.instructions(&vec![0.0; ansatz.num_params()]).unwrap().is_empty());
    }

    #[test]
    fn test_padding_with_zeros_keeps_unitary() {
        let generator = PSwapGen::new((3, 3)).unwrap();
        let short = Ansatz::new(&generator, 1);
        let long = Ansatz::new(&generator, 3);
        let mut params = ramp(short.num_params());
        let u_short = short.unitary(&params).unwrap();
        params.resize(long.num_params(), 0.0);
        let u_long = long.unitary(&params).unwrap();
        assert!(u_short.approx_eq(&u_long, 1e-12));
    }

    #[test]
    fn test_instructions_realize_unitary() {
        for dims in [(2, 3), (3, 3)] {
            let generator = CZRotGen::new(dims).unwrap();
            let ansatz = Ansatz::new(&generator, 2);
            let params = ramp(ansatz.num_params());
            let expected = ansatz.unitary(&params).unwrap();
            let circuit = Circuit::new("ansatz", vec![dims.0, dims.1])
                .unwrap()
                .set_instructions(ansatz.instructions(&params).unwrap())
                .unwrap();
            let realized = circuit.to_matrix().unwrap();
            assert!(realized.approx_eq(&expected, 1e-10));
        }
    }

    #[test]
    fn test_local_layer_is_unitary() {
        let layout = LocalLayout::new(4);
        let m = UnitaryMatrix::from_square(layout.matrix(&ramp(layout.num_params())));
        assert!(m.is_unitary(1e-12));
    }
}
