//! Dense unitary matrices over mixed-dimension qudit registers.
//!
//! [`UnitaryMatrix`] is the value type the whole synthesis pipeline passes
//! around: gate materialization, window composition, the variational
//! objective and the test-side equivalence checks all go through it.

use ndarray::Array2;
use ndarray::linalg::kron;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// Default tolerance for unitarity checks.
pub const UNITARITY_TOLERANCE: f64 = 1e-9;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Taylor terms are dropped once they fall below this magnitude.
const EXPM_TERM_CUTOFF: f64 = 1e-18;
const EXPM_MAX_TERMS: usize = 30;

/// A dense complex square matrix, row-major, acting on `dim()` basis states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array2<Complex64>", into = "Array2<Complex64>")]
pub struct UnitaryMatrix {
    data: Array2<Complex64>,
}

impl UnitaryMatrix {
    /// The identity on `dim` basis states.
    pub fn identity(dim: usize) -> Self {
        Self {
            data: Array2::eye(dim),
        }
    }

    /// Wrap an existing array; it must be square.
    pub fn from_array(data: Array2<Complex64>) -> IrResult<Self> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(IrError::NotSquare { rows, cols });
        }
        Ok(Self { data })
    }

    /// Wrap an array the caller already knows to be square.
    pub fn from_square(data: Array2<Complex64>) -> Self {
        debug_assert_eq!(data.nrows(), data.ncols());
        Self { data }
    }

    /// Build from rows.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> IrResult<Self> {
        let n = rows.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != n) {
            return Err(IrError::NotSquare {
                rows: n,
                cols: bad.len(),
            });
        }
        let flat: Vec<Complex64> = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((n, n), flat).map_err(|_| IrError::NotSquare {
            rows: n,
            cols: n,
        })?;
        Ok(Self { data })
    }

    /// Build a diagonal matrix.
    pub fn diagonal(entries: &[Complex64]) -> Self {
        Self {
            data: Array2::from_diag(&ndarray::arr1(entries)),
        }
    }

    /// Number of rows (and columns).
    #[inline]
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[[row, col]]
    }

    /// Borrow the underlying array.
    pub fn as_array(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// Take the underlying array.
    pub fn into_array(self) -> Array2<Complex64> {
        self.data
    }

    /// Matrix product `self · other`.
    pub fn compose(&self, other: &Self) -> IrResult<Self> {
        check_same_dim("compose", self, other)?;
        Ok(Self {
            data: self.data.dot(&other.data),
        })
    }

    /// Kronecker product `self ⊗ other`.
    pub fn tensor(&self, other: &Self) -> Self {
        Self {
            data: kron(&self.data, &other.data),
        }
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        Self {
            data: self.data.t().mapv(|z| z.conj()),
        }
    }

    /// `Tr(self† · other)`, computed without forming the product.
    pub fn trace_overlap(&self, other: &Self) -> IrResult<Complex64> {
        check_same_dim("trace_overlap", self, other)?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// `|Tr(self† · other)| / dim`, 1 for matrices equal up to global phase.
    pub fn fidelity(&self, other: &Self) -> IrResult<f64> {
        let overlap = self.trace_overlap(other)?;
        Ok(overlap.norm() / self.dim() as f64)
    }

    /// `1 - |Tr(self† · other)| / dim`, 0 iff equal up to global phase.
    pub fn distance(&self, other: &Self) -> IrResult<f64> {
        Ok((1.0 - self.fidelity(other)?).max(0.0))
    }

    /// Largest entry of `|U†U - I|`.
    pub fn unitarity_error(&self) -> f64 {
        let product = self.dagger().data.dot(&self.data);
        product
            .indexed_iter()
            .map(|((r, c), z)| {
                let expected = if r == c { ONE } else { ZERO };
                (z - expected).norm()
            })
            .fold(0.0, f64::max)
    }

    /// Check `U†U = I` within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.unitarity_error() < tolerance
    }

    /// Element-wise comparison (no global phase freedom).
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.dim() == other.dim()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).norm() < tolerance)
    }

    /// Round every real and imaginary part to `decimals` places.
    pub fn round(&self, decimals: i32) -> Self {
        let factor = 10f64.powi(decimals);
        let round = |x: f64| (x * factor).round() / factor + 0.0;
        Self {
            data: self.data.mapv(|z| Complex64::new(round(z.re), round(z.im))),
        }
    }

    /// `exp(scale · generator)` by scaling and squaring a Taylor series.
    ///
    /// The result is unitary when `scale · generator` is anti-Hermitian,
    /// e.g. a Hermitian generator with an imaginary scale.
    pub fn expm(generator: &Array2<Complex64>, scale: Complex64) -> IrResult<Self> {
        let (rows, cols) = generator.dim();
        if rows != cols {
            return Err(IrError::NotSquare { rows, cols });
        }
        let a = generator.mapv(|z| z * scale);
        let norm = a
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|z| z.norm()).sum::<f64>())
            .fold(0.0, f64::max);
        let squarings = if norm > 0.5 {
            (norm / 0.5).log2().ceil() as i32
        } else {
            0
        };
        let a = a.mapv(|z| z / 2f64.powi(squarings));

        let mut result = Array2::<Complex64>::eye(rows);
        let mut term = Array2::<Complex64>::eye(rows);
        for k in 1..=EXPM_MAX_TERMS {
            term = term.dot(&a).mapv(|z| z / k as f64);
            result += &term;
            if term.iter().all(|z| z.norm() < EXPM_TERM_CUTOFF) {
                break;
            }
        }
        for _ in 0..squarings {
            result = result.dot(&result);
        }
        Ok(Self { data: result })
    }

    /// Lift this operator into a register.
    ///
    /// `targets` lists the register positions this matrix acts on, most
    /// significant first; untouched qudits get identities. `controls` is a
    /// list of `(qudit, level)` pairs: the operator only applies on basis
    /// states where every control qudit sits on its level.
    pub fn embed(
        &self,
        register_dims: &[usize],
        targets: &[usize],
        controls: &[(usize, usize)],
    ) -> IrResult<Self> {
        let n = register_dims.len();
        for (i, &t) in targets.iter().enumerate() {
            if t >= n {
                return Err(IrError::QuditNotFound {
                    qudit: t.into(),
                    gate_name: None,
                });
            }
            if targets[..i].contains(&t) {
                return Err(IrError::DuplicateQudit {
                    qudit: t.into(),
                    gate_name: None,
                });
            }
        }
        for &(q, level) in controls {
            if q >= n {
                return Err(IrError::QuditNotFound {
                    qudit: q.into(),
                    gate_name: None,
                });
            }
            if targets.contains(&q) {
                return Err(IrError::InvalidControl(format!(
                    "qudit {q} is both target and control"
                )));
            }
            if level >= register_dims[q] {
                return Err(IrError::InvalidControl(format!(
                    "control level {level} exceeds dimension {} of qudit {q}",
                    register_dims[q]
                )));
            }
        }

        let local_dim: usize = targets.iter().map(|&t| register_dims[t]).product();
        if local_dim != self.dim() {
            return Err(IrError::DimensionMismatch {
                operation: "embed",
                left: self.dim(),
                right: local_dim,
            });
        }

        let strides = strides(register_dims);
        let local_dims: Vec<usize> = targets.iter().map(|&t| register_dims[t]).collect();
        let local_strides = strides_of(&local_dims);
        let total: usize = register_dims.iter().product();

        let mut full = Array2::<Complex64>::zeros((total, total));
        for col in 0..total {
            let digit = |q: usize| (col / strides[q]) % register_dims[q];
            if !controls.iter().all(|&(q, level)| digit(q) == level) {
                full[[col, col]] = ONE;
                continue;
            }
            let mut local_in = 0;
            let mut base = col;
            for (k, &t) in targets.iter().enumerate() {
                local_in += digit(t) * local_strides[k];
                base -= digit(t) * strides[t];
            }
            for local_out in 0..local_dim {
                let amp = self.data[[local_out, local_in]];
                if amp == ZERO {
                    continue;
                }
                let row = targets.iter().enumerate().fold(base, |acc, (k, &t)| {
                    acc + ((local_out / local_strides[k]) % local_dims[k]) * strides[t]
                });
                full[[row, col]] += amp;
            }
        }
        Ok(Self { data: full })
    }
}

impl TryFrom<Array2<Complex64>> for UnitaryMatrix {
    type Error = IrError;

    fn try_from(data: Array2<Complex64>) -> IrResult<Self> {
        Self::from_array(data)
    }
}

impl From<UnitaryMatrix> for Array2<Complex64> {
    fn from(matrix: UnitaryMatrix) -> Self {
        matrix.data
    }
}

/// Matrix product `a · b`.
pub fn compose(a: &UnitaryMatrix, b: &UnitaryMatrix) -> IrResult<UnitaryMatrix> {
    a.compose(b)
}

/// Kronecker product `a ⊗ b`.
pub fn tensor(a: &UnitaryMatrix, b: &UnitaryMatrix) -> UnitaryMatrix {
    a.tensor(b)
}

/// Conjugate transpose.
pub fn dagger(a: &UnitaryMatrix) -> UnitaryMatrix {
    a.dagger()
}

/// `1 - |Tr(a† · b)| / dim`.
pub fn distance(a: &UnitaryMatrix, b: &UnitaryMatrix) -> IrResult<f64> {
    a.distance(b)
}

/// Row-major strides of a mixed-radix register (last qudit varies fastest).
pub fn strides(dims: &[usize]) -> Vec<usize> {
    strides_of(dims)
}

fn strides_of(dims: &[usize]) -> Vec<usize> {
    let mut out = vec![1; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        out[i] = out[i + 1] * dims[i + 1];
    }
    out
}

fn check_same_dim(
    operation: &'static str,
    a: &UnitaryMatrix,
    b: &UnitaryMatrix,
) -> IrResult<()> {
    if a.dim() == b.dim() {
        Ok(())
    } else {
        Err(IrError::DimensionMismatch {
            operation,
            left: a.dim(),
            right: b.dim(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn pauli_x() -> UnitaryMatrix {
        UnitaryMatrix::from_rows(vec![vec![ZERO, ONE], vec![ONE, ZERO]]).unwrap()
    }

    fn shift3() -> UnitaryMatrix {
        // |k⟩ → |k+1 mod 3⟩
        UnitaryMatrix::from_rows(vec![
            vec![ZERO, ZERO, ONE],
            vec![ONE, ZERO, ZERO],
            vec![ZERO, ONE, ZERO],
        ])
        .unwrap()
    }

    fn rx(theta: f64) -> UnitaryMatrix {
        let (s, co) = (theta / 2.0).sin_cos();
        UnitaryMatrix::from_rows(vec![vec![c(co, 0.0), c(0.0, -s)], vec![c(0.0, -s), c(co, 0.0)]])
            .unwrap()
    }

    #[test]
    fn test_identity_is_unitary() {
        assert!(UnitaryMatrix::identity(5).is_unitary(UNITARITY_TOLERANCE));
    }

    #[test]
    fn test_compose_dimension_mismatch() {
        let err = compose(&UnitaryMatrix::identity(2), &UnitaryMatrix::identity(3)).unwrap_err();
        assert!(matches!(
            err,
            IrError::DimensionMismatch {
                operation: "compose",
                left: 2,
                right: 3
            }
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = UnitaryMatrix::from_rows(vec![vec![ONE, ZERO], vec![ONE]]).unwrap_err();
        assert!(matches!(err, IrError::NotSquare { .. }));
    }

    #[test]
    fn test_x_squared_is_identity() {
        let x = pauli_x();
        let xx = x.compose(&x).unwrap();
        assert!(xx.approx_eq(&UnitaryMatrix::identity(2), 1e-12));
    }

    #[test]
    fn test_tensor_dimensions_and_unitarity() {
        let t = tensor(&pauli_x(), &shift3());
        assert_eq!(t.dim(), 6);
        assert!(t.is_unitary(UNITARITY_TOLERANCE));
        // |0,0⟩ → |1,1⟩
        assert_eq!(t.get(4, 0), ONE);
    }

    #[test]
    fn test_dagger_inverts() {
        let u = rx(0.7).tensor(&shift3());
        let product = u.dagger().compose(&u).unwrap();
        assert!(product.approx_eq(&UnitaryMatrix::identity(6), 1e-12));
    }

    #[test]
    fn test_distance_ignores_global_phase() {
        let u = rx(1.1);
        let phased = UnitaryMatrix::from_array(u.as_array().mapv(|z| z * c(0.0, 1.0))).unwrap();
        assert!(distance(&u, &phased).unwrap() < 1e-12);
        assert!(distance(&u, &pauli_x()).unwrap() > 0.1);
    }

    #[test]
    fn test_distance_grows_with_perturbation() {
        let target = UnitaryMatrix::identity(2);
        let d1 = distance(&rx(0.01), &target).unwrap();
        let d2 = distance(&rx(0.1), &target).unwrap();
        let d3 = distance(&rx(0.5), &target).unwrap();
        assert!(0.0 < d1 && d1 < d2 && d2 < d3);
    }

    #[test]
    fn test_expm_matches_rx() {
        let x = pauli_x().into_array();
        let theta = 2.3;
        let u = UnitaryMatrix::expm(&x, c(0.0, -theta / 2.0)).unwrap();
        assert!(u.approx_eq(&rx(theta), 1e-12));
    }

    #[test]
    fn test_expm_large_norm_stays_unitary() {
        let x = pauli_x().into_array();
        let u = UnitaryMatrix::expm(&x, c(0.0, -40.0 * PI)).unwrap();
        assert!(u.is_unitary(1e-8));
    }

    #[test]
    fn test_embed_second_qudit() {
        let embedded = shift3().embed(&[2, 3], &[1], &[]).unwrap();
        let expected = UnitaryMatrix::identity(2).tensor(&shift3());
        assert!(embedded.approx_eq(&expected, 1e-12));
    }

    #[test]
    fn test_embed_reversed_targets() {
        let op = pauli_x().tensor(&shift3());
        // acting on [q1, q0] of a [3, 2] register is the same physical gate
        let embedded = op.embed(&[3, 2], &[1, 0], &[]).unwrap();
        let expected = shift3().tensor(&pauli_x());
        assert!(embedded.approx_eq(&expected, 1e-12));
    }

    #[test]
    fn test_embed_with_control() {
        // X on qudit 1 when qudit 0 is on level 2
        let embedded = pauli_x().embed(&[3, 2], &[1], &[(0, 2)]).unwrap();
        assert_eq!(embedded.get(0, 0), ONE);
        assert_eq!(embedded.get(3, 3), ONE);
        assert_eq!(embedded.get(5, 4), ONE);
        assert_eq!(embedded.get(4, 5), ONE);
        assert!(embedded.is_unitary(UNITARITY_TOLERANCE));
    }

    #[test]
    fn test_embed_dimension_mismatch() {
        let err = pauli_x().embed(&[3, 3], &[0], &[]).unwrap_err();
        assert!(matches!(err, IrError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_round_normalizes_negative_zero() {
        let m = UnitaryMatrix::diagonal(&[c(-1e-9, 0.0), c(0.70711, -0.0)]).round(3);
        assert_eq!(m.get(0, 0), c(0.0, 0.0));
        assert_eq!(m.get(1, 1), c(0.707, 0.0));
    }

    #[test]
    fn test_serde_roundtrip_validates_shape() {
        let u = rx(0.3);
        let json = serde_json::to_string(&u).unwrap();
        let back: UnitaryMatrix = serde_json::from_str(&json).unwrap();
        assert!(back.approx_eq(&u, 1e-15));
    }
}
