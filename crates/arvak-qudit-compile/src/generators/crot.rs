//! Controlled-rotation generator.

use std::f64::consts::{FRAC_PI_2, PI};

use num_complex::Complex64;

use arvak_qudit_ir::{Instruction, QuditGate, QuditId, UnitaryMatrix};

use super::{LOCAL_FIRST, LOCAL_SECOND, NativeGenerator, r_block, two_level_block, unsupported};
use crate::error::CompileResult;

const NAME: &str = "crot";

/// Controlled rotations from controlled exchanges.
///
/// `R(θ, φ)` on the second qudit's levels `(a, b)` iff the first qudit sits
/// on the control level, exact and without global phase:
///
/// ```text
/// R(θ/2, φ) · CEx(φ + π/2) · R(−θ/2, φ) · CEx(φ − π/2)
/// ```
///
/// When the control is elsewhere the two half rotations cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CZRotGen {
    dims: (usize, usize),
}

impl CZRotGen {
    /// Generator for a `(control, target)` pair of the given dimensions.
    pub fn new(dims: (usize, usize)) -> CompileResult<Self> {
        let generator = Self { dims };
        generator.check(1, 0, 1)?;
        Ok(generator)
    }

    /// Controlled `R(θ, φ)` on target levels `(lev_a, lev_b)`.
    pub fn crot_as_list(
        &self,
        ctrl_lev: usize,
        lev_a: usize,
        lev_b: usize,
        theta: f64,
        phi: f64,
    ) -> CompileResult<Vec<Instruction>> {
        self.check(ctrl_lev, lev_a, lev_b)?;
        Ok(crot_sequence(
            LOCAL_FIRST,
            LOCAL_SECOND,
            ctrl_lev,
            lev_a,
            lev_b,
            theta,
            phi,
        ))
    }

    /// Matrix of [`CZRotGen::crot_as_list`].
    pub fn crot_matrix(
        &self,
        ctrl_lev: usize,
        lev_a: usize,
        lev_b: usize,
        theta: f64,
        phi: f64,
    ) -> CompileResult<UnitaryMatrix> {
        self.check(ctrl_lev, lev_a, lev_b)?;
        Ok(two_level_block(
            self.dims.0 * self.dims.1,
            self.basis_pair(ctrl_lev, lev_a, lev_b),
            r_block(theta, phi),
        ))
    }

    /// Control level 1, target levels 0 and 1.
    pub fn crot_101_as_list(&self, theta: f64, phi: f64) -> CompileResult<Vec<Instruction>> {
        self.crot_as_list(1, 0, 1, theta, phi)
    }

    /// Matrix of [`CZRotGen::crot_101_as_list`].
    pub fn crot_101_matrix(&self, theta: f64, phi: f64) -> CompileResult<UnitaryMatrix> {
        self.crot_matrix(1, 0, 1, theta, phi)
    }

    /// Controlled `Rz(θ)` on target levels `(lev, lev + 1)`, control level 1.
    ///
    /// The controlled `R(θ, π/2)` is conjugated by `R(∓π/2, 0)` on the target,
    /// turning its rotation axis onto Z.
    pub fn z_from_crot_101_list(&self, lev: usize, theta: f64) -> CompileResult<Vec<Instruction>> {
        let upper = self.upper_level(lev)?;
        let basis = |theta: f64| {
            Instruction::single_qudit_gate(
                QuditGate::R {
                    theta,
                    phi: 0.0,
                    lev_a: lev,
                    lev_b: upper,
                }
                .canonicalize(),
                LOCAL_SECOND,
            )
        };
        let mut sequence = vec![basis(-FRAC_PI_2)];
        sequence.extend(crot_sequence(
            LOCAL_FIRST,
            LOCAL_SECOND,
            1,
            lev,
            upper,
            theta,
            FRAC_PI_2,
        ));
        sequence.push(basis(FRAC_PI_2));
        Ok(sequence)
    }

    /// Matrix of [`CZRotGen::z_from_crot_101_list`].
    pub fn z_from_crot_101_matrix(&self, lev: usize, theta: f64) -> CompileResult<UnitaryMatrix> {
        let upper = self.upper_level(lev)?;
        let zero = Complex64::new(0.0, 0.0);
        Ok(two_level_block(
            self.dims.0 * self.dims.1,
            self.basis_pair(1, lev, upper),
            [
                [Complex64::from_polar(1.0, -theta / 2.0), zero],
                [zero, Complex64::from_polar(1.0, theta / 2.0)],
            ],
        ))
    }

    fn basis_pair(&self, ctrl_lev: usize, lev_a: usize, lev_b: usize) -> (usize, usize) {
        let row = ctrl_lev * self.dims.1;
        (row + lev_a, row + lev_b)
    }

    /// `lev + 1`, checked as the target level pair `(lev, lev + 1)`.
    fn upper_level(&self, lev: usize) -> CompileResult<usize> {
        let upper = lev
            .checked_add(1)
            .ok_or_else(|| unsupported(NAME, (lev, lev), self.dims))?;
        self.check(1, lev, upper)?;
        Ok(upper)
    }

    fn check(&self, ctrl_lev: usize, lev_a: usize, lev_b: usize) -> CompileResult<()> {
        let (d_ctrl, d_target) = self.dims;
        if ctrl_lev >= d_ctrl {
            return Err(unsupported(NAME, (ctrl_lev, ctrl_lev), self.dims));
        }
        if lev_a == lev_b || lev_a >= d_target || lev_b >= d_target {
            return Err(unsupported(NAME, (lev_a, lev_b), self.dims));
        }
        Ok(())
    }
}

impl NativeGenerator for CZRotGen {
    fn name(&self) -> &'static str {
        NAME
    }

    fn dims(&self) -> (usize, usize) {
        self.dims
    }

    fn num_params(&self) -> usize {
        2
    }

    fn instructions_for(&self, angle: f64, phase: f64) -> CompileResult<Vec<Instruction>> {
        self.crot_101_as_list(angle, phase)
    }

    fn matrix_for(&self, angle: f64, phase: f64) -> CompileResult<UnitaryMatrix> {
        self.crot_101_matrix(angle, phase)
    }
}

/// The four-pulse controlled rotation on arbitrary qudits.
pub(crate) fn crot_sequence(
    control: QuditId,
    target: QuditId,
    ctrl_lev: usize,
    lev_a: usize,
    lev_b: usize,
    theta: f64,
    phi: f64,
) -> Vec<Instruction> {
    let half = |theta: f64| {
        Instruction::single_qudit_gate(
            QuditGate::R {
                theta,
                phi,
                lev_a,
                lev_b,
            }
            .canonicalize(),
            target,
        )
    };
    let exchange = |phi: f64| {
        Instruction::two_qudit_gate(
            QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                phi,
            }
            .canonicalize(),
            control,
            target,
        )
    };
    vec![
        half(theta / 2.0),
        exchange(phi + PI / 2.0),
        half(-theta / 2.0),
        exchange(phi - PI / 2.0),
    ]
}
