//! Parametric SWAP generator.

use std::f64::consts::{FRAC_PI_2, PI};

use arvak_qudit_ir::{Instruction, QuditGate, UnitaryMatrix};

use super::{
    LOCAL_FIRST, LOCAL_SECOND, NativeGenerator, crot_sequence, r_block, two_level_block,
    unsupported,
};
use crate::error::CompileResult;

const NAME: &str = "pswap";

/// Rotation inside the exchange subspace `{|a,b⟩, |b,a⟩}`.
///
/// A controlled exchange maps `|b,a⟩` onto `|b,b⟩`, a controlled rotation
/// with the second qudit as control mixes `|a,b⟩` and `|b,b⟩`, and the
/// inverse exchange restores the original labelling. Everything outside the
/// subspace is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PSwapGen {
    dims: (usize, usize),
}

impl PSwapGen {
    /// Generator for a qudit pair of the given dimensions.
    pub fn new(dims: (usize, usize)) -> CompileResult<Self> {
        let generator = Self { dims };
        generator.check(0, 1)?;
        Ok(generator)
    }

    /// `R(θ, φ)` on `{|lev_a,lev_b⟩, |lev_b,lev_a⟩}`.
    pub fn pswap_as_list(
        &self,
        lev_a: usize,
        lev_b: usize,
        theta: f64,
        phi: f64,
    ) -> CompileResult<Vec<Instruction>> {
        self.check(lev_a, lev_b)?;
        let exchange = |phi: f64| {
            Instruction::two_qudit_gate(
                QuditGate::CEx {
                    ctrl_lev: lev_b,
                    lev_a,
                    lev_b,
                    phi,
                }
                .canonicalize(),
                LOCAL_FIRST,
                LOCAL_SECOND,
            )
        };
        let mut sequence = Vec::with_capacity(6);
        sequence.push(exchange(0.0));
        sequence.extend(crot_sequence(
            LOCAL_SECOND,
            LOCAL_FIRST,
            lev_b,
            lev_a,
            lev_b,
            theta,
            phi - FRAC_PI_2,
        ));
        sequence.push(exchange(PI));
        Ok(sequence)
    }

    /// Matrix of [`PSwapGen::pswap_as_list`].
    pub fn pswap_matrix(
        &self,
        lev_a: usize,
        lev_b: usize,
        theta: f64,
        phi: f64,
    ) -> CompileResult<UnitaryMatrix> {
        self.check(lev_a, lev_b)?;
        let d2 = self.dims.1;
        Ok(two_level_block(
            self.dims.0 * d2,
            (lev_a * d2 + lev_b, lev_b * d2 + lev_a),
            r_block(theta, phi),
        ))
    }

    /// Levels 0 and 1.
    pub fn pswap_101_as_list(&self, theta: f64, phi: f64) -> CompileResult<Vec<Instruction>> {
        self.pswap_as_list(0, 1, theta, phi)
    }

    /// Matrix of [`PSwapGen::pswap_101_as_list`].
    pub fn pswap_101_matrix(&self, theta: f64, phi: f64) -> CompileResult<UnitaryMatrix> {
        self.pswap_matrix(0, 1, theta, phi)
    }

    fn check(&self, lev_a: usize, lev_b: usize) -> CompileResult<()> {
        let limit = self.dims.0.min(self.dims.1);
        if lev_a == lev_b || lev_a >= limit || lev_b >= limit {
            return Err(unsupported(NAME, (lev_a, lev_b), self.dims));
        }
        Ok(())
    }
}

impl NativeGenerator for PSwapGen {
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
        self.pswap_101_as_list(angle, phase)
    }

    fn matrix_for(&self, angle: f64, phase: f64) -> CompileResult<UnitaryMatrix> {
        self.pswap_101_matrix(angle, phase)
    }
}
