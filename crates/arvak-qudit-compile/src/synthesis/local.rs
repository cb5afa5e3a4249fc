//! Exact single-qudit decomposition.
//!
//! Givens rotations eliminate the strictly lower triangle column by column,
//! leaving a diagonal of phases. Inverting the rotations and emitting the
//! relative phases as virtual Z gates realizes the input up to global phase.

use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use arvak_qudit_ir::{
    Instruction, IrError, QuditGate, QuditId, UNITARITY_TOLERANCE, UnitaryMatrix,
};

use super::ansatz::{IDENTITY_ANGLE, apply_rotation, elimination_order};
use crate::error::CompileResult;

/// Below this magnitude an entry counts as already eliminated.
const ELIMINATED: f64 = 1e-14;

/// Native `R`/`VirtRz` sequence realizing `unitary` on `qudit`.
pub fn decompose_single_qudit(
    unitary: &UnitaryMatrix,
    qudit: QuditId,
) -> CompileResult<Vec<Instruction>> {
    if !unitary.is_unitary(UNITARITY_TOLERANCE * 1e3) {
        return Err(IrError::NonUnitaryInstruction(format!(
            "{}x{} block on {qudit}",
            unitary.dim(),
            unitary.dim()
        ))
        .into());
    }

    let mut m = unitary.as_array().clone();
    let mut rotations = Vec::new();
    for (col, row) in elimination_order(unitary.dim()) {
        let x = m[[col, col]];
        let y = m[[row, col]];
        if y.norm() < ELIMINATED {
            continue;
        }
        let theta = 2.0 * y.norm().atan2(x.norm());
        let phi = y.arg() - x.arg() - FRAC_PI_2;
        apply_rotation(&mut m, col, row, theta, phi);
        rotations.push((col, row, theta, phi));
    }

    let reference = m[[0, 0]].arg();
    let phases = (1..unitary.dim()).map(|lev| QuditGate::VirtRz {
        theta: reference - m[[lev, lev]].arg(),
        lev,
    });
    let inverses = rotations
        .into_iter()
        .rev()
        .map(|(lev_a, lev_b, theta, phi)| QuditGate::R {
            theta: -theta,
            phi,
            lev_a,
            lev_b,
        });

    let sequence: Vec<Instruction> = phases
        .chain(inverses)
        .filter(|gate| !gate.is_identity(IDENTITY_ANGLE))
        .map(|gate| Instruction::single_qudit_gate(gate.canonicalize(), qudit))
        .collect();
    debug!(
        dim = unitary.dim(),
        gates = sequence.len(),
        "Decomposed single-qudit block"
    );
    Ok(sequence)
}
