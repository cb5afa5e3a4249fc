//! Property-based tests for circuit matrices.
//!
//! Random circuits over mixed-dimension registers must stay unitary, and a
//! circuit followed by its reversed dagger must compose to the identity.

use arvak_qudit_ir::{Circuit, Instruction, QuditId, UnitaryMatrix, distance};
use num_complex::Complex64;
use proptest::prelude::*;

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    R(u32, f64, f64, usize, usize),
    Rz(u32, f64, usize, usize),
    VirtRz(u32, f64, usize),
    H(u32),
    X(u32),
    CEx(u32, u32, usize, usize, usize, f64),
    Ms(u32, u32, f64),
    Csum(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        // Operands are drawn without regard to dimensions; invalid ones are
        // rejected by the builder and simply skipped.
        let _ = match self {
            GateOp::R(q, theta, phi, a, b) => circuit.r(theta, phi, a, b, QuditId(q)),
            GateOp::Rz(q, theta, a, b) => circuit.rz(theta, a, b, QuditId(q)),
            GateOp::VirtRz(q, theta, lev) => circuit.virtrz(theta, lev, QuditId(q)),
            GateOp::H(q) => circuit.h(QuditId(q)),
            GateOp::X(q) => circuit.x(QuditId(q)),
            GateOp::CEx(c, t, ctrl, a, b, phi) => circuit.cex(ctrl, a, b, phi, QuditId(c), QuditId(t)),
            GateOp::Ms(q0, q1, theta) => circuit.ms(theta, QuditId(q0), QuditId(q1)),
            GateOp::Csum(c, t) => circuit.csum(QuditId(c), QuditId(t)),
        };
    }
}

fn arb_gate_op(num_qudits: u32) -> impl Strategy<Value = GateOp> {
    let q = 0..num_qudits;
    let angle = -7.0f64..7.0;
    let lev = 0usize..4;
    prop_oneof![
        (q.clone(), angle.clone(), angle.clone(), lev.clone(), lev.clone())
            .prop_map(|(q, t, p, a, b)| GateOp::R(q, t, p, a, b)),
        (q.clone(), angle.clone(), lev.clone(), lev.clone())
            .prop_map(|(q, t, a, b)| GateOp::Rz(q, t, a, b)),
        (q.clone(), angle.clone(), lev.clone()).prop_map(|(q, t, l)| GateOp::VirtRz(q, t, l)),
        q.clone().prop_map(GateOp::H),
        q.clone().prop_map(GateOp::X),
        (q.clone(), q.clone(), lev.clone(), lev.clone(), lev, angle.clone())
            .prop_map(|(c, t, k, a, b, p)| GateOp::CEx(c, t, k, a, b, p)),
        (q.clone(), q.clone(), angle).prop_map(|(a, b, t)| GateOp::Ms(a, b, t)),
        (q.clone(), q).prop_map(|(c, t)| GateOp::Csum(c, t)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    prop::collection::vec(2usize..=4, 1..=3).prop_flat_map(|dims| {
        let n = dims.len() as u32;
        (Just(dims), prop::collection::vec(arb_gate_op(n), 1..=12)).prop_map(|(dims, ops)| {
            let mut circuit = Circuit::new("prop", dims).unwrap();
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn circuit_matrix_is_unitary(circuit in arb_circuit()) {
        let u = circuit.to_matrix().unwrap();
        prop_assert!(u.is_unitary(1e-8), "unitarity error {}", u.unitarity_error());
    }

    #[test]
    fn reversed_dagger_inverts(circuit in arb_circuit()) {
        let inverse: Vec<Instruction> = circuit
            .instructions()
            .iter()
            .rev()
            .map(|inst| inst.dagger(circuit.register()).unwrap())
            .collect();
        let undo = circuit.set_instructions(inverse).unwrap();
        let product = undo.to_matrix().unwrap().compose(&circuit.to_matrix().unwrap()).unwrap();
        let identity = UnitaryMatrix::identity(circuit.register().total_dimension());
        prop_assert!(product.approx_eq(&identity, 1e-8));
    }

    #[test]
    fn distance_is_phase_invariant(circuit in arb_circuit(), phase in 0.0f64..6.28) {
        let u = circuit.to_matrix().unwrap();
        let rotated = UnitaryMatrix::from_array(u.as_array().mapv(|z| z * Complex64::from_polar(1.0, phase))).unwrap();
        let d = distance(&u, &rotated).unwrap();
        prop_assert!(d < 1e-9);
    }
}
