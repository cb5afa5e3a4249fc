//! High-level circuit builder API.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::QuditGate;
use crate::instruction::Instruction;
use crate::qudit::{QuditId, QuditRegister};
use crate::unitary::UnitaryMatrix;

/// A qudit circuit.
///
/// The register and the instruction sequence are shared behind `Arc`s:
/// [`Circuit::copy`] is a structural clone, and appending to a circuit whose
/// sequence is shared copies the sequence first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CircuitRepr", into = "CircuitRepr")]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Per-qudit dimensions.
    register: Arc<QuditRegister>,
    /// Ordered instructions.
    instructions: Arc<Vec<Instruction>>,
}

#[derive(Serialize, Deserialize)]
struct CircuitRepr {
    name: String,
    dims: QuditRegister,
    #[serde(default)]
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit over qudits of the given dimensions.
    pub fn new(name: impl Into<String>, dims: impl Into<Vec<usize>>) -> IrResult<Self> {
        Ok(Self::with_register(name, QuditRegister::new(dims)?))
    }

    /// Create an empty circuit over an existing register.
    pub fn with_register(name: impl Into<String>, register: QuditRegister) -> Self {
        Self {
            name: name.into(),
            register: Arc::new(register),
            instructions: Arc::new(Vec::new()),
        }
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The register descriptor.
    pub fn register(&self) -> &QuditRegister {
        &self.register
    }

    /// Per-qudit dimensions.
    pub fn dims(&self) -> &[usize] {
        self.register.dims()
    }

    /// Number of qudits.
    pub fn num_qudits(&self) -> usize {
        self.register.len()
    }

    /// Dimension of one qudit.
    pub fn dimension_of(&self, qudit: QuditId) -> IrResult<usize> {
        self.register.dimension_of(qudit)
    }

    /// The instruction sequence.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True when the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Cheap structural copy sharing register and instructions.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// A new circuit with the same register and a replaced sequence.
    pub fn set_instructions(&self, instructions: Vec<Instruction>) -> IrResult<Self> {
        for inst in &instructions {
            inst.validate(&self.register)?;
        }
        Ok(Self {
            name: self.name.clone(),
            register: Arc::clone(&self.register),
            instructions: Arc::new(instructions),
        })
    }

    /// Append an instruction after validating it.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        instruction.validate(&self.register)?;
        Arc::make_mut(&mut self.instructions).push(instruction);
        Ok(self)
    }

    /// True when both circuits share the same instruction storage.
    pub fn shares_instructions_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.instructions, &other.instructions)
    }

    // =========================================================================
    // Single-qudit gates
    // =========================================================================

    /// Apply a Givens rotation `R(θ, φ)` between two levels.
    pub fn r(
        &mut self,
        theta: f64,
        phi: f64,
        lev_a: usize,
        lev_b: usize,
        qudit: QuditId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qudit_gate(
            QuditGate::R {
                theta,
                phi,
                lev_a,
                lev_b,
            },
            qudit,
        ))
    }

    /// Apply a relative Z rotation between two levels.
    pub fn rz(&mut self, theta: f64, lev_a: usize, lev_b: usize, qudit: QuditId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qudit_gate(
            QuditGate::Rz {
                theta,
                lev_a,
                lev_b,
            },
            qudit,
        ))
    }

    /// Apply a phase to a single level.
    pub fn virtrz(&mut self, theta: f64, lev: usize, qudit: QuditId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qudit_gate(
            QuditGate::VirtRz { theta, lev },
            qudit,
        ))
    }

    /// Apply the qudit Fourier transform.
    pub fn h(&mut self, qudit: QuditId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qudit_gate(QuditGate::H, qudit))
    }

    /// Apply the cyclic level shift.
    pub fn x(&mut self, qudit: QuditId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qudit_gate(QuditGate::X, qudit))
    }

    // =========================================================================
    // Two-qudit gates
    // =========================================================================

    /// Apply a controlled exchange.
    pub fn cex(
        &mut self,
        ctrl_lev: usize,
        lev_a: usize,
        lev_b: usize,
        phi: f64,
        control: QuditId,
        target: QuditId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::two_qudit_gate(
            QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                phi,
            },
            control,
            target,
        ))
    }

    /// Apply a Mølmer–Sørensen interaction.
    pub fn ms(&mut self, theta: f64, q0: QuditId, q1: QuditId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qudit_gate(QuditGate::Ms { theta }, q0, q1))
    }

    /// Apply a controlled modular addition.
    pub fn csum(&mut self, control: QuditId, target: QuditId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qudit_gate(QuditGate::Csum, control, target))
    }

    /// Apply an arbitrary unitary.
    pub fn unitary(
        &mut self,
        name: impl Into<String>,
        matrix: UnitaryMatrix,
        qudits: impl IntoIterator<Item = QuditId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(
            QuditGate::Unitary {
                name: name.into(),
                matrix,
            },
            qudits,
        ))
    }

    /// Measure one qudit.
    pub fn measure(&mut self, qudit: QuditId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qudit))
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Overall unitary, applying instructions left to right.
    pub fn to_matrix(&self) -> IrResult<UnitaryMatrix> {
        let mut total = UnitaryMatrix::identity(self.register.total_dimension());
        for inst in self.instructions.iter() {
            total = inst.to_matrix(&self.register)?.compose(&total)?;
        }
        Ok(total)
    }

    /// Instruction counts by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in self.instructions.iter() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of instructions touching two or more qudits.
    pub fn multi_qudit_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|inst| inst.num_qudits() >= 2)
            .count()
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TryFrom<CircuitRepr> for Circuit {
    type Error = IrError;

    fn try_from(repr: CircuitRepr) -> IrResult<Self> {
        Circuit::with_register(repr.name, repr.dims).set_instructions(repr.instructions)
    }
}

impl From<Circuit> for CircuitRepr {
    fn from(circuit: Circuit) -> Self {
        CircuitRepr {
            name: circuit.name,
            dims: (*circuit.register).clone(),
            instructions: Arc::unwrap_or_clone(circuit.instructions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_builder_and_counts() {
        let mut circuit = Circuit::new("mixed", vec![2, 3]).unwrap();
        circuit
            .h(QuditId(1))
            .unwrap()
            .csum(QuditId(0), QuditId(1))
            .unwrap()
            .measure(QuditId(1))
            .unwrap();
        assert_eq!(circuit.len(), 3);
        assert_eq!(circuit.multi_qudit_count(), 1);
        assert_eq!(circuit.count_ops()["csum"], 1);
    }

    #[test]
    fn test_append_validates() {
        let mut circuit = Circuit::new("bad", vec![2]).unwrap();
        assert!(circuit.r(0.1, 0.0, 0, 2, QuditId(0)).is_err());
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_copy_on_write() {
        let mut original = Circuit::new("cow", vec![3]).unwrap();
        original.x(QuditId(0)).unwrap();
        let copy = original.copy();
        assert!(copy.shares_instructions_with(&original));

        original.x(QuditId(0)).unwrap();
        assert!(!copy.shares_instructions_with(&original));
        assert_eq!(copy.len(), 1);
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn test_set_instructions_leaves_original() {
        let mut circuit = Circuit::new("c", vec![3, 3]).unwrap();
        circuit.csum(QuditId(0), QuditId(1)).unwrap();
        let replaced = circuit
            .set_instructions(vec![Instruction::single_qudit_gate(QuditGate::H, QuditId(0))])
            .unwrap();
        assert_eq!(circuit.instructions()[0].name(), "csum");
        assert_eq!(replaced.instructions()[0].name(), "h");
        assert!(
            circuit
                .set_instructions(vec![Instruction::measure(QuditId(9))])
                .is_err()
        );
    }

    #[test]
    fn test_to_matrix_order() {
        // X then H is H·X, not X·H
        let mut circuit = Circuit::new("order", vec![3]).unwrap();
        circuit.x(QuditId(0)).unwrap().h(QuditId(0)).unwrap();
        let h = QuditGate::H.local_matrix(&[3]).unwrap();
        let x = QuditGate::X.local_matrix(&[3]).unwrap();
        assert!(
            circuit
                .to_matrix()
                .unwrap()
                .approx_eq(&h.compose(&x).unwrap(), 1e-12)
        );
    }

    #[test]
    fn test_x_cycles_back() {
        let mut circuit = Circuit::new("cycle", vec![4]).unwrap();
        for _ in 0..4 {
            circuit.x(QuditId(0)).unwrap();
        }
        assert!(
            circuit
                .to_matrix()
                .unwrap()
                .approx_eq(&UnitaryMatrix::identity(4), 1e-12)
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let mut circuit = Circuit::new("json", vec![2, 3]).unwrap();
        circuit
            .r(PI / 2.0, 0.1, 0, 1, QuditId(0))
            .unwrap()
            .cex(1, 0, 2, 0.3, QuditId(0), QuditId(1))
            .unwrap();
        let json = circuit.to_json().unwrap();
        let back = Circuit::from_json(&json).unwrap();
        assert_eq!(back, circuit);
    }

    #[test]
    fn test_json_rejects_invalid_instructions() {
        let json = r#"{"name": "bad", "dims": [2], "instructions": [
            {"kind": {"Gate": {"gate": "virtrz", "theta": 0.1, "lev": 3}}, "qudits": [0]}
        ]}"#;
        assert!(Circuit::from_json(json).is_err());
    }
}
