//! Circuit instructions combining gates with operands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::QuditGate;
use crate::qudit::{QuditId, QuditRegister};
use crate::unitary::UnitaryMatrix;

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A gate operation.
    Gate(QuditGate),
    /// Measurement in the computational basis.
    Measure,
}

/// Extra control qudits attached to an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlData {
    /// Control qudits.
    pub qudits: Vec<QuditId>,
    /// Level each control must sit on, one per control qudit.
    pub levels: Vec<usize>,
}

impl ControlData {
    /// Pair up control qudits with their levels.
    pub fn new(qudits: Vec<QuditId>, levels: Vec<usize>) -> IrResult<Self> {
        if qudits.len() != levels.len() {
            return Err(IrError::InvalidControl(format!(
                "{} control qudits but {} control levels",
                qudits.len(),
                levels.len()
            )));
        }
        Ok(Self { qudits, levels })
    }

    /// Number of controls.
    pub fn len(&self) -> usize {
        self.qudits.len()
    }

    /// True when there are no controls.
    pub fn is_empty(&self) -> bool {
        self.qudits.is_empty()
    }
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Target qudits, first one most significant.
    pub qudits: Vec<QuditId>,
    /// Optional extra controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<ControlData>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: QuditGate, qudits: impl IntoIterator<Item = QuditId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qudits: qudits.into_iter().collect(),
            controls: None,
        }
    }

    /// Create a single-qudit gate instruction.
    pub fn single_qudit_gate(gate: QuditGate, qudit: QuditId) -> Self {
        Self::gate(gate, [qudit])
    }

    /// Create a two-qudit gate instruction.
    pub fn two_qudit_gate(gate: QuditGate, q0: QuditId, q1: QuditId) -> Self {
        Self::gate(gate, [q0, q1])
    }

    /// Create a measurement instruction.
    pub fn measure(qudit: QuditId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qudits: vec![qudit],
            controls: None,
        }
    }

    /// A copy of this instruction with additional controls.
    ///
    /// Controls already present are kept; new ones are appended.
    pub fn with_controls(&self, controls: ControlData) -> Self {
        let merged = match &self.controls {
            Some(existing) => {
                let mut merged = existing.clone();
                merged.qudits.extend(controls.qudits);
                merged.levels.extend(controls.levels);
                merged
            }
            None => controls,
        };
        Self {
            controls: (!merged.is_empty()).then_some(merged),
            ..self.clone()
        }
    }

    /// The gate, if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&QuditGate> {
        match &self.kind {
            InstructionKind::Gate(gate) => Some(gate),
            InstructionKind::Measure => None,
        }
    }

    /// Instruction name.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(gate) => gate.name(),
            InstructionKind::Measure => "measure",
        }
    }

    /// Numeric parameters of the gate (empty for measurements).
    pub fn params(&self) -> Vec<f64> {
        self.as_gate().map(QuditGate::params).unwrap_or_default()
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// True when extra controls are attached.
    pub fn is_controlled(&self) -> bool {
        self.controls.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Targets followed by controls.
    pub fn all_qudits(&self) -> Vec<QuditId> {
        let mut all = self.qudits.clone();
        if let Some(controls) = &self.controls {
            all.extend(controls.qudits.iter().copied());
        }
        all
    }

    /// Number of distinct qudits touched.
    pub fn num_qudits(&self) -> usize {
        self.qudits.len() + self.controls.as_ref().map_or(0, ControlData::len)
    }

    /// Check operands against a register.
    pub fn validate(&self, register: &QuditRegister) -> IrResult<()> {
        let gate_name = || Some(self.name().to_string());
        let all = self.all_qudits();
        for (i, &q) in all.iter().enumerate() {
            if q.index() >= register.len() {
                return Err(IrError::QuditNotFound {
                    qudit: q,
                    gate_name: gate_name(),
                });
            }
            if all[..i].contains(&q) {
                return Err(IrError::DuplicateQudit {
                    qudit: q,
                    gate_name: gate_name(),
                });
            }
        }
        if let Some(controls) = &self.controls {
            if controls.qudits.len() != controls.levels.len() {
                return Err(IrError::InvalidControl(format!(
                    "'{}' has {} control qudits but {} control levels",
                    self.name(),
                    controls.qudits.len(),
                    controls.levels.len()
                )));
            }
            for (&q, &level) in controls.qudits.iter().zip(&controls.levels) {
                let dimension = register.dimension_of(q)?;
                if level >= dimension {
                    return Err(IrError::LevelOutOfRange {
                        gate_name: self.name().to_string(),
                        level,
                        dimension,
                    });
                }
            }
        }
        match &self.kind {
            InstructionKind::Gate(gate) => {
                if self.qudits.is_empty() {
                    return Err(IrError::QuditCountMismatch {
                        gate_name: self.name().to_string(),
                        expected: gate.num_qudits().unwrap_or(1),
                        got: 0,
                    });
                }
                let dims = register.select(&self.qudits)?;
                gate.check_levels(dims.dims())
            }
            InstructionKind::Measure => {
                if self.qudits.len() != 1 || self.is_controlled() {
                    return Err(IrError::QuditCountMismatch {
                        gate_name: "measure".into(),
                        expected: 1,
                        got: self.num_qudits(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Matrix of the gate over its targets only, ignoring controls.
    pub fn local_matrix(&self, register: &QuditRegister) -> IrResult<UnitaryMatrix> {
        let gate = self
            .as_gate()
            .ok_or_else(|| IrError::NonUnitaryInstruction(self.name().to_string()))?;
        let dims = register.select(&self.qudits)?;
        gate.local_matrix(dims.dims())
    }

    /// Full-register matrix, with identities on untouched qudits.
    pub fn to_matrix(&self, register: &QuditRegister) -> IrResult<UnitaryMatrix> {
        self.validate(register)?;
        let local = self.local_matrix(register)?;
        let targets: Vec<usize> = self.qudits.iter().map(|q| q.index()).collect();
        let controls: Vec<(usize, usize)> = self
            .controls
            .as_ref()
            .map(|c| {
                c.qudits
                    .iter()
                    .zip(&c.levels)
                    .map(|(q, &level)| (q.index(), level))
                    .collect()
            })
            .unwrap_or_default();
        local.embed(register.dims(), &targets, &controls)
    }

    /// The inverse instruction on the same operands.
    pub fn dagger(&self, register: &QuditRegister) -> IrResult<Self> {
        let gate = self
            .as_gate()
            .ok_or_else(|| IrError::NonUnitaryInstruction(self.name().to_string()))?;
        let dims = register.select(&self.qudits)?;
        Ok(Self {
            kind: InstructionKind::Gate(gate.dagger(dims.dims())?),
            ..self.clone()
        })
    }

    /// Same instruction with every qudit passed through `map`.
    pub fn remap(&self, map: impl Fn(QuditId) -> QuditId) -> Self {
        Self {
            kind: self.kind.clone(),
            qudits: self.qudits.iter().map(|&q| map(q)).collect(),
            controls: self.controls.as_ref().map(|c| ControlData {
                qudits: c.qudits.iter().map(|&q| map(q)).collect(),
                levels: c.levels.clone(),
            }),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InstructionKind::Gate(gate) => write!(f, "{gate}")?,
            InstructionKind::Measure => f.write_str("measure")?,
        }
        for q in &self.qudits {
            write!(f, " {q}")?;
        }
        if let Some(controls) = &self.controls {
            for (q, level) in controls.qudits.iter().zip(&controls.levels) {
                write!(f, " ctrl({q}={level})")?;
            }
        }
        Ok(())
    }
}
