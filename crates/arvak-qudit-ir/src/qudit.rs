//! Qudit identifiers and register descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// Unique identifier for a qudit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuditId(pub u32);

impl QuditId {
    /// The position of this qudit in its register.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QuditId {
    fn from(id: u32) -> Self {
        QuditId(id)
    }
}

impl From<usize> for QuditId {
    fn from(id: usize) -> Self {
        QuditId(u32::try_from(id).expect("QuditId overflow: exceeds u32::MAX"))
    }
}

/// The dimensions of the qudit lines of a circuit.
///
/// Qudit 0 is the most significant digit of a basis index, so the basis
/// state `|a, b⟩` of a `[d0, d1]` register has index `a * d1 + b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct QuditRegister {
    dims: Vec<usize>,
}

impl QuditRegister {
    /// Create a register from per-qudit dimensions.
    pub fn new(dims: impl Into<Vec<usize>>) -> IrResult<Self> {
        let dims = dims.into();
        if dims.is_empty() {
            return Err(IrError::EmptyRegister);
        }
        if let Some(&bad) = dims.iter().find(|&&d| d < 2) {
            return Err(IrError::InvalidDimension(bad));
        }
        Ok(Self { dims })
    }

    /// Per-qudit dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of qudits.
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    /// Always false: registers are never empty.
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Dimension of a single qudit.
    pub fn dimension_of(&self, qudit: QuditId) -> IrResult<usize> {
        self.dims
            .get(qudit.index())
            .copied()
            .ok_or(IrError::QuditNotFound {
                qudit,
                gate_name: None,
            })
    }

    /// Dimension of the whole Hilbert space.
    pub fn total_dimension(&self) -> usize {
        self.dims.iter().product()
    }

    /// Iterate over all qudit ids.
    pub fn qudits(&self) -> impl Iterator<Item = QuditId> + '_ {
        (0..self.dims.len()).map(QuditId::from)
    }

    /// Sub-register made of the given qudits, in the given order.
    pub fn select(&self, qudits: &[QuditId]) -> IrResult<Self> {
        let dims = qudits
            .iter()
            .map(|&q| self.dimension_of(q))
            .collect::<IrResult<Vec<_>>>()?;
        Self::new(dims)
    }
}

impl TryFrom<Vec<usize>> for QuditRegister {
    type Error = IrError;

    fn try_from(dims: Vec<usize>) -> IrResult<Self> {
        Self::new(dims)
    }
}

impl From<QuditRegister> for Vec<usize> {
    fn from(register: QuditRegister) -> Self {
        register.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_dimensions() {
        let reg = QuditRegister::new(vec![2, 3, 4]).unwrap();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.total_dimension(), 24);
        assert_eq!(reg.dimension_of(QuditId(1)).unwrap(), 3);
        assert!(reg.dimension_of(QuditId(3)).is_err());
    }

    #[test]
    fn test_register_rejects_bad_dims() {
        assert!(matches!(
            QuditRegister::new(vec![2, 1]),
            Err(IrError::InvalidDimension(1))
        ));
        assert!(matches!(
            QuditRegister::new(Vec::new()),
            Err(IrError::EmptyRegister)
        ));
    }

    #[test]
    fn test_register_select() {
        let reg = QuditRegister::new(vec![2, 3, 4]).unwrap();
        let sub = reg.select(&[QuditId(2), QuditId(0)]).unwrap();
        assert_eq!(sub.dims(), &[4, 2]);
    }

    #[test]
    fn test_register_serde_validates() {
        let reg: QuditRegister = serde_json::from_str("[3, 3]").unwrap();
        assert_eq!(reg.dims(), &[3, 3]);
        assert!(serde_json::from_str::<QuditRegister>("[3, 0]").is_err());
    }

    #[test]
    fn test_qudit_display() {
        assert_eq!(QuditId(7).to_string(), "q7");
    }
}
