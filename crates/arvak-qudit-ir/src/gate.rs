//! Qudit gate types.

use std::f64::consts::{PI, TAU};
use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::unitary::UnitaryMatrix;

/// Period of two-level rotation angles (`R`, `Rz`, `Ms`).
pub const ROTATION_PERIOD: f64 = 2.0 * TAU;
/// Period of phases and virtual Z angles.
pub const PHASE_PERIOD: f64 = TAU;

/// Coarse classification of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateCategory {
    /// Rotation acting on one qudit.
    SingleQuditRotation,
    /// Physically realizable two-qudit pulse.
    TwoQuditNative,
    /// Anything else; must be compiled away.
    Generic,
}

/// Gates over multi-level qudits.
///
/// Levels are zero-based. Two-qudit gates act on `[first, second]` with the
/// first qudit as the more significant digit (and as the control where the
/// gate has one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "lowercase")]
pub enum QuditGate {
    /// Givens rotation `R(θ, φ)` between levels `lev_a` and `lev_b`.
    R {
        /// Rotation angle.
        theta: f64,
        /// Rotation axis phase.
        phi: f64,
        /// First level.
        lev_a: usize,
        /// Second level.
        lev_b: usize,
    },
    /// Relative Z rotation between two levels.
    Rz {
        /// Rotation angle.
        theta: f64,
        /// First level.
        lev_a: usize,
        /// Second level.
        lev_b: usize,
    },
    /// Phase `e^{-iθ}` on a single level.
    VirtRz {
        /// Phase angle.
        theta: f64,
        /// Level that picks up the phase.
        lev: usize,
    },
    /// Controlled exchange: `R(π, φ)` on the target's `lev_a`/`lev_b` when
    /// the control sits on `ctrl_lev`.
    CEx {
        /// Control level on the first qudit.
        ctrl_lev: usize,
        /// First target level.
        lev_a: usize,
        /// Second target level.
        lev_b: usize,
        /// Exchange phase.
        phi: f64,
    },
    /// Mølmer–Sørensen `exp(-iθ/2 · X₀₁⊗X₀₁)`.
    Ms {
        /// Interaction angle.
        theta: f64,
    },
    /// Qudit Fourier transform.
    H,
    /// Cyclic level shift `|k⟩ → |k+1 mod d⟩`.
    X,
    /// Controlled modular addition `|a, b⟩ → |a, a+b mod d⟩`.
    Csum,
    /// Arbitrary unitary of any arity.
    Unitary {
        /// Display name.
        name: String,
        /// Matrix over the targets, first target most significant.
        matrix: UnitaryMatrix,
    },
}

impl QuditGate {
    /// Gate name, as used by native gate sets.
    pub fn name(&self) -> &str {
        match self {
            QuditGate::R { .. } => "r",
            QuditGate::Rz { .. } => "rz",
            QuditGate::VirtRz { .. } => "virtrz",
            QuditGate::CEx { .. } => "cex",
            QuditGate::Ms { .. } => "ms",
            QuditGate::H => "h",
            QuditGate::X => "x",
            QuditGate::Csum => "csum",
            QuditGate::Unitary { name, .. } => name,
        }
    }

    /// The gate's category.
    pub fn category(&self) -> GateCategory {
        match self {
            QuditGate::R { .. } | QuditGate::Rz { .. } | QuditGate::VirtRz { .. } => {
                GateCategory::SingleQuditRotation
            }
            QuditGate::CEx { .. } | QuditGate::Ms { .. } => GateCategory::TwoQuditNative,
            QuditGate::H | QuditGate::X | QuditGate::Csum | QuditGate::Unitary { .. } => {
                GateCategory::Generic
            }
        }
    }

    /// True for user-supplied matrices.
    pub fn is_custom(&self) -> bool {
        matches!(self, QuditGate::Unitary { .. })
    }

    /// Number of target qudits, or `None` for arbitrary-arity unitaries.
    pub fn num_qudits(&self) -> Option<usize> {
        match self {
            QuditGate::R { .. }
            | QuditGate::Rz { .. }
            | QuditGate::VirtRz { .. }
            | QuditGate::H
            | QuditGate::X => Some(1),
            QuditGate::CEx { .. } | QuditGate::Ms { .. } | QuditGate::Csum => Some(2),
            QuditGate::Unitary { .. } => None,
        }
    }

    /// Numeric parameters, in declaration order.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            QuditGate::R { theta, phi, .. } => vec![theta, phi],
            QuditGate::Rz { theta, .. }
            | QuditGate::VirtRz { theta, .. }
            | QuditGate::Ms { theta } => vec![theta],
            QuditGate::CEx { phi, .. } => vec![phi],
            _ => vec![],
        }
    }

    /// Reduce every angle modulo its period.
    pub fn canonicalize(&self) -> Self {
        match *self {
            QuditGate::R {
                theta,
                phi,
                lev_a,
                lev_b,
            } => QuditGate::R {
                theta: wrap(theta, ROTATION_PERIOD),
                phi: wrap(phi, PHASE_PERIOD),
                lev_a,
                lev_b,
            },
            QuditGate::Rz {
                theta,
                lev_a,
                lev_b,
            } => QuditGate::Rz {
                theta: wrap(theta, ROTATION_PERIOD),
                lev_a,
                lev_b,
            },
            QuditGate::VirtRz { theta, lev } => QuditGate::VirtRz {
                theta: wrap(theta, PHASE_PERIOD),
                lev,
            },
            QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                phi,
            } => QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                phi: wrap(phi, PHASE_PERIOD),
            },
            QuditGate::Ms { theta } => QuditGate::Ms {
                theta: wrap(theta, ROTATION_PERIOD),
            },
            _ => self.clone(),
        }
    }

    /// True when the gate is the identity up to `tolerance` in its angle.
    pub fn is_identity(&self, tolerance: f64) -> bool {
        let near_zero = |x: f64, period: f64| {
            let w = wrap(x, period);
            w < tolerance || period - w < tolerance
        };
        match *self {
            QuditGate::R { theta, .. } | QuditGate::Rz { theta, .. } | QuditGate::Ms { theta } => {
                near_zero(theta, ROTATION_PERIOD)
            }
            QuditGate::VirtRz { theta, .. } => near_zero(theta, PHASE_PERIOD),
            _ => false,
        }
    }

    /// Check that every level the gate names fits `dims`.
    pub fn check_levels(&self, dims: &[usize]) -> IrResult<()> {
        if let Some(expected) = self.num_qudits() {
            if dims.len() != expected {
                return Err(IrError::QuditCountMismatch {
                    gate_name: self.name().to_string(),
                    expected,
                    got: dims.len(),
                });
            }
        }
        match *self {
            QuditGate::R { lev_a, lev_b, .. } | QuditGate::Rz { lev_a, lev_b, .. } => {
                self.check_pair(lev_a, lev_b, dims[0])
            }
            QuditGate::VirtRz { lev, .. } => self.check_level(lev, dims[0]),
            QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                ..
            } => {
                self.check_level(ctrl_lev, dims[0])?;
                self.check_pair(lev_a, lev_b, dims[1])
            }
            QuditGate::Unitary { ref matrix, .. } => {
                let expected: usize = dims.iter().product();
                if dims.is_empty() || matrix.dim() != expected {
                    return Err(IrError::DimensionMismatch {
                        operation: "unitary gate",
                        left: matrix.dim(),
                        right: expected,
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Matrix over the gate's own targets, first target most significant.
    pub fn local_matrix(&self, dims: &[usize]) -> IrResult<UnitaryMatrix> {
        self.check_levels(dims)?;
        let matrix = match *self {
            QuditGate::R {
                theta,
                phi,
                lev_a,
                lev_b,
            } => r_matrix(dims[0], lev_a, lev_b, theta, phi),
            QuditGate::Rz {
                theta,
                lev_a,
                lev_b,
            } => rz_matrix(dims[0], lev_a, lev_b, theta),
            QuditGate::VirtRz { theta, lev } => virtrz_matrix(dims[0], lev, theta),
            QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                phi,
            } => r_matrix(dims[1], lev_a, lev_b, PI, phi).embed(dims, &[1], &[(0, ctrl_lev)])?,
            QuditGate::Ms { theta } => {
                let xx = x01(dims[0]).tensor(&x01(dims[1]));
                UnitaryMatrix::expm(xx.as_array(), Complex64::new(0.0, -theta / 2.0))?
            }
            QuditGate::H => fourier_matrix(dims[0]),
            QuditGate::X => shift_matrix(dims[0]),
            QuditGate::Csum => csum_matrix(dims[0], dims[1]),
            QuditGate::Unitary { ref matrix, .. } => matrix.clone(),
        };
        Ok(matrix)
    }

    /// The inverse gate.
    ///
    /// Native gates invert analytically; generic gates become a named
    /// [`QuditGate::Unitary`] holding the conjugate transpose.
    pub fn dagger(&self, dims: &[usize]) -> IrResult<Self> {
        let inverse = match *self {
            QuditGate::R {
                theta,
                phi,
                lev_a,
                lev_b,
            } => QuditGate::R {
                theta: -theta,
                phi,
                lev_a,
                lev_b,
            },
            QuditGate::Rz {
                theta,
                lev_a,
                lev_b,
            } => QuditGate::Rz {
                theta: -theta,
                lev_a,
                lev_b,
            },
            QuditGate::VirtRz { theta, lev } => QuditGate::VirtRz { theta: -theta, lev },
            QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                phi,
            } => QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                phi: phi + PI,
            },
            QuditGate::Ms { theta } => QuditGate::Ms { theta: -theta },
            _ => {
                let matrix = self.local_matrix(dims)?.dagger();
                let name = match self.name().strip_suffix("_dg") {
                    Some(base) => base.to_string(),
                    None => format!("{}_dg", self.name()),
                };
                QuditGate::Unitary { name, matrix }
            }
        };
        Ok(inverse.canonicalize())
    }

    fn check_level(&self, level: usize, dimension: usize) -> IrResult<()> {
        if level >= dimension {
            return Err(IrError::LevelOutOfRange {
                gate_name: self.name().to_string(),
                level,
                dimension,
            });
        }
        Ok(())
    }

    fn check_pair(&self, lev_a: usize, lev_b: usize, dimension: usize) -> IrResult<()> {
        if lev_a == lev_b {
            return Err(IrError::InvalidLevels {
                gate_name: self.name().to_string(),
                lev_a,
                lev_b,
            });
        }
        self.check_level(lev_a, dimension)?;
        self.check_level(lev_b, dimension)
    }
}

impl fmt::Display for QuditGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            QuditGate::R {
                theta,
                phi,
                lev_a,
                lev_b,
            } => write!(f, "r({theta:.6}, {phi:.6})[{lev_a},{lev_b}]"),
            QuditGate::Rz {
                theta,
                lev_a,
                lev_b,
            } => write!(f, "rz({theta:.6})[{lev_a},{lev_b}]"),
            QuditGate::VirtRz { theta, lev } => write!(f, "virtrz({theta:.6})[{lev}]"),
            QuditGate::CEx {
                ctrl_lev,
                lev_a,
                lev_b,
                phi,
            } => write!(f, "cex({phi:.6})[{ctrl_lev}; {lev_a},{lev_b}]"),
            QuditGate::Ms { theta } => write!(f, "ms({theta:.6})"),
            _ => f.write_str(self.name()),
        }
    }
}

/// `x` reduced into `[0, period)`.
pub fn wrap(x: f64, period: f64) -> f64 {
    let w = x.rem_euclid(period);
    // rem_euclid can round up to exactly `period` for tiny negative inputs
    if w >= period { 0.0 } else { w }
}

/// `R(θ, φ)` on levels `a`, `b` of a `dim`-level qudit.
pub fn r_matrix(dim: usize, a: usize, b: usize, theta: f64, phi: f64) -> UnitaryMatrix {
    let (s, c) = (theta / 2.0).sin_cos();
    let mut m = Array2::<Complex64>::eye(dim);
    let minus_i = Complex64::new(0.0, -1.0);
    m[[a, a]] = Complex64::new(c, 0.0);
    m[[b, b]] = Complex64::new(c, 0.0);
    m[[a, b]] = minus_i * Complex64::from_polar(s, -phi);
    m[[b, a]] = minus_i * Complex64::from_polar(s, phi);
    wrap_matrix(m)
}

/// `Rz(θ)` on levels `a`, `b`: `e^{-iθ/2}` on `a`, `e^{iθ/2}` on `b`.
pub fn rz_matrix(dim: usize, a: usize, b: usize, theta: f64) -> UnitaryMatrix {
    let mut diag = vec![Complex64::new(1.0, 0.0); dim];
    diag[a] = Complex64::from_polar(1.0, -theta / 2.0);
    diag[b] = Complex64::from_polar(1.0, theta / 2.0);
    UnitaryMatrix::diagonal(&diag)
}

/// Phase `e^{-iθ}` on a single level.
pub fn virtrz_matrix(dim: usize, lev: usize, theta: f64) -> UnitaryMatrix {
    let mut diag = vec![Complex64::new(1.0, 0.0); dim];
    diag[lev] = Complex64::from_polar(1.0, -theta);
    UnitaryMatrix::diagonal(&diag)
}

/// Pauli X on levels 0 and 1, zero elsewhere (not unitary for `dim > 2`).
pub fn x01(dim: usize) -> UnitaryMatrix {
    let mut m = Array2::<Complex64>::zeros((dim, dim));
    m[[0, 1]] = Complex64::new(1.0, 0.0);
    m[[1, 0]] = Complex64::new(1.0, 0.0);
    wrap_matrix(m)
}

fn fourier_matrix(dim: usize) -> UnitaryMatrix {
    let norm = 1.0 / (dim as f64).sqrt();
    let m = Array2::from_shape_fn((dim, dim), |(j, k)| {
        let angle = TAU * ((j * k) % dim) as f64 / dim as f64;
        Complex64::from_polar(norm, angle)
    });
    wrap_matrix(m)
}

fn shift_matrix(dim: usize) -> UnitaryMatrix {
    let mut m = Array2::<Complex64>::zeros((dim, dim));
    for k in 0..dim {
        m[[(k + 1) % dim, k]] = Complex64::new(1.0, 0.0);
    }
    wrap_matrix(m)
}

fn csum_matrix(d_ctrl: usize, d_target: usize) -> UnitaryMatrix {
    let total = d_ctrl * d_target;
    let mut m = Array2::<Complex64>::zeros((total, total));
    for a in 0..d_ctrl {
        for b in 0..d_target {
            m[[a * d_target + (a + b) % d_target, a * d_target + b]] = Complex64::new(1.0, 0.0);
        }
    }
    wrap_matrix(m)
}

fn wrap_matrix(m: Array2<Complex64>) -> UnitaryMatrix {
    UnitaryMatrix::from_square(m)
}
