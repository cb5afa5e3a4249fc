//! Layered variational compiler.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use arvak_qudit_ir::{Circuit, Instruction, IrError, QuditId, UnitaryMatrix};

use super::ansatz::Ansatz;
use super::optimizer::{Adam, NelderMead, OptimizationResult, Optimizer};
use crate::config::{NativeFamily, OptimizerKind, SynthesisConfig};
use crate::error::{CompileError, CompileResult};
use crate::generators::{LOCAL_FIRST, generator_for};

/// A two-qudit unitary to synthesize.
#[derive(Debug, Clone)]
pub struct SynthesisTarget {
    matrix: UnitaryMatrix,
    dims: (usize, usize),
}

impl SynthesisTarget {
    /// Target from a matrix over a qudit pair of dimensions `dims`.
    ///
    /// The size is checked when compiling.
    pub fn new(matrix: UnitaryMatrix, dims: (usize, usize)) -> Self {
        Self { matrix, dims }
    }

    /// Target realized by a two-qudit circuit.
    pub fn from_circuit(circuit: &Circuit) -> CompileResult<Self> {
        if circuit.num_qudits() != 2 {
            return Err(IrError::QuditCountMismatch {
                gate_name: circuit.name().to_string(),
                expected: 2,
                got: circuit.num_qudits(),
            }
            .into());
        }
        let dims = (circuit.dims()[0], circuit.dims()[1]);
        Ok(Self::new(circuit.to_matrix()?, dims))
    }

    /// The target matrix.
    pub fn matrix(&self) -> &UnitaryMatrix {
        &self.matrix
    }

    /// Qudit pair dimensions.
    pub fn dims(&self) -> (usize, usize) {
        self.dims
    }
}

/// Output of a successful synthesis.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisResult {
    /// Native instructions on local qudits 0 and 1, in execution order.
    pub instructions: Vec<Instruction>,
    /// Achieved distance to the target.
    pub distance: f64,
    /// Number of entangling layers used.
    pub layers: usize,
    /// Entangling family used.
    pub family: NativeFamily,
    /// Optimized ansatz parameters as the optimizer left them, not reduced
    /// modulo their period; the emitted instructions carry reduced angles.
    pub params: Vec<f64>,
    /// Best distance reached at each layer count up to `layers`.
    pub layer_distances: Vec<f64>,
}

impl SynthesisResult {
    /// Instructions moved onto the given circuit qudits.
    pub fn remapped(&self, first: QuditId, second: QuditId) -> Vec<Instruction> {
        self.instructions
            .iter()
            .map(|inst| inst.remap(|q| if q == LOCAL_FIRST { first } else { second }))
            .collect()
    }

    /// Two-qudit circuit of the result.
    pub fn to_circuit(&self, dims: (usize, usize)) -> CompileResult<Circuit> {
        let circuit = Circuit::new("synthesized", vec![dims.0, dims.1])?;
        Ok(circuit.set_instructions(self.instructions.clone())?)
    }
}

/// Best outcome of one restart.
#[derive(Debug, Clone)]
struct Restart {
    index: usize,
    distance: f64,
    params: Vec<f64>,
}

/// Linear search over the number of entangling layers.
///
/// For each layer count `k = 1..=max_layers`, `restarts` local optimizations
/// run from deterministic seeds; restart 0 resumes from the best `k − 1`
/// solution with an identity layer appended. The first `k` whose best
/// distance is within tolerance wins.
#[derive(Debug, Clone, Default)]
pub struct LayeredCompiler {
    config: SynthesisConfig,
}

impl LayeredCompiler {
    /// Compiler with the given configuration.
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize `target` with the configured family.
    pub fn compile(
        &self,
        target: &UnitaryMatrix,
        dims: (usize, usize),
    ) -> CompileResult<SynthesisResult> {
        self.compile_with_family(target, dims, self.config.family)
    }

    /// Synthesize `target` with an explicit entangling family.
    #[instrument(skip(self, target), fields(tolerance = self.config.tolerance))]
    pub fn compile_with_family(
        &self,
        target: &UnitaryMatrix,
        dims: (usize, usize),
        family: NativeFamily,
    ) -> CompileResult<SynthesisResult> {
        self.config.validate()?;
        let expected = dims.0 * dims.1;
        if target.dim() != expected {
            return Err(IrError::DimensionMismatch {
                operation: "variational_compile",
                left: target.dim(),
                right: expected,
            }
            .into());
        }

        let generator = generator_for(family, dims)?;
        let tolerance = self.config.tolerance.max(0.0);
        let mut best_distance = f64::INFINITY;
        let mut layer_distances = Vec::with_capacity(self.config.max_layers);
        let mut warm: Option<Vec<f64>> = None;

        for layers in 1..=self.config.max_layers {
            let ansatz = Ansatz::new(generator.as_ref(), layers);
            let Some(best) = self.search(&ansatz, target, warm.as_deref()) else {
                warn!(layers, "Every restart diverged");
                layer_distances.push(f64::INFINITY);
                continue;
            };
            debug!(
                layers,
                distance = best.distance,
                restart = best.index,
                "Layer count finished"
            );
            best_distance = best_distance.min(best.distance);
            layer_distances.push(best.distance);

            if best.distance <= tolerance {
                let instructions = ansatz.instructions(&best.params)?;
                info!(
                    layers,
                    distance = best.distance,
                    gates = instructions.len(),
                    "Synthesized with {} {} layers",
                    layers,
                    family
                );
                return Ok(SynthesisResult {
                    instructions,
                    distance: best.distance,
                    layers,
                    family,
                    params: best.params,
                    layer_distances,
                });
            }
            warm = Some(best.params);
        }

        Err(CompileError::SynthesisUnreachable {
            best_distance,
            layers: self.config.max_layers,
            tolerance: self.config.tolerance,
            layer_distances,
        })
    }

    fn search(
        &self,
        ansatz: &Ansatz<'_>,
        target: &UnitaryMatrix,
        warm: Option<&[f64]>,
    ) -> Option<Restart> {
        let layers = ansatz.layers();
        let num_params = ansatz.num_params();
        // Bit patterns of non-negative floats order like the floats
        let best_so_far = AtomicU64::new(f64::INFINITY.to_bits());

        let run = |index: usize| -> Option<Restart> {
            let initial = match (index, warm) {
                (0, Some(previous)) => {
                    let mut params = previous.to_vec();
                    params.resize(num_params, 0.0);
                    params
                }
                _ => random_params(num_params, restart_seed(self.config.seed, layers, index)),
            };
            let objective = |params: &[f64]| {
                ansatz
                    .unitary(params)
                    .ok()
                    .and_then(|u| u.distance(target).ok())
                    .unwrap_or(f64::NAN)
            };
            let result = self.minimize(objective, initial);
            if !result.optimal_value.is_finite() {
                warn!(layers, restart = index, "Discarding restart with non-finite objective");
                return None;
            }
            best_so_far.fetch_min(result.optimal_value.to_bits(), Ordering::Relaxed);
            debug!(
                layers,
                restart = index,
                distance = result.optimal_value,
                iterations = result.num_iterations,
                best = f64::from_bits(best_so_far.load(Ordering::Relaxed)),
                "Restart finished"
            );
            Some(Restart {
                index,
                distance: result.optimal_value,
                params: result.optimal_params,
            })
        };

        let outcomes: Vec<Option<Restart>> = if self.config.parallel {
            (0..self.config.restarts).into_par_iter().map(run).collect()
        } else {
            (0..self.config.restarts).map(run).collect()
        };

        outcomes.into_iter().flatten().min_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.index.cmp(&b.index))
        })
    }

    fn minimize<F>(&self, objective: F, initial: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let target = self.config.tolerance;
        match self.config.optimizer {
            OptimizerKind::Adam => Adam::new()
                .with_maxiter(self.config.max_iterations)
                .with_learning_rate(self.config.learning_rate)
                .with_target(target)
                .minimize(objective, initial),
            OptimizerKind::NelderMead => NelderMead::new()
                .with_maxiter(self.config.max_iterations)
                .with_target(target)
                .minimize(objective, initial),
        }
    }
}

/// Synthesize `target` to within `tolerance` using at most `max_layers`
/// entangling layers of `family`, with default search settings otherwise.
pub fn variational_compile(
    target: &SynthesisTarget,
    tolerance: f64,
    family: NativeFamily,
    max_layers: usize,
) -> CompileResult<SynthesisResult> {
    let config = SynthesisConfig::default()
        .with_tolerance(tolerance)
        .with_max_layers(max_layers)
        .with_family(family);
    LayeredCompiler::new(config).compile(target.matrix(), target.dims())
}

fn restart_seed(seed: u64, layers: usize, restart: usize) -> u64 {
    seed ^ (layers as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (restart as u64 + 1).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

fn random_params(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI))
        .collect()
}
