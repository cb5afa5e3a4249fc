//! Local optimizers for the variational search.
//!
//! Both optimizers minimize a scalar objective over an unconstrained
//! parameter vector, stop early once the objective reaches a target value,
//! and report the best point seen (never worse than the starting point).

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best parameter values found.
    pub optimal_params: Vec<f64>,
    /// Objective at `optimal_params`; non-finite if the run blew up.
    pub optimal_value: f64,
    /// Number of function evaluations.
    pub num_evaluations: usize,
    /// Number of iterations.
    pub num_iterations: usize,
    /// Whether the target value was reached.
    pub converged: bool,
}

/// A local minimizer.
pub trait Optimizer {
    /// Minimize `objective` starting from `initial_params`.
    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64;
}

/// Adam on a central finite-difference gradient.
///
/// The step size decays geometrically every `decay_every` iterations, and
/// the run stops after `patience` iterations without improvement.
#[derive(Debug, Clone)]
pub struct Adam {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Initial step size.
    pub learning_rate: f64,
    /// First moment decay.
    pub beta1: f64,
    /// Second moment decay.
    pub beta2: f64,
    /// Denominator regularizer.
    pub epsilon: f64,
    /// Finite-difference step.
    pub fd_step: f64,
    /// Step size multiplier applied every `decay_every` iterations.
    pub decay: f64,
    /// Iterations between step size decays.
    pub decay_every: usize,
    /// Iterations without improvement before giving up.
    pub patience: usize,
    /// Stop as soon as the objective is at most this value.
    pub target: f64,
}

impl Default for Adam {
    fn default() -> Self {
        Self {
            maxiter: 600,
            learning_rate: 0.08,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            fd_step: 1e-6,
            decay: 0.6,
            decay_every: 100,
            patience: 80,
            target: f64::NEG_INFINITY,
        }
    }
}

impl Adam {
    /// Create a new Adam optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the initial step size.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the early-stop target.
    #[must_use]
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }
}

impl Optimizer for Adam {
    fn minimize<F>(&self, mut objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let mut x = initial_params;
        let mut best_value = objective(&x);
        let mut best_params = x.clone();
        let mut num_evaluations = 1;
        let mut num_iterations = 0;

        if !best_value.is_finite() || best_value <= self.target || n == 0 {
            return OptimizationResult {
                converged: best_value <= self.target,
                optimal_params: best_params,
                optimal_value: best_value,
                num_evaluations,
                num_iterations,
            };
        }

        let mut m = vec![0.0; n];
        let mut v = vec![0.0; n];
        let mut grad = vec![0.0; n];
        let mut stall = 0;
        let h = self.fd_step;

        for t in 1..=self.maxiter {
            num_iterations = t;

            for i in 0..n {
                let xi = x[i];
                x[i] = xi + h;
                let f_plus = objective(&x);
                x[i] = xi - h;
                let f_minus = objective(&x);
                x[i] = xi;
                grad[i] = (f_plus - f_minus) / (2.0 * h);
            }
            num_evaluations += 2 * n;
            if grad.iter().any(|g| !g.is_finite()) {
                best_value = f64::NAN;
                break;
            }

            let lr = self.learning_rate * self.decay.powi((t / self.decay_every.max(1)) as i32);
            let bias1 = 1.0 - self.beta1.powi(t as i32);
            let bias2 = 1.0 - self.beta2.powi(t as i32);
            for i in 0..n {
                m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * grad[i];
                v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * grad[i] * grad[i];
                let m_hat = m[i] / bias1;
                let v_hat = v[i] / bias2;
                x[i] -= lr * m_hat / (v_hat.sqrt() + self.epsilon);
            }

            let value = objective(&x);
            num_evaluations += 1;
            if !value.is_finite() {
                best_value = value;
                break;
            }

            if value < best_value - 1e-14 {
                best_value = value;
                best_params.copy_from_slice(&x);
                stall = 0;
            } else {
                stall += 1;
                if stall >= self.patience {
                    break;
                }
            }

            if best_value <= self.target {
                break;
            }
        }

        OptimizationResult {
            converged: best_value <= self.target,
            optimal_params: best_params,
            optimal_value: best_value,
            num_evaluations,
            num_iterations,
        }
    }
}

/// Nelder–Mead simplex search.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Size of the initial simplex.
    pub initial_step: f64,
    /// Stop when the simplex values spread less than this.
    pub tol: f64,
    /// Stop as soon as the objective is at most this value.
    pub target: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            maxiter: 2000,
            initial_step: 0.5,
            tol: 1e-12,
            target: f64::NEG_INFINITY,
        }
    }
}

impl NelderMead {
    /// Create a new Nelder–Mead optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the early-stop target.
    #[must_use]
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }
}

impl Optimizer for NelderMead {
    fn minimize<F>(&self, mut objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let f0 = objective(&initial_params);
        let mut num_evaluations = 1;

        let mut simplex: Vec<Vec<f64>> = vec![initial_params.clone()];
        let mut values: Vec<f64> = vec![f0];
        for i in 0..n {
            let mut point = initial_params.clone();
            point[i] += self.initial_step;
            values.push(objective(&point));
            simplex.push(point);
            num_evaluations += 1;
        }

        let mut num_iterations = 0;
        let mut converged = f0 <= self.target;

        while num_iterations < self.maxiter && !converged && n > 0 {
            num_iterations += 1;

            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            let best = order[0];
            let worst = order[n];
            let second_worst = order[n - 1];

            if !values[best].is_finite() {
                break;
            }
            if values[best] <= self.target {
                converged = true;
                break;
            }
            if (values[worst] - values[best]).abs() < self.tol {
                break;
            }

            // Centroid of all points except the worst
            let mut centroid = vec![0.0; n];
            for &idx in &order[..n] {
                for (c, x) in centroid.iter_mut().zip(&simplex[idx]) {
                    *c += x;
                }
            }
            for c in &mut centroid {
                *c /= n as f64;
            }

            let towards = |scale: f64, from: &[f64]| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, w)| c + scale * (c - w))
                    .collect()
            };

            let reflected = towards(1.0, &simplex[worst]);
            let f_reflected = objective(&reflected);
            num_evaluations += 1;

            if f_reflected < values[best] {
                let expanded = towards(2.0, &simplex[worst]);
                let f_expanded = objective(&expanded);
                num_evaluations += 1;
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
            } else if f_reflected < values[second_worst] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            } else {
                let contracted = towards(-0.5, &simplex[worst]);
                let f_contracted = objective(&contracted);
                num_evaluations += 1;
                if f_contracted < values[worst] {
                    simplex[worst] = contracted;
                    values[worst] = f_contracted;
                } else {
                    // Shrink towards the best point
                    let anchor = simplex[best].clone();
                    for i in 0..=n {
                        if i != best {
                            for (x, a) in simplex[i].iter_mut().zip(&anchor) {
                                *x = 0.5 * (*x + a);
                            }
                            values[i] = objective(&simplex[i]);
                            num_evaluations += 1;
                        }
                    }
                }
            }
        }

        let best = (0..=n)
            .min_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap_or(0);
        OptimizationResult {
            converged: converged || values[best] <= self.target,
            optimal_params: simplex[best].clone(),
            optimal_value: values[best],
            num_evaluations,
            num_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rosenbrock(x: &[f64]) -> f64 {
        (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
    }

    fn bowl(x: &[f64]) -> f64 {
        x.iter().enumerate().map(|(i, v)| (v - i as f64).powi(2)).sum()
    }

    #[test]
    fn test_adam_bowl() {
        let adam = Adam {
            patience: usize::MAX,
            ..Adam::new().with_learning_rate(0.1).with_maxiter(2000)
        };
        let result = adam.minimize(bowl, vec![3.0, -2.0, 0.5]);
        assert!(result.optimal_value < 1e-4, "value {}", result.optimal_value);
    }

    #[test]
    fn test_adam_stops_at_target() {
        let result = Adam::new()
            .with_target(0.5)
            .minimize(bowl, vec![3.0, 3.0]);
        assert!(result.converged);
        assert!(result.optimal_value <= 0.5);
        assert!(result.num_iterations < 600);
    }

    #[test]
    fn test_adam_never_worse_than_start() {
        let start = vec![1.0, 1.0];
        let result = Adam::new().with_maxiter(5).minimize(rosenbrock, start);
        assert!(result.optimal_value <= rosenbrock(&[1.0, 1.0]));
    }

    #[test]
    fn test_adam_reports_non_finite() {
        let cliff = |x: &[f64]| if x[0] > 0.5 { f64::NAN } else { -x[0] };
        let result = Adam::new().minimize(cliff, vec![0.0]);
        assert!(!result.optimal_value.is_finite());
        assert!(!result.converged);
    }

    #[test]
    fn test_nelder_mead_rosenbrock() {
        let result = NelderMead::new()
            .with_maxiter(5000)
            .minimize(rosenbrock, vec![-1.2, 1.0]);
        assert!(result.optimal_value < 1e-6, "value {}", result.optimal_value);
        assert!((result.optimal_params[0] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_empty_parameter_vector() {
        let result = NelderMead::new().minimize(|_: &[f64]| 0.25, vec![]);
        assert_eq!(result.optimal_value, 0.25);
        let result = Adam::new().minimize(|_: &[f64]| 0.25, vec![]);
        assert_eq!(result.num_iterations, 0);
    }
}
