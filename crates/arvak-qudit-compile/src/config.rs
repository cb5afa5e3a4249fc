//! Synthesis configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML, or JSON by `.json` extension)
//! 2. Environment variables (with `ARVAK_QUDIT_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Prefix of the environment variables read by [`SynthesisConfig::load`].
pub const ENV_PREFIX: &str = "ARVAK_QUDIT_";

/// Family of native two-qudit generators used as entangling layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeFamily {
    /// Mølmer–Sørensen interaction.
    #[default]
    Ms,
    /// Controlled rotation built from controlled exchanges.
    #[serde(alias = "czrot")]
    CRot,
    /// Parametric SWAP built from controlled exchanges.
    PSwap,
}

impl NativeFamily {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            NativeFamily::Ms => "ms",
            NativeFamily::CRot => "crot",
            NativeFamily::PSwap => "pswap",
        }
    }
}

impl fmt::Display for NativeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NativeFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" => Ok(NativeFamily::Ms),
            "crot" | "czrot" => Ok(NativeFamily::CRot),
            "pswap" => Ok(NativeFamily::PSwap),
            other => Err(ConfigError::ParseError(format!(
                "unknown native family '{other}' (expected ms, crot or pswap)"
            ))),
        }
    }
}

/// Local optimizer driving each restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Adam on a finite-difference gradient.
    #[default]
    Adam,
    /// Derivative-free simplex search.
    #[serde(alias = "neldermead")]
    NelderMead,
}

impl FromStr for OptimizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "adam" => Ok(OptimizerKind::Adam),
            "nelder_mead" | "neldermead" => Ok(OptimizerKind::NelderMead),
            other => Err(ConfigError::ParseError(format!("unknown optimizer '{other}'"))),
        }
    }
}

/// Parameters of the layered variational search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Accept a layer count once the distance is at most this value.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Largest number of entangling layers tried.
    #[serde(default = "default_max_layers")]
    pub max_layers: usize,

    /// Random restarts per layer count.
    #[serde(default = "default_restarts")]
    pub restarts: usize,

    /// Iteration budget of one optimizer run.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Adam step size.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Base seed; restart seeds are derived from it.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Run restarts on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Default entangling family.
    #[serde(default)]
    pub family: NativeFamily,

    /// Local optimizer.
    #[serde(default)]
    pub optimizer: OptimizerKind,
}

fn default_tolerance() -> f64 {
    1e-3
}

fn default_max_layers() -> usize {
    4
}

fn default_restarts() -> usize {
    4
}

fn default_max_iterations() -> usize {
    600
}

fn default_learning_rate() -> f64 {
    0.08
}

fn default_seed() -> u64 {
    0x5EED
}

fn default_true() -> bool {
    true
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_layers: default_max_layers(),
            restarts: default_restarts(),
            max_iterations: default_max_iterations(),
            learning_rate: default_learning_rate(),
            seed: default_seed(),
            parallel: default_true(),
            family: NativeFamily::default(),
            optimizer: OptimizerKind::default(),
        }
    }
}

impl SynthesisConfig {
    /// Load configuration from a YAML or JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: SynthesisConfig = if is_json {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            serde_yaml_ng::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_overrides(std::env::vars());
        config.validate()?;
        Ok(config)
    }

    /// Apply `ARVAK_QUDIT_*` overrides from `(name, value)` pairs.
    ///
    /// Only variables that are present override fields; unparsable values are
    /// logged and ignored.
    #[must_use]
    pub fn apply_overrides<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            let applied = match field {
                "TOLERANCE" => value.parse().map(|v| self.tolerance = v).is_ok(),
                "MAX_LAYERS" => value.parse().map(|v| self.max_layers = v).is_ok(),
                "RESTARTS" => value.parse().map(|v| self.restarts = v).is_ok(),
                "MAX_ITERATIONS" => value.parse().map(|v| self.max_iterations = v).is_ok(),
                "LEARNING_RATE" => value.parse().map(|v| self.learning_rate = v).is_ok(),
                "SEED" => value.parse().map(|v| self.seed = v).is_ok(),
                "PARALLEL" => parse_bool(value).map(|v| self.parallel = v).is_some(),
                "FAMILY" => value.parse().map(|v| self.family = v).is_ok(),
                "OPTIMIZER" => value.parse().map(|v| self.optimizer = v).is_ok(),
                _ => continue,
            };
            if !applied {
                warn!("Ignoring {ENV_PREFIX}{field}={value}: cannot parse value");
            }
        }
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "tolerance must be finite, got {}",
                self.tolerance
            )));
        }
        if self.max_layers == 0 {
            return Err(ConfigError::ValidationError(
                "max_layers must be greater than 0".to_string(),
            ));
        }
        if self.restarts == 0 {
            return Err(ConfigError::ValidationError(
                "restarts must be greater than 0".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Set the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the largest layer count.
    #[must_use]
    pub fn with_max_layers(mut self, max_layers: usize) -> Self {
        self.max_layers = max_layers;
        self
    }

    /// Set the number of restarts per layer count.
    #[must_use]
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the base seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable parallel restarts.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the default entangling family.
    #[must_use]
    pub fn with_family(mut self, family: NativeFamily) -> Self {
        self.family = family;
        self
    }

    /// Set the local optimizer.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    IoError(String),

    /// The configuration could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A value is out of range.
    #[error("Validation error: {0}")]
    ValidationError(String),
}
