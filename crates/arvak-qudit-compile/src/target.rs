//! Target description shared by the passes.
//!
//! A [`TargetContext`] tells the passes which gates the device executes
//! natively, which entangling family each qudit pair is wired for, and how
//! hard the variational compiler may search.
//!
//! # Examples
//!
//! ```
//! use arvak_qudit_compile::{NativeFamily, SynthesisConfig, TargetContext};
//! use arvak_qudit_ir::QuditId;
//!
//! let ctx = TargetContext::new(SynthesisConfig::default())
//!     .bind_pair(QuditId(0), QuditId(1), NativeFamily::PSwap);
//!
//! assert_eq!(ctx.family_for(QuditId(1), QuditId(0)), NativeFamily::PSwap);
//! assert_eq!(ctx.family_for(QuditId(1), QuditId(2)), NativeFamily::Ms);
//! assert!(ctx.native_gates().contains("cex"));
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use arvak_qudit_ir::{Instruction, QuditId};

use crate::config::{NativeFamily, SynthesisConfig};

/// Names of the gates a target executes directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeGateSet {
    gates: FxHashSet<String>,
}

impl NativeGateSet {
    /// Create a gate set from names.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Level rotations plus both entangling pulses.
    pub fn trapped_ion() -> Self {
        Self::new(["r", "rz", "virtrz", "cex", "ms"])
    }

    /// Check if a gate name is native.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.contains(gate)
    }

    /// True when the instruction can run as is: a native named gate with no
    /// extra controls.
    pub fn is_native(&self, instruction: &Instruction) -> bool {
        match instruction.as_gate() {
            Some(gate) => {
                !gate.is_custom() && !instruction.is_controlled() && self.contains(gate.name())
            }
            None => false,
        }
    }

    /// Gate names, sorted.
    pub fn gates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.gates.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for NativeGateSet {
    fn default() -> Self {
        Self::trapped_ion()
    }
}

/// Everything a pass needs to know about the target.
#[derive(Debug, Clone, Default)]
pub struct TargetContext {
    config: SynthesisConfig,
    native_gates: NativeGateSet,
    bindings: FxHashMap<(QuditId, QuditId), NativeFamily>,
}

impl TargetContext {
    /// Create a context with the default native gate set and no bindings.
    pub fn new(config: SynthesisConfig) -> Self {
        Self {
            config,
            native_gates: NativeGateSet::default(),
            bindings: FxHashMap::default(),
        }
    }

    /// Replace the native gate set.
    #[must_use]
    pub fn with_native_gates(mut self, native_gates: NativeGateSet) -> Self {
        self.native_gates = native_gates;
        self
    }

    /// Bind a qudit pair to an entangling family.
    #[must_use]
    pub fn bind_pair(mut self, q0: QuditId, q1: QuditId, family: NativeFamily) -> Self {
        self.bindings.insert(ordered(q0, q1), family);
        self
    }

    /// Family for a pair, falling back to the configured default.
    pub fn family_for(&self, q0: QuditId, q1: QuditId) -> NativeFamily {
        self.bindings
            .get(&ordered(q0, q1))
            .copied()
            .unwrap_or(self.config.family)
    }

    /// The synthesis configuration.
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// The native gate set.
    pub fn native_gates(&self) -> &NativeGateSet {
        &self.native_gates
    }
}

fn ordered(a: QuditId, b: QuditId) -> (QuditId, QuditId) {
    if a <= b { (a, b) } else { (b, a) }
}
