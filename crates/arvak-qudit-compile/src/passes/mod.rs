//! Built-in compilation passes.

pub mod resynth;
pub mod verification;

pub use resynth::NaiveLocResynthPass;
pub use verification::NativeGateVerification;
