//! Compile command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use tracing::info;

use arvak_qudit_compile::{NativeFamily, PassManagerBuilder, SynthesisConfig, TargetContext};
use arvak_qudit_ir::distance;

use super::common::{default_output_path, load_circuit, load_config, save_circuit};

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub family: Option<NativeFamily>,
    pub tolerance: Option<f64>,
    pub max_layers: Option<usize>,
}

impl Overrides {
    /// Apply the overrides that are set.
    pub fn apply(self, mut config: SynthesisConfig) -> SynthesisConfig {
        if let Some(family) = self.family {
            config = config.with_family(family);
        }
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if let Some(max_layers) = self.max_layers {
            config = config.with_max_layers(max_layers);
        }
        config
    }
}

/// Execute the compile command.
pub fn execute(
    input: &str,
    output: Option<&str>,
    config_path: Option<&str>,
    overrides: Overrides,
) -> Result<()> {
    let config = overrides.apply(load_config(config_path)?);
    config.validate()?;

    println!(
        "{} Compiling {} with {} entanglers",
        style("→").cyan().bold(),
        style(input).green(),
        style(config.family).yellow()
    );

    let circuit = load_circuit(input)?;
    println!(
        "  Loaded: {} qudits (dims {:?}), {} instructions",
        circuit.num_qudits(),
        circuit.dims(),
        circuit.len()
    );

    let context = Arc::new(TargetContext::new(config));
    let pm = PassManagerBuilder::new().with_context(context).build();
    println!("  Running {} passes: {}", pm.len(), pm.pass_names().join(", "));

    let compiled = pm.run(&circuit)?;

    println!("{} Compilation complete", style("✓").green().bold());
    println!(
        "  Result: {} instructions, {} two-qudit",
        compiled.len(),
        compiled.multi_qudit_count()
    );
    if !compiled.instructions().iter().any(|inst| inst.is_measure()) {
        let d = distance(&compiled.to_matrix()?, &circuit.to_matrix()?)?;
        info!(distance = d, "end-to-end distance");
        println!("  Distance to input: {d:.3e}");
    }

    let output_path = output.map_or_else(|| default_output_path(input), PathBuf::from);
    save_circuit(&compiled, &output_path)?;
    println!("  Output: {}", style(output_path.display()).green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_only_set_fields() {
        let base = SynthesisConfig::default().with_max_layers(7);
        let config = Overrides {
            family: Some(NativeFamily::PSwap),
            tolerance: Some(1e-4),
            max_layers: None,
        }
        .apply(base);
        assert_eq!(config.family, NativeFamily::PSwap);
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_layers, 7);
    }
}
