//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use arvak_qudit_compile::SynthesisConfig;
use arvak_qudit_ir::Circuit;

/// Load a circuit from a JSON file.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !ext.is_empty() && !ext.eq_ignore_ascii_case("json") {
        anyhow::bail!("Unsupported circuit format '.{ext}' (expected JSON)");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    Circuit::from_json(&source).with_context(|| format!("Failed to parse circuit: {path}"))
}

/// Save a circuit as pretty JSON.
pub fn save_circuit(circuit: &Circuit, path: &Path) -> Result<()> {
    let content = circuit.to_json()?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}

/// `<dir>/<stem>_compiled.json` next to the input file.
pub fn default_output_path(input: &str) -> PathBuf {
    let p = Path::new(input);
    let stem = p.file_stem().unwrap_or_default().to_string_lossy();
    p.with_file_name(format!("{stem}_compiled.json"))
}

/// Parse a `"d1,d2"` pair of qudit dimensions.
pub fn parse_dims(text: &str) -> Result<(usize, usize)> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [d1, d2] = parts.as_slice() else {
        anyhow::bail!("Expected two comma-separated dimensions, got '{text}'");
    };
    let parse = |s: &str| -> Result<usize> {
        let d: usize = s
            .parse()
            .with_context(|| format!("Invalid dimension '{s}'"))?;
        if d < 2 {
            anyhow::bail!("Qudit dimension must be at least 2, got {d}");
        }
        Ok(d)
    };
    Ok((parse(d1)?, parse(d2)?))
}

/// Synthesis configuration from an optional file plus `ARVAK_QUDIT_*` variables.
pub fn load_config(path: Option<&str>) -> Result<SynthesisConfig> {
    SynthesisConfig::load(path.map(Path::new)).context("Failed to load synthesis configuration")
}
