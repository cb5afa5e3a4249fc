//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - native gate synthesis for qudit processors",
        style("Arvak Qudit").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  arvak-qudit-ir       Qudit circuits, gates and unitaries");
    println!("  arvak-qudit-compile  Generators, variational synthesis and passes");
    println!("  arvak-qudit-cli      Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/hiq-lab/arvak").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
