//! Arvak Qudit CLI
//!
//! Command-line front end for qudit resynthesis: compile circuit files to
//! the native trapped-ion gate set, or inspect the exact pulse sequence of
//! a native two-qudit generator.
//!
//! ```text
//! arvak-qudit compile -i bell.json --family crot -vv
//! arvak-qudit decompose --generator pswap --dims 2,3 --angle 1.047
//! ```

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use arvak_qudit_compile::NativeFamily;

mod commands;

use commands::decompose::GeneratorKind;
use commands::{compile, decompose, version};

/// Arvak Qudit - native gate synthesis for trapped-ion qudit processors
#[derive(Parser)]
#[command(name = "arvak-qudit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resynthesize a circuit into native gates
    Compile {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Output file (defaults to <input>_compiled.json)
        #[arg(short, long)]
        output: Option<String>,

        /// Synthesis configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Entangling family (ms, crot, pswap)
        #[arg(long)]
        family: Option<NativeFamily>,

        /// Acceptable distance to each window's unitary
        #[arg(long)]
        tolerance: Option<f64>,

        /// Maximum number of entangling layers per window
        #[arg(long)]
        max_layers: Option<usize>,
    },

    /// Print the native sequence of a two-qudit generator
    Decompose {
        /// Generator to expand
        #[arg(short, long, value_enum)]
        generator: GeneratorKind,

        /// Qudit dimensions, e.g. "2,3"
        #[arg(short, long)]
        dims: String,

        /// Rotation angle in radians
        #[arg(short, long, allow_negative_numbers = true)]
        angle: f64,

        /// Rotation phase in radians
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        phase: f64,

        /// Control level (crot) or lower target level (zcrot, pswap)
        #[arg(short, long, default_value = "0")]
        level: usize,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            config,
            family,
            tolerance,
            max_layers,
        } => compile::execute(
            &input,
            output.as_deref(),
            config.as_deref(),
            compile::Overrides {
                family,
                tolerance,
                max_layers,
            },
        ),

        Commands::Decompose {
            generator,
            dims,
            angle,
            phase,
            level,
        } => decompose::execute(generator, &dims, angle, phase, level),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
