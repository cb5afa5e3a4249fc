//! CLI command parsing and file handling tests.
//!
//! The CLI is a binary crate, so these tests exercise the same library calls
//! the commands make, and validate argument parsing on a mirrored clap struct.

// ============================================================================
// Circuit and configuration files
// ============================================================================

mod circuit_loading {
    use std::fs;

    use arvak_qudit_compile::{NativeFamily, SynthesisConfig};
    use arvak_qudit_ir::{Circuit, QuditId};

    fn bell() -> Circuit {
        let mut circuit = Circuit::new("bell", vec![2, 3]).unwrap();
        circuit.h(QuditId(0)).unwrap();
        circuit.csum(QuditId(0), QuditId(1)).unwrap();
        circuit.measure(QuditId(1)).unwrap();
        circuit
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.json");
        fs::write(&path, bell().to_json().unwrap()).unwrap();

        let source = fs::read_to_string(&path).unwrap();
        let loaded = Circuit::from_json(&source).unwrap();
        assert_eq!(loaded.name(), "bell");
        assert_eq!(loaded.dims(), &[2, 3]);
        assert_eq!(loaded.instructions(), bell().instructions());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(Circuit::from_json(r#"{"circuit": "test"}"#).is_err());
        assert!(Circuit::from_json("not json").is_err());
    }

    #[test]
    fn test_yaml_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synthesis.yaml");
        fs::write(&path, "tolerance: 0.01\nmax_layers: 2\nfamily: pswap\n").unwrap();

        let config = SynthesisConfig::from_file(&path).unwrap();
        assert_eq!(config.tolerance, 0.01);
        assert_eq!(config.max_layers, 2);
        assert_eq!(config.family, NativeFamily::PSwap);
        assert_eq!(config.restarts, SynthesisConfig::default().restarts);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synthesis.yaml");
        fs::write(&path, "max_layers: 0\n").unwrap();
        assert!(SynthesisConfig::from_file(&path).is_err());
        assert!(SynthesisConfig::from_file(dir.path().join("missing.yaml")).is_err());
    }
}

// ============================================================================
// Compile pipeline as driven by the compile command
// ============================================================================

mod compile_pipeline {
    use std::sync::Arc;

    use arvak_qudit_compile::{PassManagerBuilder, SynthesisConfig, TargetContext};
    use arvak_qudit_ir::{Circuit, QuditId, distance};

    #[test]
    fn test_compiled_output_is_native_and_reloadable() {
        let mut circuit = Circuit::new("qutrit", vec![3]).unwrap();
        circuit.h(QuditId(0)).unwrap();
        circuit.x(QuditId(0)).unwrap();

        let context = Arc::new(TargetContext::new(SynthesisConfig::default().with_seed(3)));
        let pm = PassManagerBuilder::new().with_context(Arc::clone(&context)).build();
        assert_eq!(pm.pass_names(), vec!["naive_loc_resynth", "native_gate_verification"]);

        let compiled = pm.run(&circuit).unwrap();
        assert!(
            compiled
                .instructions()
                .iter()
                .all(|inst| context.native_gates().is_native(inst))
        );

        let reloaded = Circuit::from_json(&compiled.to_json().unwrap()).unwrap();
        let d = distance(&reloaded.to_matrix().unwrap(), &circuit.to_matrix().unwrap()).unwrap();
        assert!(d < 1e-9, "distance {d}");
    }
}

// ============================================================================
// Clap argument parsing (test via try_parse_from on equivalent structs)
// ============================================================================

mod clap_parsing {
    use clap::{Parser, Subcommand, ValueEnum};

    use arvak_qudit_compile::NativeFamily;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum TestGenerator {
        Crot,
        Zcrot,
        Pswap,
        Ms,
    }

    // Mirror the CLI struct for testing (since main.rs is a binary)
    #[derive(Parser)]
    #[command(name = "arvak-qudit")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Compile {
            #[arg(short, long)]
            input: String,
            #[arg(short, long)]
            output: Option<String>,
            #[arg(short, long)]
            config: Option<String>,
            #[arg(long)]
            family: Option<NativeFamily>,
            #[arg(long)]
            tolerance: Option<f64>,
            #[arg(long)]
            max_layers: Option<usize>,
        },
        Decompose {
            #[arg(short, long, value_enum)]
            generator: TestGenerator,
            #[arg(short, long)]
            dims: String,
            #[arg(short, long, allow_negative_numbers = true)]
            angle: f64,
            #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
            phase: f64,
            #[arg(short, long, default_value = "0")]
            level: usize,
        },
        Version,
    }

    #[test]
    fn test_compile_minimal() {
        let cli = TestCli::try_parse_from(["arvak-qudit", "compile", "-i", "c.json"]).unwrap();
        match cli.command {
            TestCommands::Compile {
                input,
                output,
                config,
                family,
                tolerance,
                max_layers,
            } => {
                assert_eq!(input, "c.json");
                assert!(output.is_none() && config.is_none() && family.is_none());
                assert!(tolerance.is_none() && max_layers.is_none());
            }
            _ => panic!("Expected Compile command"),
        }
    }

    #[test]
    fn test_compile_all_options() {
        let cli = TestCli::try_parse_from([
            "arvak-qudit",
            "compile",
            "-i",
            "c.json",
            "-o",
            "out.json",
            "-c",
            "synthesis.yaml",
            "--family",
            "czrot",
            "--tolerance",
            "0.05",
            "--max-layers",
            "6",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Compile {
                output,
                config,
                family,
                tolerance,
                max_layers,
                ..
            } => {
                assert_eq!(output.as_deref(), Some("out.json"));
                assert_eq!(config.as_deref(), Some("synthesis.yaml"));
                assert_eq!(family, Some(NativeFamily::CRot));
                assert_eq!(tolerance, Some(0.05));
                assert_eq!(max_layers, Some(6));
            }
            _ => panic!("Expected Compile command"),
        }
    }

    #[test]
    fn test_compile_requires_input() {
        assert!(TestCli::try_parse_from(["arvak-qudit", "compile"]).is_err());
    }

    #[test]
    fn test_decompose() {
        let cli = TestCli::try_parse_from([
            "arvak-qudit",
            "decompose",
            "-g",
            "zcrot",
            "-d",
            "4,4",
            "-a",
            "0.785",
            "-l",
            "2",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Decompose {
                generator,
                dims,
                angle,
                phase,
                level,
            } => {
                assert_eq!(generator, TestGenerator::Zcrot);
                assert_eq!(dims, "4,4");
                assert_eq!(angle, 0.785);
                assert_eq!(phase, 0.0);
                assert_eq!(level, 2);
            }
            _ => panic!("Expected Decompose command"),
        }
    }

    #[test]
    fn test_decompose_unknown_generator() {
        let result = TestCli::try_parse_from([
            "arvak-qudit",
            "decompose",
            "-g",
            "cnot",
            "-d",
            "2,2",
            "-a",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        for (args, expected) in [
            (vec!["arvak-qudit", "version"], 0),
            (vec!["arvak-qudit", "-v", "version"], 1),
            (vec!["arvak-qudit", "-vv", "version"], 2),
            (vec!["arvak-qudit", "version", "-vvv"], 3),
        ] {
            let cli = TestCli::try_parse_from(args).unwrap();
            assert_eq!(cli.verbose, expected);
            assert!(matches!(cli.command, TestCommands::Version));
        }
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(TestCli::try_parse_from(["arvak-qudit", "foobar"]).is_err());
        assert!(TestCli::try_parse_from(["arvak-qudit"]).is_err());
    }
}
