//! Layered variational compilation.

use ndarray::Array2;
use num_complex::Complex64;

use arvak_qudit_compile::{
    CompileError, LayeredCompiler, NativeFamily, SynthesisConfig, SynthesisTarget,
    variational_compile,
};
use arvak_qudit_ir::{Circuit, IrError, QuditId, UnitaryMatrix, distance};

/// Controlled X on target levels 0 and 1, control on level 1.
fn embedded_cx(dims: (usize, usize)) -> UnitaryMatrix {
    let d2 = dims.1;
    let mut m = Array2::<Complex64>::eye(dims.0 * d2);
    let (a, b) = (d2, d2 + 1);
    m[[a, a]] = Complex64::new(0.0, 0.0);
    m[[b, b]] = Complex64::new(0.0, 0.0);
    m[[a, b]] = Complex64::new(1.0, 0.0);
    m[[b, a]] = Complex64::new(1.0, 0.0);
    UnitaryMatrix::from_array(m).unwrap()
}

fn qutrit_pair_target() -> UnitaryMatrix {
    let mut circuit = Circuit::new("target", vec![3, 3]).unwrap();
    circuit.h(QuditId(0)).unwrap();
    circuit.csum(QuditId(0), QuditId(1)).unwrap();
    circuit.x(QuditId(1)).unwrap();
    circuit.csum(QuditId(1), QuditId(0)).unwrap();
    circuit.to_matrix().unwrap()
}

#[test]
fn test_cx_on_qubit_qutrit_with_ms() {
    let target = SynthesisTarget::new(embedded_cx((2, 3)), (2, 3));
    let result = variational_compile(&target, 0.1, NativeFamily::Ms, 3).unwrap();

    assert!(result.distance <= 0.1);
    assert!(result.layers >= 1 && result.layers <= 3);
    assert_eq!(result.layer_distances.len(), result.layers);
    assert_eq!(result.layer_distances.last(), Some(&result.distance));
    assert_eq!(result.family, NativeFamily::Ms);

    let realized = result.to_circuit((2, 3)).unwrap().to_matrix().unwrap();
    assert!(realized.is_unitary(1e-9));
    assert!(distance(&realized, target.matrix()).unwrap() <= 0.1 + 1e-9);
    assert!(
        result
            .instructions
            .iter()
            .all(|inst| matches!(inst.name(), "r" | "rz" | "ms"))
    );
}

#[test]
fn test_target_from_circuit() {
    let mut circuit = Circuit::new("cex", vec![2, 2]).unwrap();
    circuit.cex(1, 0, 1, 0.0, QuditId(0), QuditId(1)).unwrap();
    let target = SynthesisTarget::from_circuit(&circuit).unwrap();
    let result = variational_compile(&target, 1e-3, NativeFamily::CRot, 2).unwrap();
    assert!(result.distance <= 1e-3);

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"family\":\"crot\""));
}

#[test]
fn test_best_distance_non_increasing_in_layers() {
    // With a single restart per layer count, only the warm start links
    // consecutive layer counts.
    for restarts in [1, 2] {
        let config = SynthesisConfig::default()
            .with_tolerance(0.0)
            .with_max_layers(3)
            .with_restarts(restarts)
            .with_max_iterations(15)
            .with_seed(21);
        match LayeredCompiler::new(config).compile(&qutrit_pair_target(), (3, 3)) {
            Err(CompileError::SynthesisUnreachable {
                best_distance,
                layers,
                layer_distances,
                ..
            }) => {
                assert_eq!(layers, 3);
                assert_eq!(layer_distances.len(), 3);
                for pair in layer_distances.windows(2) {
                    assert!(pair[1] <= pair[0] + 1e-12, "{layer_distances:?}");
                }
                let lowest = layer_distances.iter().copied().fold(f64::INFINITY, f64::min);
                assert_eq!(best_distance, lowest);
            }
            other => panic!("expected unreachable, got {other:?}"),
        }
    }
}

#[test]
fn test_unreachable_reports_budget() {
    let target = SynthesisTarget::new(qutrit_pair_target(), (3, 3));
    let config = SynthesisConfig::default()
        .with_tolerance(1e-12)
        .with_max_layers(1)
        .with_restarts(1)
        .with_max_iterations(10);
    let err = LayeredCompiler::new(config)
        .compile(target.matrix(), target.dims())
        .unwrap_err();
    match err {
        CompileError::SynthesisUnreachable {
            best_distance,
            layers,
            tolerance,
            layer_distances,
        } => {
            assert_eq!(layers, 1);
            assert_eq!(layer_distances, vec![best_distance]);
            assert_eq!(tolerance, 1e-12);
            assert!(best_distance > 1e-12 && best_distance <= 1.0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dimension_mismatch() {
    let target = SynthesisTarget::new(UnitaryMatrix::identity(4), (2, 3));
    let err = variational_compile(&target, 0.1, NativeFamily::Ms, 2).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Ir(IrError::DimensionMismatch {
            operation: "variational_compile",
            ..
        })
    ));
}

#[test]
fn test_zero_layers_is_a_configuration_error() {
    let target = SynthesisTarget::new(embedded_cx((2, 2)), (2, 2));
    let err = variational_compile(&target, 0.1, NativeFamily::Ms, 0).unwrap_err();
    assert!(matches!(err, CompileError::Config(_)));
}
