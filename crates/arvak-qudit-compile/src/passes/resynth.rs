//! Naive local resynthesis.

use std::sync::Arc;

use tracing::debug;

use arvak_qudit_ir::{Circuit, Instruction, QuditId, QuditRegister, UnitaryMatrix};

use crate::error::{CompileError, CompileResult};
use crate::pass::{CompilerPass, PassKind};
use crate::synthesis::{LayeredCompiler, decompose_single_qudit};
use crate::target::TargetContext;

/// Rewrites every non-native stretch of a circuit into native gates.
///
/// Instructions are grouped into contiguous windows on a fixed qudit
/// subset. A one-qudit window grows into a two-qudit window when the next
/// instruction covers its qudit, unless that instruction is native and the
/// window is not: the one-qudit window is then decomposed exactly on its own
/// and the native entangler kept. Anything else, including a measurement,
/// closes the window. Windows made only of native gates are kept as they
/// are. Non-native one-qudit windows are decomposed exactly, non-native
/// two-qudit windows go through the variational compiler with the family
/// bound to their qudit pair, and non-native instructions on three or more
/// qudits are rejected.
pub struct NaiveLocResynthPass {
    context: Arc<TargetContext>,
    compiler: LayeredCompiler,
}

impl NaiveLocResynthPass {
    /// Create the pass for a target.
    pub fn new(context: Arc<TargetContext>) -> Self {
        let compiler = LayeredCompiler::new(context.config().clone());
        Self { context, compiler }
    }

    /// The target this pass compiles for.
    pub fn context(&self) -> &TargetContext {
        &self.context
    }

    fn flush(
        &self,
        window: &mut Window,
        register: &QuditRegister,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        if window.instructions.is_empty() {
            return Ok(());
        }
        let Window {
            qudits,
            instructions,
            ..
        } = std::mem::take(window);

        let native = self.context.native_gates();
        let Some(offender) = instructions.iter().find(|inst| !native.is_native(inst)) else {
            out.extend(instructions);
            return Ok(());
        };

        match qudits.as_slice() {
            &[qudit] => {
                let matrix = window_matrix(&qudits, &instructions, register)?;
                let sequence = decompose_single_qudit(&matrix, qudit)?;
                debug!(
                    %qudit,
                    before = instructions.len(),
                    after = sequence.len(),
                    "Resynthesized single-qudit window"
                );
                out.extend(sequence);
            }
            &[first, second] => {
                let matrix = window_matrix(&qudits, &instructions, register)?;
                let dims = (register.dimension_of(first)?, register.dimension_of(second)?);
                let family = self.context.family_for(first, second);
                let result = self.compiler.compile_with_family(&matrix, dims, family)?;
                debug!(
                    %first,
                    %second,
                    before = instructions.len(),
                    after = result.instructions.len(),
                    layers = result.layers,
                    distance = result.distance,
                    "Resynthesized two-qudit window"
                );
                out.extend(result.remapped(first, second));
            }
            _ => {
                return Err(CompileError::UnsupportedInstruction {
                    name: offender.name().to_string(),
                    num_qudits: offender.num_qudits(),
                });
            }
        }
        Ok(())
    }
}

impl CompilerPass for NaiveLocResynthPass {
    fn name(&self) -> &'static str {
        "naive_loc_resynth"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn transpile(&self, circuit: &Circuit) -> CompileResult<Circuit> {
        let register = circuit.register();
        let native = self.context.native_gates();
        let mut out = Vec::with_capacity(circuit.len());
        let mut window = Window::default();

        for inst in circuit.instructions() {
            if inst.is_measure() {
                self.flush(&mut window, register, &mut out)?;
                out.push(inst.clone());
                continue;
            }
            let qudits = inst.all_qudits();
            let is_native = native.is_native(inst);
            if !window.accepts(&qudits, is_native) {
                self.flush(&mut window, register, &mut out)?;
                window.qudits = qudits;
            }
            window.push(inst.clone(), is_native);
        }
        self.flush(&mut window, register, &mut out)?;

        Ok(circuit.set_instructions(out)?)
    }

    fn should_run(&self, circuit: &Circuit) -> bool {
        let native = self.context.native_gates();
        circuit
            .instructions()
            .iter()
            .any(|inst| inst.is_gate() && !native.is_native(inst))
    }
}

/// Contiguous instructions on one qudit subset.
#[derive(Debug, Default)]
struct Window {
    qudits: Vec<QuditId>,
    instructions: Vec<Instruction>,
    /// Some instruction is outside the native set.
    foreign: bool,
}

impl Window {
    /// Whether an instruction on `qudits` can join, widening a one-qudit
    /// window when it does.
    ///
    /// A native two-qudit instruction does not widen a window holding
    /// non-native gates, so it is never pulled into variational synthesis.
    fn accepts(&mut self, qudits: &[QuditId], native: bool) -> bool {
        if self.instructions.is_empty() {
            return false;
        }
        if qudits.iter().all(|q| self.qudits.contains(q)) {
            return true;
        }
        let widens = self.qudits.len() == 1
            && qudits.len() == 2
            && qudits.contains(&self.qudits[0]);
        if widens && (!native || !self.foreign) {
            self.qudits = qudits.to_vec();
            return true;
        }
        false
    }

    fn push(&mut self, instruction: Instruction, native: bool) {
        self.foreign |= !native;
        self.instructions.push(instruction);
    }
}

/// Unitary of `instructions` over `qudits`, first qudit most significant.
fn window_matrix(
    qudits: &[QuditId],
    instructions: &[Instruction],
    register: &QuditRegister,
) -> CompileResult<UnitaryMatrix> {
    let local = register.select(qudits)?;
    let to_local = |q: QuditId| {
        let position = qudits.iter().position(|&w| w == q).unwrap_or(0);
        QuditId::from(position)
    };
    let circuit = Circuit::with_register("window", local)
        .set_instructions(instructions.iter().map(|inst| inst.remap(to_local)).collect())?;
    Ok(circuit.to_matrix()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisConfig;
    use arvak_qudit_ir::distance;

    fn pass() -> NaiveLocResynthPass {
        NaiveLocResynthPass::new(Arc::new(TargetContext::new(
            SynthesisConfig::default().with_seed(3),
        )))
    }

    fn window_on(qudit: QuditId, foreign: bool) -> Window {
        let mut window = Window {
            qudits: vec![qudit],
            ..Window::default()
        };
        window.push(Instruction::measure(qudit), !foreign);
        window
    }

    #[test]
    fn test_window_grows_from_one_to_two_qudits() {
        let mut window = window_on(QuditId(1), true);
        assert!(window.accepts(&[QuditId(0), QuditId(1)], false));
        assert_eq!(window.qudits, vec![QuditId(0), QuditId(1)]);
        assert!(window.accepts(&[QuditId(1)], true));
        assert!(!window.accepts(&[QuditId(1), QuditId(2)], false));
    }

    #[test]
    fn test_native_entangler_does_not_widen_foreign_window() {
        let mut window = window_on(QuditId(0), true);
        assert!(!window.accepts(&[QuditId(0), QuditId(1)], true));
        assert_eq!(window.qudits, vec![QuditId(0)]);

        let mut window = window_on(QuditId(0), false);
        assert!(window.accepts(&[QuditId(0), QuditId(1)], true));
        assert_eq!(window.qudits, vec![QuditId(0), QuditId(1)]);
    }

    #[test]
    fn test_native_entangler_survives_local_resynthesis() {
        for d in [3, 4, 5] {
            let mut circuit = Circuit::new("c", vec![d, d]).unwrap();
            circuit.h(QuditId(0)).unwrap();
            circuit.ms(0.7, QuditId(0), QuditId(1)).unwrap();

            let out = pass().transpile(&circuit).unwrap();
            assert_eq!(out.instructions().last(), circuit.instructions().last());
            assert_eq!(out.count_ops().get("ms"), Some(&1));
            let dist =
                distance(&out.to_matrix().unwrap(), &circuit.to_matrix().unwrap()).unwrap();
            assert!(dist < 1e-10, "dims {d}: distance {dist}");
        }
    }

    #[test]
    fn test_window_matrix_uses_local_order() {
        let mut circuit = Circuit::new("c", vec![2, 3, 2]).unwrap();
        circuit.cex(1, 0, 1, 0.3, QuditId(2), QuditId(1)).unwrap();
        let matrix = window_matrix(
            &[QuditId(2), QuditId(1)],
            circuit.instructions(),
            circuit.register(),
        )
        .unwrap();
        let mut reference = Circuit::new("r", vec![2, 3]).unwrap();
        reference.cex(1, 0, 1, 0.3, QuditId(0), QuditId(1)).unwrap();
        assert!(matrix.approx_eq(&reference.to_matrix().unwrap(), 1e-12));
    }

    #[test]
    fn test_single_qudit_windows_are_exact() {
        let mut circuit = Circuit::new("c", vec![3, 4]).unwrap();
        circuit.h(QuditId(0)).unwrap();
        circuit.x(QuditId(1)).unwrap();
        circuit.h(QuditId(1)).unwrap();
        let pass = pass();
        assert!(pass.should_run(&circuit));
        let out = pass.transpile(&circuit).unwrap();
        assert!(!pass.should_run(&out));
        let d = distance(&out.to_matrix().unwrap(), &circuit.to_matrix().unwrap()).unwrap();
        assert!(d < 1e-10);
    }

    #[test]
    fn test_measure_splits_windows() {
        let mut circuit = Circuit::new("c", vec![3]).unwrap();
        circuit.h(QuditId(0)).unwrap();
        circuit.measure(QuditId(0)).unwrap();
        circuit.h(QuditId(0)).unwrap();
        let out = pass().transpile(&circuit).unwrap();
        let position = out
            .instructions()
            .iter()
            .position(Instruction::is_measure)
            .unwrap();
        assert!(position > 0 && position < out.len() - 1);
    }
}
