use ssair::InstrTrait;
use utils::Label;

use super::{Evolution, IterVar};
use crate::rational::Rational;

/// Recurrence equation of one loop-carried value, in chains-of-recurrences
/// form: `{init, +, b}`, `{init, *, m}` or the shift variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Recurrence {
	pub init: Rational,
	pub step: Step,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
	Add(Rational),
	Mul(Rational),
	Shl(i64),
	Shr(i64),
}

/// The symbolic engine the pass is parameterized over. Recurrence
/// extraction accumulates per-instruction state; `build_equation` and
/// `evaluate` turn a header phi into a closed form, with `None` standing
/// for "no closed form".
pub trait EvolutionEngine {
	fn reset(&mut self);
	fn extract_recurrence(&mut self, instr: &dyn InstrTrait);
	fn build_equation(
		&self,
		phi: &ssair::PhiInstr,
		preheader: &Label,
		latch: &Label,
	) -> Option<Recurrence>;
	fn evaluate(&self, eq: &Recurrence, var: IterVar) -> Option<Evolution>;
}
