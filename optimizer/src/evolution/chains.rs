use std::collections::HashMap;

use ssair::{ArithOp, InstrTrait, InstrVariant, PhiInstr, Temp, Value};
use utils::{
	math::{is_pow2, log2_exact},
	Label,
};

use super::{
	engine::{EvolutionEngine, Recurrence, Step},
	ApplyKind, Evolution, IterVar,
};
use crate::rational::Rational;

/// Chains-of-recurrences engine for simple integer recurrences: header
/// phis stepped by `phi op const` with a constant initial value, where
/// `op` is add, sub, mul, div or a shift.
#[derive(Default)]
pub struct ChainEvolutions {
	defs: HashMap<Temp, (ArithOp, Value, Value)>,
}

fn as_int(value: &Value) -> Option<i64> {
	match value {
		Value::Int(v) => Some(*v as i64),
		_ => None,
	}
}

// `lhs op rhs` where one side is `phi` and the other a constant; only
// commutative ops may carry the constant on the left.
fn split_operands(
	phi: &Value,
	lhs: &Value,
	rhs: &Value,
	commutative: bool,
) -> Option<i64> {
	if lhs == phi {
		as_int(rhs)
	} else if commutative && rhs == phi {
		as_int(lhs)
	} else {
		None
	}
}

impl EvolutionEngine for ChainEvolutions {
	fn reset(&mut self) {
		self.defs.clear();
	}

	fn extract_recurrence(&mut self, instr: &dyn InstrTrait) {
		if let InstrVariant::Arith(v) = instr.get_variant() {
			self
				.defs
				.insert(v.target.clone(), (v.op, v.lhs.clone(), v.rhs.clone()));
		}
	}

	fn build_equation(
		&self,
		phi: &PhiInstr,
		preheader: &Label,
		latch: &Label,
	) -> Option<Recurrence> {
		if phi.source.len() != 2 {
			return None;
		}
		let init = as_int(&phi.get_incoming_value_for_block(preheader)?)?;
		let step_temp =
			phi.get_incoming_value_for_block(latch)?.unwrap_temp()?;
		let (op, lhs, rhs) = self.defs.get(&step_temp)?;
		let phi_val = Value::Temp(phi.target.clone());
		let step = match op {
			ArithOp::Add => {
				Step::Add(Rational::from_int(split_operands(&phi_val, lhs, rhs, true)?))
			}
			ArithOp::Sub => Step::Add(Rational::from_int(-split_operands(
				&phi_val, lhs, rhs, false,
			)?)),
			ArithOp::Mul => {
				Step::Mul(Rational::from_int(split_operands(&phi_val, lhs, rhs, true)?))
			}
			ArithOp::Div => {
				let c = split_operands(&phi_val, lhs, rhs, false)?;
				Step::Mul(Rational::from_int(c).inv()?)
			}
			ArithOp::Shl => {
				let c = split_operands(&phi_val, lhs, rhs, false)?;
				(c >= 0).then_some(Step::Shl(c))?
			}
			ArithOp::Ashr | ArithOp::Lshr => {
				let c = split_operands(&phi_val, lhs, rhs, false)?;
				(c >= 0).then_some(Step::Shr(c))?
			}
			_ => return None,
		};
		Some(Recurrence {
			init: Rational::from_int(init),
			step,
		})
	}

	fn evaluate(&self, eq: &Recurrence, var: IterVar) -> Option<Evolution> {
		// the header observes the value before the k-th step, so every
		// closed form is taken at k-1 with k the 1-based counter
		let shifted = |amount: i64| Evolution::Sum {
			constant: Rational::from_int(-amount),
			terms: vec![(Evolution::Var(var), Rational::from_int(amount))],
		};
		match eq.step {
			Step::Add(b) if b.is_zero() => Some(Evolution::Const(eq.init)),
			Step::Add(b) => Some(Evolution::Sum {
				constant: eq.init - b,
				terms: vec![(Evolution::Var(var), b)],
			}),
			Step::Mul(m) if m.is_one() => Some(Evolution::Const(eq.init)),
			// multiplicative steps only close under powers of two,
			// where they turn into shifts of the initial value
			Step::Mul(m) if m.is_whole() && is_pow2(m.num) => {
				Some(Evolution::Apply {
					kind: ApplyKind::ShiftLeft,
					base: Box::new(Evolution::Const(eq.init)),
					shift: Box::new(shifted(log2_exact(m.num))),
				})
			}
			// division truncates toward zero but the emitted shift
			// floors, so the two only agree for non-negative values
			Step::Mul(m)
				if m.num == 1 && is_pow2(m.den) && eq.init.num >= 0 =>
			{
				Some(Evolution::Apply {
					kind: ApplyKind::ShiftRight,
					base: Box::new(Evolution::Const(eq.init)),
					shift: Box::new(shifted(log2_exact(m.den))),
				})
			}
			Step::Mul(_) => None,
			Step::Shl(0) | Step::Shr(0) => Some(Evolution::Const(eq.init)),
			Step::Shl(s) => Some(Evolution::Apply {
				kind: ApplyKind::ShiftLeft,
				base: Box::new(Evolution::Const(eq.init)),
				shift: Box::new(shifted(s)),
			}),
			Step::Shr(s) => Some(Evolution::Apply {
				kind: ApplyKind::ShiftRight,
				base: Box::new(Evolution::Const(eq.init)),
				shift: Box::new(shifted(s)),
			}),
		}
	}
}
