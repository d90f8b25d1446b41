use std::collections::HashMap;

use ssair::{ArithInstr, ArithOp, Instr, TempManager, Value, VarType};
use utils::math::lcm;

use crate::{
	evolution::{ApplyKind, Evolution, IterVar},
	rational::Rational,
};

/// Lowers an evolution expression into straight-line arithmetic appended
/// to a collector. `None` means unsupported; partial appends are fine
/// because the caller discards the whole collector on failure.
pub struct EvoCodegen<'a> {
	pub temp_mgr: &'a mut TempManager,
	pub fresh_values: &'a HashMap<IterVar, Value>,
}

impl EvoCodegen<'_> {
	pub fn lower(
		&mut self,
		evo: &Evolution,
		collector: &mut Vec<Instr>,
	) -> Option<Value> {
		match evo {
			Evolution::Const(v) => lower_const(v),
			Evolution::Var(v) => self.fresh_values.get(v).cloned(),
			Evolution::Sum { constant, terms } => {
				self.lower_sum(constant, terms, collector)
			}
			Evolution::Product { constant, factors } => {
				self.lower_product(constant, factors, collector)
			}
			Evolution::Apply { kind, base, shift } => {
				let op = match kind {
					ApplyKind::ShiftLeft => ArithOp::Shl,
					ApplyKind::ShiftRight => ArithOp::Ashr,
					ApplyKind::Other(_) => return None,
				};
				let base = self.lower(base, collector)?;
				let shift = self.lower(shift, collector)?;
				Some(self.emit(op, base, shift, collector))
			}
		}
	}

	fn emit(
		&mut self,
		op: ArithOp,
		lhs: Value,
		rhs: Value,
		collector: &mut Vec<Instr>,
	) -> Value {
		let target = self.temp_mgr.new_temp(VarType::I32);
		collector.push(Box::new(ArithInstr::new(target.clone(), op, lhs, rhs)));
		Value::Temp(target)
	}

	// All denominators are cleared through the lcm up front, so every
	// emitted operand is an integer and a single final division suffices.
	fn lower_sum(
		&mut self,
		constant: &Rational,
		terms: &[(Evolution, Rational)],
		collector: &mut Vec<Instr>,
	) -> Option<Value> {
		if terms.is_empty() {
			return lower_const(constant);
		}
		let l = terms.iter().fold(constant.den, |acc, (_, v)| lcm(acc, v.den));
		let mut result: Option<Value> = None;
		for (term, coeff) in terms.iter() {
			let value = self.lower(term, collector)?;
			let scaled = int_operand(coeff.scale(l).whole_part())?;
			let value = if scaled == Value::Int(1) {
				value
			} else {
				self.emit(ArithOp::Mul, value, scaled, collector)
			};
			result = Some(match result {
				None => value,
				Some(prev) => self.emit(ArithOp::Add, prev, value, collector),
			});
		}
		let mut result = result?;
		if !constant.is_zero() {
			let scaled = int_operand(constant.scale(l).whole_part())?;
			result = self.emit(ArithOp::Add, result, scaled, collector);
		}
		if l != 1 {
			let divisor = int_operand(l)?;
			result = self.emit(ArithOp::Div, result, divisor, collector);
		}
		Some(result)
	}

	fn lower_product(
		&mut self,
		constant: &Rational,
		factors: &[(Evolution, Rational)],
		collector: &mut Vec<Instr>,
	) -> Option<Value> {
		// only non-negative integer exponents are lowerable
		if factors.iter().any(|(_, e)| !e.is_whole() || e.num < 0) {
			return None;
		}
		let mut result: Option<Value> = None;
		for (factor, exp) in factors.iter() {
			if exp.is_zero() {
				continue;
			}
			let base = self.lower(factor, collector)?;
			let mut power = base.clone();
			for _ in 1..exp.num {
				power = self.emit(ArithOp::Mul, power, base.clone(), collector);
			}
			result = Some(match result {
				None => power,
				Some(prev) => self.emit(ArithOp::Mul, prev, power, collector),
			});
		}
		let Some(mut result) = result else {
			// all exponents zero: the product degenerates to its constant
			return lower_const(constant);
		};
		if !constant.is_one() {
			let num = int_operand(constant.num)?;
			result = self.emit(ArithOp::Mul, result, num, collector);
			if !constant.is_whole() {
				let den = int_operand(constant.den)?;
				result = self.emit(ArithOp::Div, result, den, collector);
			}
		}
		Some(result)
	}
}

// A standalone fractional constant cannot be represented exactly, so it
// fails rather than truncating.
fn lower_const(v: &Rational) -> Option<Value> {
	if !v.is_whole() {
		return None;
	}
	int_operand(v.whole_part())
}

// Operand constants are 32-bit; anything wider fails the lowering.
fn int_operand(v: i64) -> Option<Value> {
	i32::try_from(v).ok().map(Value::Int)
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use ssair::{InstrVariant, TempManager, Value};

	use super::*;
	use crate::evolution::{ApplyKind, Evolution, IterVar};

	fn lower(
		evo: &Evolution,
		counter: Option<Value>,
	) -> (Option<Value>, Vec<String>) {
		let mut temp_mgr = TempManager::new();
		let mut fresh_values = HashMap::new();
		if let Some(counter) = counter {
			fresh_values.insert(IterVar(0), counter);
		}
		let mut codegen = EvoCodegen {
			temp_mgr: &mut temp_mgr,
			fresh_values: &fresh_values,
		};
		let mut collector = Vec::new();
		let result = codegen.lower(evo, &mut collector);
		let printed = collector.iter().map(|v| v.to_string()).collect();
		(result, printed)
	}

	fn counter() -> Value {
		Value::Temp(ssair::Temp::new("k", ssair::VarType::I32))
	}

	#[test]
	fn test_sum_clears_denominators_with_one_division() {
		// 3/4 + 1/2 k lowered as (2k + 3) / 4
		let evo = Evolution::Sum {
			constant: Rational::new(3, 4),
			terms: vec![(Evolution::Var(IterVar(0)), Rational::new(1, 2))],
		};
		let (result, code) = lower(&evo, Some(counter()));
		assert!(result.is_some());
		assert_eq!(
			code,
			vec![
				"%1 = mul i32 %k, 2",
				"%2 = add i32 %1, 3",
				"%3 = div i32 %2, 4",
			]
		);
	}

	#[test]
	fn test_unit_coefficient_sum_is_the_counter_itself() {
		// 0 + 1·k needs no instruction at all
		let evo = Evolution::Sum {
			constant: Rational::from_int(0),
			terms: vec![(Evolution::Var(IterVar(0)), Rational::from_int(1))],
		};
		let (result, code) = lower(&evo, Some(counter()));
		assert_eq!(result, Some(counter()));
		assert!(code.is_empty());
	}

	#[test]
	fn test_square_is_a_single_multiply() {
		let evo = Evolution::Product {
			constant: Rational::from_int(1),
			factors: vec![(Evolution::Var(IterVar(0)), Rational::from_int(2))],
		};
		let (result, code) = lower(&evo, Some(counter()));
		assert!(result.is_some());
		assert_eq!(code, vec!["%1 = mul i32 %k, %k"]);
	}

	#[test]
	fn test_shift_left() {
		// 1 << (0 + 1·k)
		let evo = Evolution::Apply {
			kind: ApplyKind::ShiftLeft,
			base: Box::new(Evolution::Const(Rational::from_int(1))),
			shift: Box::new(Evolution::Sum {
				constant: Rational::from_int(0),
				terms: vec![(Evolution::Var(IterVar(0)), Rational::from_int(1))],
			}),
		};
		let (result, code) = lower(&evo, Some(counter()));
		let value = result.unwrap();
		assert_eq!(code, vec!["%1 = shl i32 1, %k"]);
		let temp = value.unwrap_temp().unwrap();
		assert_eq!(temp.to_string(), "%1");
	}

	#[test]
	fn test_unsupported_shapes() {
		// fractional exponent
		let evo = Evolution::Product {
			constant: Rational::from_int(1),
			factors: vec![(Evolution::Var(IterVar(0)), Rational::new(1, 2))],
		};
		assert!(lower(&evo, Some(counter())).0.is_none());
		// opaque apply kind
		let evo = Evolution::Apply {
			kind: ApplyKind::Other("pow".to_string()),
			base: Box::new(Evolution::Var(IterVar(0))),
			shift: Box::new(Evolution::Const(Rational::from_int(2))),
		};
		assert!(lower(&evo, Some(counter())).0.is_none());
		// unbound iteration variable
		assert!(lower(&Evolution::Var(IterVar(0)), None).0.is_none());
		// non-whole constant fails instead of truncating
		assert!(lower(&Evolution::Const(Rational::new(7, 2)), None).0.is_none());
	}

	#[test]
	fn test_wide_constants_fail_instead_of_truncating() {
		let wide = Rational::from_int(1i64 << 40);
		assert!(lower(&Evolution::Const(wide), None).0.is_none());
		// a coefficient outside i32 range fails the whole sum
		let evo = Evolution::Sum {
			constant: Rational::from_int(0),
			terms: vec![(Evolution::Var(IterVar(0)), wide)],
		};
		assert!(lower(&evo, Some(counter())).0.is_none());
		let evo = Evolution::Product {
			constant: wide,
			factors: vec![(Evolution::Var(IterVar(0)), Rational::from_int(1))],
		};
		assert!(lower(&evo, Some(counter())).0.is_none());
	}

	#[test]
	fn test_emitted_instructions_are_binary() {
		let evo = Evolution::Sum {
			constant: Rational::from_int(5),
			terms: vec![(Evolution::Var(IterVar(0)), Rational::from_int(3))],
		};
		let mut temp_mgr = TempManager::new();
		let mut fresh_values = HashMap::new();
		fresh_values.insert(IterVar(0), counter());
		let mut codegen = EvoCodegen {
			temp_mgr: &mut temp_mgr,
			fresh_values: &fresh_values,
		};
		let mut collector = Vec::new();
		codegen.lower(&evo, &mut collector).unwrap();
		for instr in collector.iter() {
			assert!(instr.is_binary());
			assert!(matches!(instr.get_variant(), InstrVariant::Arith(_)));
		}
	}
}
