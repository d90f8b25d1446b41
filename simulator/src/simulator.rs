use std::collections::HashMap;

use cfgir::Func;
use ssair::{ArithOp, CompOp, InstrVariant, Temp, Value};
use utils::{Label, LoopEvoError, Result};

const STEP_LIMIT: usize = 1 << 20;

pub struct ExecResult {
	pub ret: Option<i32>,
	/// dynamically executed instructions, phis and terminators included
	pub steps: usize,
}

fn sys_err(msg: String) -> LoopEvoError {
	LoopEvoError::SystemError(msg)
}

fn value_of(env: &HashMap<Temp, i32>, value: &Value) -> Result<i32> {
	match value {
		Value::Int(v) => Ok(*v),
		Value::Temp(v) => env
			.get(v)
			.copied()
			.ok_or_else(|| sys_err(format!("read of undefined temp {}", v))),
	}
}

fn eval_arith(op: ArithOp, lhs: i32, rhs: i32) -> Result<i32> {
	Ok(match op {
		ArithOp::Add => lhs.wrapping_add(rhs),
		ArithOp::Sub => lhs.wrapping_sub(rhs),
		ArithOp::Mul => lhs.wrapping_mul(rhs),
		ArithOp::Div => {
			if rhs == 0 {
				return Err(sys_err("division by zero".to_string()));
			}
			lhs.wrapping_div(rhs)
		}
		ArithOp::Rem => {
			if rhs == 0 {
				return Err(sys_err("remainder by zero".to_string()));
			}
			lhs.wrapping_rem(rhs)
		}
		ArithOp::Shl => lhs.wrapping_shl(rhs as u32),
		ArithOp::Lshr => (lhs as u32).wrapping_shr(rhs as u32) as i32,
		ArithOp::Ashr => lhs.wrapping_shr(rhs as u32),
		ArithOp::And => lhs & rhs,
		ArithOp::Or => lhs | rhs,
		ArithOp::Xor => lhs ^ rhs,
	})
}

fn eval_comp(op: CompOp, lhs: i32, rhs: i32) -> i32 {
	let result = match op {
		CompOp::Eq => lhs == rhs,
		CompOp::Ne => lhs != rhs,
		CompOp::Sgt => lhs > rhs,
		CompOp::Sge => lhs >= rhs,
		CompOp::Slt => lhs < rhs,
		CompOp::Sle => lhs <= rhs,
	};
	result as i32
}

/// Interprets a function over concrete integer arguments. Phis in one
/// block are evaluated in parallel against the edge just traversed.
pub fn run_func(func: &Func, args: &[i32]) -> Result<ExecResult> {
	if args.len() != func.params.len() {
		return Err(sys_err(format!(
			"{} expects {} arguments, got {}",
			func.name,
			func.params.len(),
			args.len()
		)));
	}
	let mut env: HashMap<Temp, i32> = HashMap::new();
	for (param, arg) in func.params.iter().zip(args.iter()) {
		if let Value::Temp(temp) = param {
			env.insert(temp.clone(), *arg);
		}
	}
	let mut cur = func.cfg.get_entry();
	let mut prev_label: Option<Label> = None;
	let mut steps = 0;
	loop {
		let block = cur.borrow();
		let mut phi_values = Vec::new();
		for phi in block.phi_instrs.iter() {
			let label = prev_label.as_ref().ok_or_else(|| {
				sys_err(format!("phi {} in an entry block", phi.target))
			})?;
			let value =
				phi.get_incoming_value_for_block(label).ok_or_else(|| {
					sys_err(format!(
						"phi {} has no source for edge from {}",
						phi.target, label
					))
				})?;
			phi_values.push((phi.target.clone(), value_of(&env, &value)?));
			steps += 1;
		}
		for (temp, value) in phi_values {
			env.insert(temp, value);
		}
		for instr in block.instrs.iter() {
			steps += 1;
			match instr.get_variant() {
				InstrVariant::Arith(v) => {
					let lhs = value_of(&env, &v.lhs)?;
					let rhs = value_of(&env, &v.rhs)?;
					env.insert(v.target.clone(), eval_arith(v.op, lhs, rhs)?);
				}
				InstrVariant::Comp(v) => {
					let lhs = value_of(&env, &v.lhs)?;
					let rhs = value_of(&env, &v.rhs)?;
					env.insert(v.target.clone(), eval_comp(v.op, lhs, rhs));
				}
				_ => {
					return Err(sys_err(format!(
						"control flow in block body: {}",
						instr
					)))
				}
			}
		}
		let jump = block.jump_instr.as_ref().ok_or_else(|| {
			sys_err(format!("block {} has no terminator", block.label()))
		})?;
		steps += 1;
		let next_label = match jump.get_variant() {
			InstrVariant::Ret(v) => {
				let ret =
					v.value.as_ref().map(|x| value_of(&env, x)).transpose()?;
				return Ok(ExecResult { ret, steps });
			}
			InstrVariant::Jump(v) => v.target.clone(),
			InstrVariant::JumpCond(v) => {
				if value_of(&env, &v.cond)? != 0 {
					v.target_true.clone()
				} else {
					v.target_false.clone()
				}
			}
			_ => {
				return Err(sys_err(format!(
					"block {} ends in a non-terminator",
					block.label()
				)))
			}
		};
		if steps > STEP_LIMIT {
			return Err(sys_err(format!("step limit hit in {}", func.name)));
		}
		let cur_label = block.label();
		drop(block);
		prev_label = Some(cur_label);
		cur = func
			.cfg
			.blocks
			.iter()
			.find(|v| v.borrow().label() == next_label)
			.cloned()
			.ok_or_else(|| sys_err(format!("jump to unknown block {}", next_label)))?;
	}
}
