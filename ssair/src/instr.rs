use std::{collections::HashMap, fmt::Display};

use utils::Label;

use crate::{op::*, temp::Temp, vartype::VarType, InstrVariant};

pub type Instr = Box<dyn InstrTrait>;

pub trait InstrTrait: Display {
	fn get_variant(&self) -> InstrVariant;
	fn get_read(&self) -> Vec<Temp> {
		Vec::new()
	}
	fn get_write(&self) -> Option<Temp> {
		None
	}
	/// Rewrites every read of a mapped temp to the mapped value.
	/// Writes are never touched.
	fn map_temp(&mut self, _map: &HashMap<Temp, Value>) {}
	/// Retargets a terminator label, no-op on everything else.
	fn map_label(&mut self, _from: &Label, _to: &Label) {}
	fn is_phi(&self) -> bool {
		false
	}
	fn is_binary(&self) -> bool {
		false
	}
	fn is_ret(&self) -> bool {
		false
	}
	fn is_jump_cond(&self) -> bool {
		false
	}
	fn clone_box(&self) -> Instr;
}

impl Clone for Instr {
	fn clone(&self) -> Self {
		self.clone_box()
	}
}

#[derive(Clone)]
pub struct ArithInstr {
	pub target: Temp,
	pub op: ArithOp,
	pub var_type: VarType,
	pub lhs: Value,
	pub rhs: Value,
}

#[derive(Clone)]
pub struct CompInstr {
	pub target: Temp,
	pub op: CompOp,
	pub var_type: VarType,
	pub lhs: Value,
	pub rhs: Value,
}

#[derive(Clone)]
pub struct JumpInstr {
	pub target: Label,
}

#[derive(Clone)]
pub struct JumpCondInstr {
	pub cond: Value,
	pub target_true: Label,
	pub target_false: Label,
}

#[derive(Clone)]
pub struct PhiInstr {
	pub target: Temp,
	pub var_type: VarType,
	pub source: Vec<(Value, Label)>,
}

#[derive(Clone)]
pub struct RetInstr {
	pub value: Option<Value>,
}

impl ArithInstr {
	pub fn new(target: Temp, op: ArithOp, lhs: Value, rhs: Value) -> Self {
		Self {
			target,
			op,
			var_type: VarType::I32,
			lhs,
			rhs,
		}
	}
}

impl CompInstr {
	pub fn new(target: Temp, op: CompOp, lhs: Value, rhs: Value) -> Self {
		Self {
			target,
			op,
			var_type: VarType::I32,
			lhs,
			rhs,
		}
	}
}

impl PhiInstr {
	pub fn new(target: Temp, source: Vec<(Value, Label)>) -> Self {
		Self {
			target,
			var_type: VarType::I32,
			source,
		}
	}
	pub fn get_incoming_value_for_block(&self, label: &Label) -> Option<Value> {
		self.source.iter().find(|(_, l)| l == label).map(|(v, _)| v.clone())
	}
	/// Re-keys the source arriving over `from` to arrive over `to`,
	/// used when an edge is split.
	pub fn map_source_label(&mut self, from: &Label, to: &Label) {
		for (_, l) in self.source.iter_mut() {
			if l == from {
				*l = to.clone();
			}
		}
	}
}
