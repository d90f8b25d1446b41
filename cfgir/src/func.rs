use ssair::{Value, VarType};

use crate::{
	basicblock::{BasicBlock, Node},
	cfg::CFG,
};

pub struct Func {
	// Counts every basic block ever created for this function, so that
	// deleted ids are never reused. Not equal to cfg.blocks.len().
	pub total: i32,
	pub cfg: CFG,
	pub name: String,
	pub ret_type: VarType,
	pub params: Vec<Value>,
}

impl Func {
	pub fn new(
		name: impl ToString,
		ret_type: VarType,
		params: Vec<Value>,
	) -> Self {
		Self {
			total: 0,
			cfg: CFG::new(0),
			name: name.to_string(),
			ret_type,
			params,
		}
	}
	pub fn new_basicblock(&mut self) -> Node {
		self.total += 1;
		BasicBlock::new_node(self.total)
	}
	pub fn len(&self) -> usize {
		self.cfg.blocks.iter().map(|v| v.borrow().instrs.len()).sum()
	}
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
