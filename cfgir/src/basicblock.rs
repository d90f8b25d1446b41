use std::{cell::RefCell, collections::HashMap, rc::Rc};

use ssair::{Instr, InstrTrait, PhiInstr, Temp, Value};
use utils::Label;

pub type Node = Rc<RefCell<BasicBlock>>;

pub struct BasicBlock {
	pub id: i32,
	pub prev: Vec<Node>,
	pub succ: Vec<Node>,
	pub phi_instrs: Vec<PhiInstr>,
	pub instrs: Vec<Instr>,
	pub jump_instr: Option<Instr>,
}

impl PartialEq for BasicBlock {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for BasicBlock {}

impl BasicBlock {
	pub fn new(id: i32) -> BasicBlock {
		BasicBlock {
			id,
			prev: Vec::new(),
			succ: Vec::new(),
			phi_instrs: Vec::new(),
			instrs: Vec::new(),
			jump_instr: None,
		}
	}
	pub fn new_node(id: i32) -> Node {
		Rc::new(RefCell::new(Self::new(id)))
	}
	pub fn label(&self) -> Label {
		match self.id {
			0 => Label::new("entry"),
			_ => Label::new(format!("B{}", self.id)),
		}
	}
	pub fn clear(&mut self) {
		self.prev.clear();
		self.succ.clear();
	}
	pub fn push(&mut self, instr: Instr) {
		self.instrs.push(instr);
	}
	pub fn push_phi(&mut self, instr: PhiInstr) {
		self.phi_instrs.push(instr);
	}
	pub fn set_jump(&mut self, instr: Option<Instr>) {
		self.jump_instr = instr;
	}
	pub fn single_prev(&self) -> bool {
		self.prev.len() == 1
	}
	pub fn single_succ(&self) -> bool {
		self.succ.len() == 1
	}
	pub fn no_phi(&self) -> bool {
		self.phi_instrs.is_empty()
	}
	pub fn map_temp(&mut self, map: &HashMap<Temp, Value>) {
		for instr in self.phi_instrs.iter_mut() {
			instr.map_temp(map);
		}
		for instr in self.instrs.iter_mut() {
			instr.map_temp(map);
		}
		for instr in self.jump_instr.iter_mut() {
			instr.map_temp(map);
		}
	}
}
