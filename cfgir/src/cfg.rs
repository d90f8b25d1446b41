pub use crate::basicblock::{BasicBlock, Node};

pub struct CFG {
	pub blocks: Vec<Node>,
}

impl CFG {
	pub fn new(id: i32) -> Self {
		Self {
			blocks: vec![BasicBlock::new_node(id)],
		}
	}
	pub fn get_entry(&self) -> Node {
		self.blocks.first().unwrap().clone()
	}
	pub fn size(&self) -> usize {
		self.blocks.len()
	}
}

/// Links an edge only while `from` has no terminator yet, for graph
/// construction.
pub fn link_node(from: &Node, to: &Node) {
	if from.borrow().jump_instr.is_none() {
		force_link_node(from, to);
	}
}

pub fn force_link_node(from: &Node, to: &Node) {
	from.borrow_mut().succ.push(to.clone());
	to.borrow_mut().prev.push(from.clone());
}

pub fn unlink_node(from: &Node, to: &Node) {
	let from_id = from.borrow().id;
	let to_id = to.borrow().id;
	from.borrow_mut().succ.retain(|v| v.borrow().id != to_id);
	to.borrow_mut().prev.retain(|v| v.borrow().id != from_id);
}
