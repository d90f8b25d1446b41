use std::{
	cell::RefCell,
	fmt::Display,
	rc::{Rc, Weak},
};

use crate::basicblock::Node;

pub mod analysis;

pub type LoopPtr = Rc<RefCell<Loop>>;

// A natural loop detected in the flow graph. `blocks` holds every block
// of the loop, including the blocks of nested loops.
pub struct Loop {
	pub outer: Option<Weak<RefCell<Loop>>>,
	pub header: Node,
	pub level: i32,
	pub blocks: Vec<Node>,
}

impl PartialEq for Loop {
	fn eq(&self, other: &Self) -> bool {
		self.header.borrow().id == other.header.borrow().id
	}
}

impl Eq for Loop {}

impl Loop {
	pub fn new(header: Node) -> Self {
		Self {
			outer: None,
			header,
			level: -1,
			blocks: Vec::new(),
		}
	}
	pub fn contains_block(&self, id: i32) -> bool {
		self.blocks.iter().any(|v| v.borrow().id == id)
	}
	pub fn add_block(&mut self, block: Node) {
		self.blocks.push(block);
	}
	/// Number of distinct edges entering the header from outside the loop.
	/// Canonicalized single-entry loops have exactly one.
	pub fn entry_count(&self) -> usize {
		self
			.header
			.borrow()
			.prev
			.iter()
			.filter(|v| !self.contains_block(v.borrow().id))
			.count()
	}
	/// The unique predecessor of the header outside the loop, if any.
	pub fn get_preheader(&self) -> Option<Node> {
		let header = self.header.borrow();
		let mut outside =
			header.prev.iter().filter(|v| !self.contains_block(v.borrow().id));
		let preheader = outside.next()?;
		outside.next().is_none().then(|| preheader.clone())
	}
	/// The unique in-loop predecessor of the header, if any.
	pub fn get_latch(&self) -> Option<Node> {
		let header = self.header.borrow();
		let mut inside =
			header.prev.iter().filter(|v| self.contains_block(v.borrow().id));
		let latch = inside.next()?;
		inside.next().is_none().then(|| latch.clone())
	}
}

impl Display for Loop {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let outer = if let Some(outer) = self.outer.as_ref().and_then(Weak::upgrade)
		{
			format!("{}", outer.borrow().header.borrow().id)
		} else {
			"None".to_string()
		};
		write!(
			f,
			"outer: {}, header: {}, level: {}, blocks: {:?}",
			outer,
			self.header.borrow().id,
			self.level,
			self.blocks.iter().map(|v| v.borrow().id).collect::<Vec<_>>()
		)
	}
}
