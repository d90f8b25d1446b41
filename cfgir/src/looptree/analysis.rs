use std::{cell::RefCell, collections::HashMap, rc::Rc};

use log::trace;

use super::{Loop, LoopPtr};
use crate::{
	basicblock::Node,
	cfg::CFG,
	dominator::{compute_dominator, dominates},
};

impl CFG {
	/// Detects every natural loop of the graph. Returns the loops in
	/// program order of their headers together with a map from block id
	/// to the innermost loop containing that block.
	pub fn loop_analysis(&self) -> (Vec<LoopPtr>, HashMap<i32, LoopPtr>) {
		let mut doms = HashMap::new();
		let mut dominates_directly = HashMap::new();
		let mut dominator = HashMap::new();
		compute_dominator(
			self,
			&mut doms,
			&mut dominates_directly,
			&mut dominator,
		);
		let mut loop_map = HashMap::new();
		loop_dfs(
			self.get_entry().clone(),
			&doms,
			&dominates_directly,
			&mut loop_map,
		);
		for v in loop_map.values() {
			calc_loop_level(v);
		}
		// Fill the member lists in program order, the header first because
		// it maps to its own loop and comes before the body blocks.
		for block in self.blocks.iter() {
			let id = block.borrow().id;
			let mut cur = loop_map.get(&id).cloned();
			while let Some(v) = cur {
				v.borrow_mut().add_block(block.clone());
				cur = v.borrow().outer.as_ref().and_then(|v| v.upgrade());
			}
		}
		let mut loops = Vec::new();
		for block in self.blocks.iter() {
			let id = block.borrow().id;
			if let Some(v) = loop_map.get(&id) {
				if v.borrow().header.borrow().id == id {
					trace!("found loop {}", v.borrow());
					loops.push(v.clone());
				}
			}
		}
		(loops, loop_map)
	}
}

// Walks the dominator tree bottom-up. Back edges into `cur_bb` open a new
// loop; blocks already claimed by an inner loop are skipped over by
// re-parenting the inner loop and continuing from its header's preds.
fn loop_dfs(
	cur_bb: Node,
	doms: &HashMap<i32, Vec<Node>>,
	dominates_directly: &HashMap<i32, Vec<Node>>,
	loop_map: &mut HashMap<i32, LoopPtr>,
) {
	let cur_id = cur_bb.borrow().id;
	if let Some(children) = dominates_directly.get(&cur_id) {
		for child in children.iter() {
			loop_dfs(child.clone(), doms, dominates_directly, loop_map);
		}
	}
	let mut bbs: Vec<Node> = cur_bb
		.borrow()
		.prev
		.iter()
		.filter(|v| dominates(doms, cur_id, v.borrow().id))
		.cloned()
		.collect();
	if bbs.is_empty() {
		return;
	}
	let new_loop = Rc::new(RefCell::new(Loop::new(cur_bb.clone())));
	loop_map.insert(cur_id, new_loop.clone());
	while let Some(bb) = bbs.pop() {
		let bb_id = bb.borrow().id;
		if bb_id == cur_id {
			continue;
		}
		match loop_map.get(&bb_id).cloned() {
			None => {
				loop_map.insert(bb_id, new_loop.clone());
				bbs.extend(bb.borrow().prev.iter().cloned());
			}
			Some(mut inner) => {
				loop {
					let outer =
						inner.borrow().outer.as_ref().and_then(|v| v.upgrade());
					match outer {
						Some(outer) => inner = outer,
						None => break,
					}
				}
				if Rc::ptr_eq(&inner, &new_loop) {
					continue;
				}
				inner.borrow_mut().outer = Some(Rc::downgrade(&new_loop));
				let header = inner.borrow().header.clone();
				bbs.extend(header.borrow().prev.iter().cloned());
			}
		}
	}
}

fn calc_loop_level(loop_: &LoopPtr) {
	if loop_.borrow().level != -1 {
		return;
	}
	let outer = loop_.borrow().outer.as_ref().and_then(|v| v.upgrade());
	match outer {
		Some(outer) => {
			calc_loop_level(&outer);
			let level = outer.borrow().level;
			loop_.borrow_mut().level = level + 1;
		}
		None => loop_.borrow_mut().level = 1,
	}
}
