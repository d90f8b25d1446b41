// naive algorithm computing the dominator tree with complexity O(n*m):
// a block dominates exactly the blocks that become unreachable from the
// entry once it is removed from the graph

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{basicblock::Node, cfg::CFG};

pub fn compute_dominator(
	cfg: &CFG,
	dominates: &mut HashMap<i32, Vec<Node>>,
	dominates_directly: &mut HashMap<i32, Vec<Node>>,
	dominator: &mut HashMap<i32, Node>,
) {
	for bb in cfg.blocks.iter() {
		let to_be_removed = bb.borrow().id;

		let mut reachable = HashSet::new();
		let mut worklist = VecDeque::new();
		if to_be_removed != cfg.get_entry().borrow().id {
			worklist.push_back(cfg.get_entry().clone());
		}
		while let Some(cur) = worklist.pop_front() {
			if reachable.contains(&cur.borrow().id) {
				continue;
			}
			reachable.insert(cur.borrow().id);
			for succ in cur.borrow().succ.iter() {
				if succ.borrow().id != to_be_removed {
					worklist.push_back(succ.clone());
				}
			}
		}
		cfg.blocks.iter().for_each(|bb_inner| {
			if !reachable.contains(&bb_inner.borrow().id) {
				dominates.entry(to_be_removed).or_default().push(bb_inner.clone());
			}
		});
	}
	// derive the immediate-dominator relation from the full one
	for bb in cfg.blocks.iter() {
		let bb_id = bb.borrow().id;
		dominates[&bb_id].iter().for_each(|bb_inner| {
			let bb_inner_id = bb_inner.borrow().id;
			if bb_inner_id == bb_id {
				return;
			}
			match dominator.get(&bb_inner_id).cloned() {
				None => {
					dominates_directly
						.entry(bb_id)
						.or_default()
						.push(bb_inner.clone());
					dominator.insert(bb_inner_id, bb.clone());
				}
				Some(old) => {
					let old_id = old.borrow().id;
					// a strictly closer dominator replaces the recorded one
					if dominates[&old_id].iter().any(|v| v.borrow().id == bb_id) {
						dominates_directly
							.entry(bb_id)
							.or_default()
							.push(bb_inner.clone());
						dominates_directly
							.entry(old_id)
							.or_default()
							.retain(|x| x.borrow().id != bb_inner_id);
						dominator.insert(bb_inner_id, bb.clone());
					}
				}
			}
		});
	}
}

/// `a` dominates `b` (reflexively).
pub fn dominates(
	dominates: &HashMap<i32, Vec<Node>>,
	a: i32,
	b: i32,
) -> bool {
	a == b
		|| dominates
			.get(&a)
			.is_some_and(|v| v.iter().any(|x| x.borrow().id == b))
}
