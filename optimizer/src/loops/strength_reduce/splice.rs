use cfgir::{
	cfg::{force_link_node, unlink_node, CFG},
	looptree::LoopPtr,
	Node,
};
use ssair::JumpInstr;

/// Inserts `new_block` along the edge entering `target`, which must have
/// its relevant predecessor first in its predecessor list (true at both
/// call sites: the latch and the header's single successor each have one
/// predecessor when spliced). The new block joins `loop_` and sits
/// immediately before `target` in program order.
pub fn insert_before(
	cfg: &mut CFG,
	target: &Node,
	new_block: &Node,
	loop_: &LoopPtr,
) {
	let pred = target.borrow().prev.first().unwrap().clone();
	let target_label = target.borrow().label();
	let pred_label = pred.borrow().label();
	let new_label = new_block.borrow().label();
	new_block.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: target_label.clone(),
	})));
	unlink_node(&pred, target);
	force_link_node(&pred, new_block);
	force_link_node(new_block, target);
	if let Some(jump) = pred.borrow_mut().jump_instr.as_mut() {
		jump.map_label(&target_label, &new_label);
	}
	for phi in target.borrow_mut().phi_instrs.iter_mut() {
		phi.map_source_label(&pred_label, &new_label);
	}
	loop_.borrow_mut().add_block(new_block.clone());
	let target_id = target.borrow().id;
	let pos = cfg
		.blocks
		.iter()
		.position(|v| v.borrow().id == target_id)
		.unwrap();
	cfg.blocks.insert(pos, new_block.clone());
}
