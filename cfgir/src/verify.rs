use std::collections::{HashMap, HashSet};

use ssair::{InstrVariant, Temp, Value};
use utils::{Label, LoopEvoError, Result};

use crate::{
	dominator::{compute_dominator, dominates},
	func::Func,
};

fn err(msg: String) -> LoopEvoError {
	LoopEvoError::VerifyError(msg)
}

/// Structural well-formedness of a function: symmetric edges, terminator
/// targets matching successors, phi sources matching predecessors, single
/// static assignment and defs dominating uses.
pub fn verify_func(func: &Func) -> Result<()> {
	check_edges(func)?;
	check_phi_sources(func)?;
	check_ssa(func)
}

fn check_edges(func: &Func) -> Result<()> {
	for block in func.cfg.blocks.iter() {
		let block = block.borrow();
		for succ in block.succ.iter() {
			if !succ.borrow().prev.iter().any(|v| v.borrow().id == block.id) {
				return Err(err(format!(
					"edge {} -> {} is not recorded backwards",
					block.label(),
					succ.borrow().label()
				)));
			}
		}
		for prev in block.prev.iter() {
			if !prev.borrow().succ.iter().any(|v| v.borrow().id == block.id) {
				return Err(err(format!(
					"edge {} -> {} is not recorded forwards",
					prev.borrow().label(),
					block.label()
				)));
			}
		}
		let jump = block.jump_instr.as_ref().ok_or_else(|| {
			err(format!("block {} has no terminator", block.label()))
		})?;
		let targets: Vec<Label> = match jump.get_variant() {
			InstrVariant::Jump(v) => vec![v.target.clone()],
			InstrVariant::JumpCond(v) => {
				vec![v.target_true.clone(), v.target_false.clone()]
			}
			InstrVariant::Ret(_) => Vec::new(),
			_ => {
				return Err(err(format!(
					"block {} ends in a non-terminator",
					block.label()
				)))
			}
		};
		let succ_labels: HashSet<Label> =
			block.succ.iter().map(|v| v.borrow().label()).collect();
		let target_labels: HashSet<Label> = targets.iter().cloned().collect();
		if succ_labels != target_labels {
			return Err(err(format!(
				"block {} jumps to {:?} but has successors {:?}",
				block.label(),
				target_labels,
				succ_labels
			)));
		}
	}
	Ok(())
}

fn check_phi_sources(func: &Func) -> Result<()> {
	for block in func.cfg.blocks.iter() {
		let block = block.borrow();
		let prev_labels: HashSet<Label> =
			block.prev.iter().map(|v| v.borrow().label()).collect();
		for phi in block.phi_instrs.iter() {
			let source_labels: HashSet<Label> =
				phi.source.iter().map(|(_, l)| l.clone()).collect();
			if source_labels != prev_labels
				|| phi.source.len() != prev_labels.len()
			{
				return Err(err(format!(
					"phi {} in block {} reads from {:?} but predecessors are {:?}",
					phi.target,
					block.label(),
					source_labels,
					prev_labels
				)));
			}
		}
	}
	Ok(())
}

fn check_ssa(func: &Func) -> Result<()> {
	// where each temp is defined: block id, plus its in-block position
	// (phis count as position 0)
	let mut def_site: HashMap<Temp, (i32, usize)> = HashMap::new();
	for param in func.params.iter() {
		if let Value::Temp(temp) = param {
			def_site.insert(temp.clone(), (func.cfg.get_entry().borrow().id, 0));
		}
	}
	for block in func.cfg.blocks.iter() {
		let block = block.borrow();
		for phi in block.phi_instrs.iter() {
			if def_site.insert(phi.target.clone(), (block.id, 0)).is_some() {
				return Err(err(format!("temp {} defined twice", phi.target)));
			}
		}
		for (pos, instr) in block.instrs.iter().enumerate() {
			if let Some(target) = instr.get_write() {
				if def_site.insert(target.clone(), (block.id, pos + 1)).is_some() {
					return Err(err(format!("temp {} defined twice", target)));
				}
			}
		}
	}
	let mut doms = HashMap::new();
	let mut dominates_directly = HashMap::new();
	let mut dominator = HashMap::new();
	compute_dominator(
		&func.cfg,
		&mut doms,
		&mut dominates_directly,
		&mut dominator,
	);
	let check_use =
		|temp: &Temp, use_block: i32, use_pos: usize| -> Result<()> {
			let (def_block, def_pos) = def_site.get(temp).ok_or_else(|| {
				err(format!("temp {} is used but never defined", temp))
			})?;
			let ok = if *def_block == use_block {
				*def_pos < use_pos
			} else {
				dominates(&doms, *def_block, use_block)
			};
			if !ok {
				return Err(err(format!(
					"use of {} in block {} is not dominated by its definition",
					temp, use_block
				)));
			}
			Ok(())
		};
	for block in func.cfg.blocks.iter() {
		let block = block.borrow();
		// a phi operand only has to be defined along its incoming edge
		let label_to_id: HashMap<Label, i32> = block
			.prev
			.iter()
			.map(|v| (v.borrow().label(), v.borrow().id))
			.collect();
		for phi in block.phi_instrs.iter() {
			for (value, label) in phi.source.iter() {
				if let Value::Temp(temp) = value {
					let pred_id = label_to_id[label];
					check_use(temp, pred_id, usize::MAX)?;
				}
			}
		}
		for (pos, instr) in block.instrs.iter().enumerate() {
			for temp in instr.get_read() {
				check_use(&temp, block.id, pos + 1)?;
			}
		}
		if let Some(jump) = block.jump_instr.as_ref() {
			for temp in jump.get_read() {
				check_use(&temp, block.id, usize::MAX)?;
			}
		}
	}
	Ok(())
}
