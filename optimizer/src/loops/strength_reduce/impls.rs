use std::collections::{HashMap, HashSet};

use cfgir::{looptree::LoopPtr, verify::verify_func, Program};
use log::trace;
use ssair::{InstrTrait, PhiInstr, Temp};
use utils::Result;

use super::{
	codegen::EvoCodegen, splice::insert_before, FuncSolver, LoopStrengthReduce,
};
use crate::{
	evolution::{engine::EvolutionEngine, IterVar},
	Optimizer,
};

impl<E: EvolutionEngine + Default> Optimizer for LoopStrengthReduce<E> {
	fn new() -> Self {
		Self {
			engine: E::default(),
		}
	}

	fn apply(mut self, program: &mut Program) -> Result<bool> {
		let mut changed = false;
		for func in program.funcs.iter_mut() {
			let solver =
				FuncSolver::new(&mut self.engine, func, &mut program.temp_mgr);
			changed |= solver.solve()?;
		}
		Ok(changed)
	}
}

impl<E: EvolutionEngine> FuncSolver<'_, E> {
	pub(super) fn solve(mut self) -> Result<bool> {
		self.engine.reset();
		self.record_loop_membership();
		self.feed_engine();
		self.resolve_evolutions();
		let mut changed = false;
		let (loops, _) = self.func.cfg.loop_analysis();
		for loop_ in loops.iter() {
			changed |= self.visit_loop(loop_);
		}
		verify_func(self.func)?;
		Ok(changed)
	}

	// Records the owning loop of every header phi and, first claim wins,
	// of every defining temp in loop bodies. Blocks are visited in program
	// order and attributed to their innermost loop.
	fn record_loop_membership(&mut self) {
		let (_, loop_map) = self.func.cfg.loop_analysis();
		for block in self.func.cfg.blocks.iter() {
			let id = block.borrow().id;
			let Some(loop_) = loop_map.get(&id) else {
				continue;
			};
			let header_id = loop_.borrow().header.borrow().id;
			let block = block.borrow();
			for phi in block.phi_instrs.iter() {
				if id == header_id {
					self.loop_phis.insert(phi.target.clone(), header_id);
				}
				self.inst_loop.entry(phi.target.clone()).or_insert(header_id);
			}
			for instr in block.instrs.iter() {
				if let Some(target) = instr.get_write() {
					self.inst_loop.entry(target).or_insert(header_id);
				}
			}
		}
	}

	fn feed_engine(&mut self) {
		for block in self.func.cfg.blocks.iter() {
			let block = block.borrow();
			for phi in block.phi_instrs.iter() {
				self.engine.extract_recurrence(phi);
			}
			for instr in block.instrs.iter() {
				self.engine.extract_recurrence(instr.as_ref());
			}
			if let Some(jump) = block.jump_instr.as_ref() {
				self.engine.extract_recurrence(jump.as_ref());
			}
		}
	}

	// Allocates one iteration variable per loop owning tracked phis, then
	// asks the engine for each phi's closed form. A loop keeps its
	// variable only when at least one of its phis resolved, so no counter
	// is materialized that nothing reads.
	fn resolve_evolutions(&mut self) {
		let (loops, _) = self.func.cfg.loop_analysis();
		let mut total_vars = 0;
		for loop_ in loops.iter() {
			let header = loop_.borrow().header.clone();
			let header_id = header.borrow().id;
			if header.borrow().no_phi() {
				continue;
			}
			self.fresh_vars.insert(header_id, IterVar(total_vars));
			total_vars += 1;
		}
		let mut resolved: HashSet<i32> = HashSet::new();
		for loop_ in loops.iter() {
			let header = loop_.borrow().header.clone();
			let header_id = header.borrow().id;
			let Some(var) = self.fresh_vars.get(&header_id).copied() else {
				continue;
			};
			let (Some(preheader), Some(latch)) =
				(loop_.borrow().get_preheader(), loop_.borrow().get_latch())
			else {
				continue;
			};
			let preheader_label = preheader.borrow().label();
			let latch_label = latch.borrow().label();
			for phi in header.borrow().phi_instrs.iter() {
				// only phis tracked at discovery time are candidates
				if self.loop_phis.get(&phi.target) != Some(&header_id) {
					continue;
				}
				if !self.step_belongs_to(phi, &latch_label, header_id) {
					continue;
				}
				let Some(eq) = self.engine.build_equation(
					phi,
					&preheader_label,
					&latch_label,
				) else {
					continue;
				};
				let Some(evo) = self.engine.evaluate(&eq, var) else {
					continue;
				};
				trace!("resolved {} as {}", phi.target, evo);
				self.phi_evo.insert(phi.target.clone(), evo);
				resolved.insert(header_id);
			}
		}
		self.fresh_vars.retain(|id, _| resolved.contains(id));
	}

	// The recurrence instruction feeding the phi over the back edge must
	// be claimed by the phi's own loop, or the closed form would describe
	// a different iteration space.
	fn step_belongs_to(
		&self,
		phi: &PhiInstr,
		latch_label: &utils::Label,
		header_id: i32,
	) -> bool {
		let step = phi
			.get_incoming_value_for_block(latch_label)
			.and_then(|v| v.unwrap_temp());
		match step {
			Some(temp) => {
				self.inst_loop.get(&temp).is_none_or(|v| *v == header_id)
			}
			None => true,
		}
	}

	fn visit_loop(&mut self, loop_: &LoopPtr) -> bool {
		let header = loop_.borrow().header.clone();
		let header_id = header.borrow().id;
		if !self.fresh_vars.contains_key(&header_id) {
			return false;
		}
		if loop_.borrow().entry_count() != 1 {
			trace!("loop at {} skipped: multiple entries", header.borrow().label());
			return false;
		}
		let (Some(preheader), Some(latch)) =
			(loop_.borrow().get_preheader(), loop_.borrow().get_latch())
		else {
			return false;
		};
		if !latch.borrow().single_prev() || !header.borrow().single_succ() {
			return false;
		}
		self.insert_inductive(loop_, &preheader, &latch);
		self.rebuild(loop_);
		self.clear_unused(loop_);
		true
	}

	// Lowers every resolved phi of the loop; each success lands in a fresh
	// block on the header's successor edge and every use of the phi is
	// rewired to the generated value.
	fn rebuild(&mut self, loop_: &LoopPtr) {
		let header = loop_.borrow().header.clone();
		let phis: Vec<PhiInstr> = header.borrow().phi_instrs.clone();
		for phi in phis {
			let Some(evo) = self.phi_evo.get(&phi.target).cloned() else {
				continue;
			};
			let mut collector = Vec::new();
			let mut codegen = EvoCodegen {
				temp_mgr: self.temp_mgr,
				fresh_values: &self.fresh_values,
			};
			let Some(value) = codegen.lower(&evo, &mut collector) else {
				trace!("lowering {} failed, phi left in place", phi.target);
				continue;
			};
			if !collector.is_empty() {
				// the generated block sits below the header, so it cannot
				// feed a use inside the header itself
				if self.read_in_header(&header, &phi.target) {
					trace!("{} has header-resident uses, left in place", phi.target);
					continue;
				}
				let block = self.func.new_basicblock();
				block.borrow_mut().instrs = collector;
				let target = header.borrow().succ.first().unwrap().clone();
				insert_before(&mut self.func.cfg, &target, &block, loop_);
			}
			let map = HashMap::from([(phi.target.clone(), value)]);
			for block in self.func.cfg.blocks.iter() {
				block.borrow_mut().map_temp(&map);
			}
		}
	}

	fn read_in_header(&self, header: &cfgir::Node, target: &Temp) -> bool {
		let header = header.borrow();
		header
			.instrs
			.iter()
			.chain(header.jump_instr.iter())
			.any(|v| v.get_read().contains(target))
	}

	// Single pass over the loop's blocks in program order: removals
	// cascade forward into later blocks but never backward.
	fn clear_unused(&mut self, loop_: &LoopPtr) {
		let mut uses: HashMap<Temp, usize> = HashMap::new();
		for block in self.func.cfg.blocks.iter() {
			let block = block.borrow();
			let reads = block
				.phi_instrs
				.iter()
				.flat_map(|v| v.get_read())
				.chain(block.instrs.iter().flat_map(|v| v.get_read()))
				.chain(block.jump_instr.iter().flat_map(|v| v.get_read()));
			for temp in reads {
				*uses.entry(temp).or_default() += 1;
			}
		}
		let loop_ref = loop_.borrow();
		for node in loop_ref.blocks.iter() {
			let mut block = node.borrow_mut();
			let mut removed_reads = Vec::new();
			block.phi_instrs.retain(|phi| {
				let live = uses.get(&phi.target).copied().unwrap_or(0) != 0;
				if !live {
					trace!("sweeping dead phi {}", phi.target);
					removed_reads.extend(phi.get_read());
				}
				live
			});
			block.instrs.retain(|instr| {
				let live = !instr.is_binary()
					|| instr
						.get_write()
						.is_none_or(|v| uses.get(&v).copied().unwrap_or(0) != 0);
				if !live {
					removed_reads.extend(instr.get_read());
				}
				live
			});
			for temp in removed_reads {
				if let Some(count) = uses.get_mut(&temp) {
					*count = count.saturating_sub(1);
				}
			}
		}
	}
}
