use cfgir::{looptree::LoopPtr, Node};
use ssair::{ArithInstr, ArithOp, PhiInstr, Value, VarType};

use super::{splice::insert_before, FuncSolver};
use crate::evolution::engine::EvolutionEngine;

impl<E: EvolutionEngine> FuncSolver<'_, E> {
	// Materializes the loop's iteration counter: a header phi that is 1 on
	// first entry and previous+1 on every back-edge traversal, with the
	// increment living in a fresh block spliced on the edge entering the
	// latch. Called at most once per loop.
	pub(super) fn insert_inductive(
		&mut self,
		loop_: &LoopPtr,
		preheader: &Node,
		latch: &Node,
	) {
		let header = loop_.borrow().header.clone();
		let counter = self.temp_mgr.new_temp(VarType::I32);
		let inc = self.temp_mgr.new_temp(VarType::I32);
		let inc_instr = ArithInstr::new(
			inc.clone(),
			ArithOp::Add,
			Value::Temp(counter.clone()),
			Value::Int(1),
		);
		let phi = PhiInstr::new(
			counter.clone(),
			vec![
				(Value::Int(1), preheader.borrow().label()),
				(Value::Temp(inc), latch.borrow().label()),
			],
		);
		header.borrow_mut().phi_instrs.insert(0, phi);
		let var = self.fresh_vars[&header.borrow().id];
		self.fresh_values.insert(var, Value::Temp(counter));
		let update = self.func.new_basicblock();
		update.borrow_mut().push(Box::new(inc_instr));
		insert_before(&mut self.func.cfg, latch, &update, loop_);
	}
}
