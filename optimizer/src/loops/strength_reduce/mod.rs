use std::collections::HashMap;

use cfgir::Func;
use ssair::{Temp, TempManager, Value};

use crate::evolution::{engine::EvolutionEngine, Evolution, IterVar};

mod codegen;
mod counter;
mod impls;
mod splice;

pub use codegen::EvoCodegen;
pub use splice::insert_before;

/// Strength reduction of loop-carried recurrences: each header phi with a
/// resolved closed-form evolution is recomputed from a materialized
/// per-loop iteration counter, and the recurrence chain is swept.
pub struct LoopStrengthReduce<E: EvolutionEngine> {
	engine: E,
}

// All per-function state; built and dropped inside one function's visit,
// nothing survives across functions.
struct FuncSolver<'a, E: EvolutionEngine> {
	engine: &'a mut E,
	func: &'a mut Func,
	temp_mgr: &'a mut TempManager,
	/// header phi target -> owning loop's header id
	loop_phis: HashMap<Temp, i32>,
	/// defining temp -> header id of the loop claiming it, first claim wins
	inst_loop: HashMap<Temp, i32>,
	/// resolved closed forms, keyed by phi target
	phi_evo: HashMap<Temp, Evolution>,
	/// header id -> that loop's iteration variable
	fresh_vars: HashMap<i32, IterVar>,
	/// iteration variable -> materialized counter value
	fresh_values: HashMap<IterVar, Value>,
}

impl<'a, E: EvolutionEngine> FuncSolver<'a, E> {
	fn new(
		engine: &'a mut E,
		func: &'a mut Func,
		temp_mgr: &'a mut TempManager,
	) -> Self {
		Self {
			engine,
			func,
			temp_mgr,
			loop_phis: HashMap::new(),
			inst_loop: HashMap::new(),
			phi_evo: HashMap::new(),
			fresh_vars: HashMap::new(),
			fresh_values: HashMap::new(),
		}
	}
}
