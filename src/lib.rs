pub use cfgir;
pub use optimizer;
pub use simulator;
pub use ssair;
pub use utils;

use cfgir::Program;
use optimizer::{ChainEvolutions, LoopStrengthReduce, Optimizer};
use utils::Result;

/// Runs evolution-based loop strength reduction over the whole program,
/// in place. Returns whether anything changed.
pub fn optimize(program: &mut Program) -> Result<bool> {
	LoopStrengthReduce::<ChainEvolutions>::new().apply(program)
}
