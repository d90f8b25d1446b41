pub mod evolution;
pub mod loops;
pub mod rational;

pub use evolution::{
	chains::ChainEvolutions,
	engine::{EvolutionEngine, Recurrence, Step},
	ApplyKind, Evolution, IterVar,
};
pub use loops::strength_reduce::LoopStrengthReduce;
pub use rational::Rational;

use cfgir::Program;
use utils::Result;

/// Protocol every pass follows; the returned flag reports whether the
/// program changed.
pub trait Optimizer {
	fn new() -> Self;
	fn apply(self, program: &mut Program) -> Result<bool>;
}
