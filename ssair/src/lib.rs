pub mod instr;
pub mod op;
pub mod temp;
pub mod vartype;

mod impls;

pub use instr::*;
pub use op::*;
pub use temp::*;
pub use vartype::*;

/// Borrowed view into a type-erased instruction, for code that needs to
/// look inside (the simulator, the recurrence extractor).
pub enum InstrVariant<'a> {
	Arith(&'a ArithInstr),
	Comp(&'a CompInstr),
	Jump(&'a JumpInstr),
	JumpCond(&'a JumpCondInstr),
	Phi(&'a PhiInstr),
	Ret(&'a RetInstr),
}
