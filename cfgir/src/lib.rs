pub mod basicblock;
pub mod cfg;
pub mod dominator;
pub mod func;
pub mod looptree;
pub mod program;
pub mod verify;

mod impls;

pub use basicblock::{BasicBlock, Node};
pub use cfg::CFG;
pub use func::Func;
pub use program::Program;
