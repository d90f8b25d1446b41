pub mod simulator;

pub use simulator::{run_func, ExecResult};
