pub mod errors;
pub mod label;
pub mod math;

pub use errors::*;
pub use label::Label;
