use std::fmt::Display;

use loopevo_derive::OpDisplay;

use crate::{temp::Temp, vartype::VarType};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
	Int(i32),
	Temp(Temp),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, OpDisplay)]
pub enum ArithOp {
	Add,
	Sub,
	Mul,
	Div,
	// modulo
	Rem,
	// shift left
	Shl,
	// logical shift right
	Lshr,
	// arithmetic shift right
	Ashr,
	And,
	Or,
	Xor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, OpDisplay)]
pub enum CompOp {
	Eq,
	Ne,
	// signed greater than
	Sgt,
	// signed greater or equal
	Sge,
	// signed less than
	Slt,
	// signed less or equal
	Sle,
}

impl Value {
	pub fn get_type(&self) -> VarType {
		match self {
			Self::Int(_) => VarType::I32,
			Self::Temp(v) => v.var_type,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Int(v) => write!(f, "{}", v),
			Self::Temp(v) => write!(f, "{}", v),
		}
	}
}
