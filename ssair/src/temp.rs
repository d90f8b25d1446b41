use std::fmt::Display;

use crate::{op::Value, vartype::VarType};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temp {
	pub name: String,
	pub var_type: VarType,
}

impl Display for Temp {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "%{}", self.name)
	}
}

impl Temp {
	pub fn new(name: impl Display, var_type: VarType) -> Self {
		Self {
			name: name.to_string(),
			var_type,
		}
	}
}

impl Value {
	pub fn unwrap_temp(&self) -> Option<Temp> {
		match self {
			Self::Temp(v) => Some(v.clone()),
			_ => None,
		}
	}
	pub fn is_num(&self) -> bool {
		matches!(self, Self::Int(_))
	}
}

#[derive(Default)]
pub struct TempManager {
	pub total: u32,
}

impl TempManager {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn new_temp(&mut self, var_type: VarType) -> Temp {
		self.total += 1;
		Temp::new(self.total, var_type)
	}
}
