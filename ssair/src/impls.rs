use std::collections::HashMap;

use utils::Label;

use crate::{instr::*, op::Value, temp::Temp, InstrVariant};

fn map_value(value: &mut Value, map: &HashMap<Temp, Value>) {
	if let Value::Temp(t) = value {
		if let Some(new_value) = map.get(t) {
			*value = new_value.clone();
		}
	}
}

fn read_temps(values: &[&Value]) -> Vec<Temp> {
	values.iter().flat_map(|v| v.unwrap_temp()).collect()
}

impl std::fmt::Display for ArithInstr {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"{} = {} {} {}, {}",
			self.target, self.op, self.var_type, self.lhs, self.rhs
		)
	}
}

impl InstrTrait for ArithInstr {
	fn get_variant(&self) -> InstrVariant {
		InstrVariant::Arith(self)
	}
	fn get_read(&self) -> Vec<Temp> {
		read_temps(&[&self.lhs, &self.rhs])
	}
	fn get_write(&self) -> Option<Temp> {
		Some(self.target.clone())
	}
	fn map_temp(&mut self, map: &HashMap<Temp, Value>) {
		map_value(&mut self.lhs, map);
		map_value(&mut self.rhs, map);
	}
	fn is_binary(&self) -> bool {
		true
	}
	fn clone_box(&self) -> Instr {
		Box::new(self.clone())
	}
}

impl std::fmt::Display for CompInstr {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"{} = icmp {} {} {}, {}",
			self.target, self.op, self.var_type, self.lhs, self.rhs
		)
	}
}

impl InstrTrait for CompInstr {
	fn get_variant(&self) -> InstrVariant {
		InstrVariant::Comp(self)
	}
	fn get_read(&self) -> Vec<Temp> {
		read_temps(&[&self.lhs, &self.rhs])
	}
	fn get_write(&self) -> Option<Temp> {
		Some(self.target.clone())
	}
	fn map_temp(&mut self, map: &HashMap<Temp, Value>) {
		map_value(&mut self.lhs, map);
		map_value(&mut self.rhs, map);
	}
	fn clone_box(&self) -> Instr {
		Box::new(self.clone())
	}
}

impl std::fmt::Display for JumpInstr {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "br label %{}", self.target)
	}
}

impl InstrTrait for JumpInstr {
	fn get_variant(&self) -> InstrVariant {
		InstrVariant::Jump(self)
	}
	fn map_label(&mut self, from: &Label, to: &Label) {
		if self.target == *from {
			self.target = to.clone();
		}
	}
	fn clone_box(&self) -> Instr {
		Box::new(self.clone())
	}
}

impl std::fmt::Display for JumpCondInstr {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"br i32 {}, label %{}, label %{}",
			self.cond, self.target_true, self.target_false
		)
	}
}

impl InstrTrait for JumpCondInstr {
	fn get_variant(&self) -> InstrVariant {
		InstrVariant::JumpCond(self)
	}
	fn get_read(&self) -> Vec<Temp> {
		read_temps(&[&self.cond])
	}
	fn map_temp(&mut self, map: &HashMap<Temp, Value>) {
		map_value(&mut self.cond, map);
	}
	fn map_label(&mut self, from: &Label, to: &Label) {
		if self.target_true == *from {
			self.target_true = to.clone();
		}
		if self.target_false == *from {
			self.target_false = to.clone();
		}
	}
	fn is_jump_cond(&self) -> bool {
		true
	}
	fn clone_box(&self) -> Instr {
		Box::new(self.clone())
	}
}

impl std::fmt::Display for PhiInstr {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let source = self
			.source
			.iter()
			.map(|(v, l)| format!("[{}, %{}]", v, l))
			.collect::<Vec<_>>()
			.join(", ");
		write!(f, "{} = phi {} {}", self.target, self.var_type, source)
	}
}

impl InstrTrait for PhiInstr {
	fn get_variant(&self) -> InstrVariant {
		InstrVariant::Phi(self)
	}
	fn get_read(&self) -> Vec<Temp> {
		self.source.iter().flat_map(|(v, _)| v.unwrap_temp()).collect()
	}
	fn get_write(&self) -> Option<Temp> {
		Some(self.target.clone())
	}
	fn map_temp(&mut self, map: &HashMap<Temp, Value>) {
		for (v, _) in self.source.iter_mut() {
			map_value(v, map);
		}
	}
	fn is_phi(&self) -> bool {
		true
	}
	fn clone_box(&self) -> Instr {
		Box::new(self.clone())
	}
}

impl std::fmt::Display for RetInstr {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match &self.value {
			Some(v) => write!(f, "ret {} {}", v.get_type(), v),
			None => write!(f, "ret void"),
		}
	}
}

impl InstrTrait for RetInstr {
	fn get_variant(&self) -> InstrVariant {
		InstrVariant::Ret(self)
	}
	fn get_read(&self) -> Vec<Temp> {
		self.value.iter().flat_map(|v| v.unwrap_temp()).collect()
	}
	fn map_temp(&mut self, map: &HashMap<Temp, Value>) {
		if let Some(v) = self.value.as_mut() {
			map_value(v, map);
		}
	}
	fn is_ret(&self) -> bool {
		true
	}
	fn clone_box(&self) -> Instr {
		Box::new(self.clone())
	}
}
