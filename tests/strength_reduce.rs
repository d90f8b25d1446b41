use anyhow::Result;
use cfgir::{cfg::force_link_node, Func, Program};
use loopevo::optimize;
use simulator::run_func;
use ssair::{
	ArithInstr, ArithOp, CompInstr, CompOp, InstrTrait, JumpCondInstr,
	JumpInstr, PhiInstr, RetInstr, Temp, Value, VarType,
};

fn temp(name: &str) -> Temp {
	Temp::new(name, VarType::I32)
}

// Canonical single-entry loop:
//   entry -> header -> body -> latch -> header, body -> exit
// Each `(name, init, op, rhs)` becomes a header phi stepped by
// `name.next = op name, rhs` in the body; the first phi controls the trip
// count through `cond = sle first, trips`.
fn build_loop(phis: &[(&str, i32, ArithOp, Value)], trips: i32, ret: &str) -> Func {
	let mut func = Func::new("f", VarType::I32, Vec::new());
	let header = func.new_basicblock();
	let body = func.new_basicblock();
	let latch = func.new_basicblock();
	let exit = func.new_basicblock();
	for node in [&header, &body, &latch, &exit] {
		func.cfg.blocks.push((*node).clone());
	}
	let entry = func.cfg.get_entry();
	entry.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: header.borrow().label(),
	})));
	force_link_node(&entry, &header);
	for (name, init, _, _) in phis.iter() {
		header.borrow_mut().push_phi(PhiInstr::new(
			temp(name),
			vec![
				(Value::Int(*init), entry.borrow().label()),
				(
					Value::Temp(temp(&format!("{}.next", name))),
					latch.borrow().label(),
				),
			],
		));
	}
	header.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: body.borrow().label(),
	})));
	force_link_node(&header, &body);
	body.borrow_mut().push(Box::new(CompInstr::new(
		temp("cond"),
		CompOp::Sle,
		Value::Temp(temp(phis[0].0)),
		Value::Int(trips),
	)));
	for (name, _, op, rhs) in phis.iter() {
		body.borrow_mut().push(Box::new(ArithInstr::new(
			temp(&format!("{}.next", name)),
			*op,
			Value::Temp(temp(name)),
			rhs.clone(),
		)));
	}
	body.borrow_mut().set_jump(Some(Box::new(JumpCondInstr {
		cond: Value::Temp(temp("cond")),
		target_true: latch.borrow().label(),
		target_false: exit.borrow().label(),
	})));
	force_link_node(&body, &latch);
	force_link_node(&body, &exit);
	latch.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: header.borrow().label(),
	})));
	force_link_node(&latch, &header);
	exit.borrow_mut().set_jump(Some(Box::new(RetInstr {
		value: Some(Value::Temp(temp(ret))),
	})));
	func
}

fn run_pass(func: Func) -> Result<(Func, bool)> {
	let mut program = Program::new();
	program.funcs.push(func);
	let changed = optimize(&mut program)?;
	Ok((program.funcs.pop().unwrap(), changed))
}

#[test]
fn test_increment_loop_reduces_to_counter() -> Result<()> {
	let func = build_loop(&[("n", 1, ArithOp::Add, Value::Int(1))], 5, "n");
	let before = run_func(&func, &[])?;
	let (func, changed) = run_pass(func)?;
	assert!(changed);
	let after = run_func(&func, &[])?;
	assert_eq!(before.ret, after.ret);
	assert_eq!(after.ret, Some(6));
	// the original phi collapsed into the materialized counter
	let header = func.cfg.blocks[1].clone();
	let header = header.borrow();
	assert_eq!(header.phi_instrs.len(), 1);
	let counter = &header.phi_instrs[0];
	assert_eq!(counter.source.len(), 2);
	assert_eq!(counter.source[0].0, Value::Int(1));
	assert_eq!(counter.source[0].1.name, "entry");
	// the recurrence instruction was swept
	assert!(!func.to_string().contains("n.next"));
	Ok(())
}

#[test]
fn test_counter_is_one_based_per_iteration() -> Result<()> {
	for trips in [0, 1, 5, 10] {
		let func =
			build_loop(&[("n", 1, ArithOp::Add, Value::Int(1))], trips, "n");
		let (func, _) = run_pass(func)?;
		// the header value is 1 on first entry and previous+1 per back
		// edge, so the exit observes trips+1
		assert_eq!(run_func(&func, &[])?.ret, Some(trips + 1));
	}
	Ok(())
}

#[test]
fn test_halving_loop_becomes_shift() -> Result<()> {
	let func = build_loop(
		&[
			("n", 1, ArithOp::Add, Value::Int(1)),
			("v", 2048, ArithOp::Div, Value::Int(2)),
		],
		5,
		"v",
	);
	let before = run_func(&func, &[])?;
	let (func, changed) = run_pass(func)?;
	assert!(changed);
	assert_eq!(run_func(&func, &[])?.ret, before.ret);
	assert_eq!(before.ret, Some(64));
	// exact halving through a right shift, no division left
	let printed = func.to_string();
	assert!(!printed.contains(" div "));
	assert!(printed.contains(" ashr "));
	Ok(())
}

#[test]
fn test_doubling_loop_becomes_shift() -> Result<()> {
	let func = build_loop(
		&[
			("n", 1, ArithOp::Add, Value::Int(1)),
			("v", 3, ArithOp::Mul, Value::Int(2)),
		],
		5,
		"v",
	);
	let before = run_func(&func, &[])?;
	let (func, _) = run_pass(func)?;
	assert_eq!(run_func(&func, &[])?.ret, before.ret);
	assert_eq!(before.ret, Some(96));
	let printed = func.to_string();
	assert!(!printed.contains(" mul "));
	assert!(printed.contains(" shl "));
	Ok(())
}

#[test]
fn test_shift_recurrence() -> Result<()> {
	let func = build_loop(
		&[
			("n", 1, ArithOp::Add, Value::Int(1)),
			("v", 1, ArithOp::Shl, Value::Int(1)),
		],
		4,
		"v",
	);
	let before = run_func(&func, &[])?;
	let (func, _) = run_pass(func)?;
	assert_eq!(run_func(&func, &[])?.ret, before.ret);
	assert_eq!(before.ret, Some(16));
	Ok(())
}

#[test]
fn test_countdown_loop() -> Result<()> {
	let func = build_loop(
		&[
			("n", 1, ArithOp::Add, Value::Int(1)),
			("v", 100, ArithOp::Sub, Value::Int(3)),
		],
		6,
		"v",
	);
	let before = run_func(&func, &[])?;
	let (func, _) = run_pass(func)?;
	assert_eq!(run_func(&func, &[])?.ret, before.ret);
	assert_eq!(before.ret, Some(82));
	Ok(())
}

#[test]
fn test_unsupported_recurrence_left_alone() -> Result<()> {
	// f accumulates a factorial; its step multiplies by another phi, so
	// no closed form exists and only n is reduced
	let func = build_loop(
		&[
			("n", 1, ArithOp::Add, Value::Int(1)),
			("f", 1, ArithOp::Mul, Value::Temp(temp("n"))),
		],
		5,
		"f",
	);
	let before = run_func(&func, &[])?;
	let (func, changed) = run_pass(func)?;
	assert!(changed);
	assert_eq!(run_func(&func, &[])?.ret, before.ret);
	assert_eq!(before.ret, Some(120));
	// counter plus the untouched factorial phi
	let header = func.cfg.blocks[1].clone();
	assert_eq!(header.borrow().phi_instrs.len(), 2);
	assert_eq!(header.borrow().phi_instrs[1].target, temp("f"));
	Ok(())
}

#[test]
fn test_negative_division_left_alone() -> Result<()> {
	// -7 / 2 truncates toward zero, so an ashr rendition would drift;
	// the recurrence must survive untouched
	let func = build_loop(
		&[
			("n", 1, ArithOp::Add, Value::Int(1)),
			("v", -7, ArithOp::Div, Value::Int(2)),
		],
		3,
		"v",
	);
	let before = run_func(&func, &[])?;
	let (func, changed) = run_pass(func)?;
	assert!(changed);
	assert_eq!(run_func(&func, &[])?.ret, before.ret);
	// -7, -3, -1, 0
	assert_eq!(before.ret, Some(0));
	let printed = func.to_string();
	assert!(printed.contains(" div "));
	assert!(!printed.contains(" ashr "));
	// counter plus the untouched division phi
	let header = func.cfg.blocks[1].clone();
	assert_eq!(header.borrow().phi_instrs.len(), 2);
	assert_eq!(header.borrow().phi_instrs[1].target, temp("v"));
	Ok(())
}

#[test]
fn test_value_read_in_header_left_in_place() -> Result<()> {
	// the header itself reads the phi, so generated code spliced below
	// the header could not dominate that use; the phi must stay
	let mut func = Func::new("f", VarType::I32, Vec::new());
	let header = func.new_basicblock();
	let body = func.new_basicblock();
	let latch = func.new_basicblock();
	let exit = func.new_basicblock();
	for node in [&header, &body, &latch, &exit] {
		func.cfg.blocks.push((*node).clone());
	}
	let entry = func.cfg.get_entry();
	entry.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: header.borrow().label(),
	})));
	force_link_node(&entry, &header);
	header.borrow_mut().push_phi(PhiInstr::new(
		temp("n"),
		vec![
			(Value::Int(1), entry.borrow().label()),
			(Value::Temp(temp("n.next")), latch.borrow().label()),
		],
	));
	header.borrow_mut().push(Box::new(ArithInstr::new(
		temp("t"),
		ArithOp::Add,
		Value::Temp(temp("n")),
		Value::Int(5),
	)));
	header.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: body.borrow().label(),
	})));
	force_link_node(&header, &body);
	body.borrow_mut().push(Box::new(CompInstr::new(
		temp("cond"),
		CompOp::Sle,
		Value::Temp(temp("n")),
		Value::Int(9),
	)));
	body.borrow_mut().push(Box::new(ArithInstr::new(
		temp("n.next"),
		ArithOp::Add,
		Value::Temp(temp("n")),
		Value::Int(2),
	)));
	body.borrow_mut().set_jump(Some(Box::new(JumpCondInstr {
		cond: Value::Temp(temp("cond")),
		target_true: latch.borrow().label(),
		target_false: exit.borrow().label(),
	})));
	force_link_node(&body, &latch);
	force_link_node(&body, &exit);
	latch.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: header.borrow().label(),
	})));
	force_link_node(&latch, &header);
	exit.borrow_mut().set_jump(Some(Box::new(RetInstr {
		value: Some(Value::Temp(temp("t"))),
	})));
	let before = run_func(&func, &[])?;
	let (func, changed) = run_pass(func)?;
	assert!(changed);
	assert_eq!(run_func(&func, &[])?.ret, before.ret);
	// n exits at 11, t = 11 + 5
	assert_eq!(before.ret, Some(16));
	// counter materialized, but n kept for its header-resident use
	let header = func.cfg.blocks[1].clone();
	let header = header.borrow();
	assert_eq!(header.phi_instrs.len(), 2);
	assert_eq!(header.phi_instrs[1].target, temp("n"));
	assert!(header.instrs.iter().any(|v| v.get_write() == Some(temp("t"))));
	Ok(())
}

#[test]
fn test_loop_without_phis_is_untouched() -> Result<()> {
	// entry -> header -> body -> latch -> header, body -> exit, no phis
	let mut func = Func::new("f", VarType::I32, Vec::new());
	let header = func.new_basicblock();
	let body = func.new_basicblock();
	let latch = func.new_basicblock();
	let exit = func.new_basicblock();
	for node in [&header, &body, &latch, &exit] {
		func.cfg.blocks.push((*node).clone());
	}
	let entry = func.cfg.get_entry();
	entry.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: header.borrow().label(),
	})));
	force_link_node(&entry, &header);
	header.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: body.borrow().label(),
	})));
	force_link_node(&header, &body);
	body.borrow_mut().push(Box::new(CompInstr::new(
		temp("cond"),
		CompOp::Slt,
		Value::Int(1),
		Value::Int(0),
	)));
	body.borrow_mut().set_jump(Some(Box::new(JumpCondInstr {
		cond: Value::Temp(temp("cond")),
		target_true: latch.borrow().label(),
		target_false: exit.borrow().label(),
	})));
	force_link_node(&body, &latch);
	force_link_node(&body, &exit);
	latch.borrow_mut().set_jump(Some(Box::new(JumpInstr {
		target: header.borrow().label(),
	})));
	force_link_node(&latch, &header);
	exit.borrow_mut().set_jump(Some(Box::new(RetInstr {
		value: Some(Value::Int(0)),
	})));
	let printed = func.to_string();
	let (func, changed) = run_pass(func)?;
	assert!(!changed);
	assert_eq!(func.to_string(), printed);
	Ok(())
}

#[test]
fn test_whole_program_with_several_functions() -> Result<()> {
	let mut program = Program::new();
	program
		.funcs
		.push(build_loop(&[("n", 1, ArithOp::Add, Value::Int(2))], 9, "n"));
	program.funcs.push(build_loop(
		&[
			("n", 1, ArithOp::Add, Value::Int(1)),
			("v", 1, ArithOp::Mul, Value::Int(4)),
		],
		3,
		"v",
	));
	let before: Vec<_> = program
		.funcs
		.iter()
		.map(|v| run_func(v, &[]).unwrap().ret)
		.collect();
	assert!(optimize(&mut program)?);
	let after: Vec<_> = program
		.funcs
		.iter()
		.map(|v| run_func(v, &[]).unwrap().ret)
		.collect();
	assert_eq!(before, after);
	assert_eq!(after, vec![Some(11), Some(64)]);
	Ok(())
}
