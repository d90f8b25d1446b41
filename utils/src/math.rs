pub fn gcd(a: i64, b: i64) -> i64 {
	if b == 0 {
		a.abs()
	} else {
		gcd(b, a % b)
	}
}

pub fn lcm(a: i64, b: i64) -> i64 {
	a / gcd(a, b) * b
}

pub fn is_pow2(x: i64) -> bool {
	x > 0 && x & (x - 1) == 0
}

// exact log2 of a power of two
pub fn log2_exact(x: i64) -> i64 {
	debug_assert!(is_pow2(x));
	x.trailing_zeros() as i64
}
