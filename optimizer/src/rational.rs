use std::{
	fmt::Display,
	ops::{Add, Mul, Neg, Sub},
};

use utils::math::gcd;

// Exact fraction arithmetic. The denominator is always positive and the
// fraction always reduced; the sign lives on the numerator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
	pub num: i64,
	pub den: i64,
}

impl Rational {
	pub fn new(num: i64, den: i64) -> Self {
		debug_assert!(den != 0);
		let g = gcd(num, den);
		let sign = if den < 0 { -1 } else { 1 };
		Self {
			num: sign * num / g,
			den: sign * den / g,
		}
	}
	pub fn from_int(v: i64) -> Self {
		Self { num: v, den: 1 }
	}
	pub fn is_whole(&self) -> bool {
		self.den == 1
	}
	/// Truncating, like integer division.
	pub fn whole_part(&self) -> i64 {
		self.num / self.den
	}
	pub fn scale(&self, v: i64) -> Self {
		Self::new(self.num * v, self.den)
	}
	pub fn inv(&self) -> Option<Self> {
		(self.num != 0).then(|| Self::new(self.den, self.num))
	}
	pub fn is_zero(&self) -> bool {
		self.num == 0
	}
	pub fn is_one(&self) -> bool {
		self.num == 1 && self.den == 1
	}
}

impl Add for Rational {
	type Output = Self;
	fn add(self, rhs: Self) -> Self {
		Self::new(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
	}
}

impl Sub for Rational {
	type Output = Self;
	fn sub(self, rhs: Self) -> Self {
		self + (-rhs)
	}
}

impl Mul for Rational {
	type Output = Self;
	fn mul(self, rhs: Self) -> Self {
		Self::new(self.num * rhs.num, self.den * rhs.den)
	}
}

impl Neg for Rational {
	type Output = Self;
	fn neg(self) -> Self {
		Self {
			num: -self.num,
			den: self.den,
		}
	}
}

impl Display for Rational {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		if self.den == 1 {
			write!(f, "{}", self.num)
		} else {
			write!(f, "{}/{}", self.num, self.den)
		}
	}
}
