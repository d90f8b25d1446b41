use std::fmt::Display;

use crate::rational::Rational;

pub mod chains;
pub mod engine;

/// Symbolic iteration variable of one loop: the 1-based iteration index
/// observed at the loop header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IterVar(pub u32);

impl Display for IterVar {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "%iter.{}", self.0)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ApplyKind {
	ShiftLeft,
	ShiftRight,
	/// Engine output the generator cannot lower.
	Other(String),
}

// Closed-form description of a loop-carried value as a function of the
// iteration variable. Term and factor lists are ordered, so lowering
// order is fixed within a run.
#[derive(Clone, Debug, PartialEq)]
pub enum Evolution {
	Const(Rational),
	Var(IterVar),
	/// `constant + Σ coefficient·term`
	Sum {
		constant: Rational,
		terms: Vec<(Evolution, Rational)>,
	},
	/// `constant · Π factor^exponent`
	Product {
		constant: Rational,
		factors: Vec<(Evolution, Rational)>,
	},
	/// `base << shift` / `base >> shift`
	Apply {
		kind: ApplyKind,
		base: Box<Evolution>,
		shift: Box<Evolution>,
	},
}

impl Display for ApplyKind {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::ShiftLeft => write!(f, "shl"),
			Self::ShiftRight => write!(f, "shr"),
			Self::Other(v) => write!(f, "{}", v),
		}
	}
}

impl Display for Evolution {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Const(v) => write!(f, "{}", v),
			Self::Var(v) => write!(f, "{}", v),
			Self::Sum { constant, terms } => {
				write!(f, "({}", constant)?;
				for (term, coeff) in terms.iter() {
					write!(f, " + {}*{}", coeff, term)?;
				}
				write!(f, ")")
			}
			Self::Product { constant, factors } => {
				write!(f, "({}", constant)?;
				for (factor, exp) in factors.iter() {
					write!(f, " * {}^{}", factor, exp)?;
				}
				write!(f, ")")
			}
			Self::Apply { kind, base, shift } => {
				write!(f, "{}({}, {})", kind, base, shift)
			}
		}
	}
}
