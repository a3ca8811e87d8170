use std::ops::{
	Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div, DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl,
	ShlAssign, Shr, ShrAssign, Sub, SubAssign,
};

use super::{Data, Num, Variant, VariantKind};

impl Variant {
	fn set_numeric(&mut self, num: Num) {
		self.data = match num {
			Num::I(l) => Data::Integer(l),
			Num::U(ul) => Data::Unsigned(ul),
			Num::F(f) => Data::Float(f),
		};
	}

	/// Apply an integer/float arithmetic rule, clearing the value when either side is not numerical.
	fn arithmetic(&mut self, rhs: &Variant, float: impl Fn(f64, f64) -> f64, int: impl Fn(Num, Num) -> Num) {
		let (Some(left), Some(right)) = (self.numeric(), rhs.numeric()) else {
			self.clear();
			return;
		};
		let out = match (left, right) {
			(Num::F(_), _) | (_, Num::F(_)) => Num::F(float(left.as_f64(), right.as_f64())),
			_ => int(left, right),
		};
		self.set_numeric(out);
	}

	fn division(&mut self, rhs: &Variant, float: impl Fn(f64, f64) -> f64, int: impl Fn(i64, i64) -> i64, uint: impl Fn(u64, u64) -> u64) {
		let (Some(left), Some(right)) = (self.numeric(), rhs.numeric()) else {
			self.clear();
			return;
		};
		if right.is_zero() {
			tracing::error!(lhs = %self, "division by zero");
			return;
		}
		let out = match (left, right) {
			(Num::F(_), _) | (_, Num::F(_)) => Num::F(float(left.as_f64(), right.as_f64())),
			(Num::U(a), Num::U(b)) => Num::U(uint(a, b)),
			(Num::U(a), Num::I(b)) if b > 0 => Num::U(uint(a, b as u64)),
			(_, _) => Num::I(int(left.bits() as i64, right.bits() as i64)),
		};
		self.set_numeric(out);
	}

	/// Bitwise rule on the unsigned bit pattern; non-numerical operands leave `self` unchanged.
	fn bitwise(&mut self, rhs: &Variant, op: impl Fn(u64, u64) -> u64) {
		let (Some(left), Some(right)) = (self.numeric(), rhs.numeric()) else {
			return;
		};
		let bits = op(left.bits(), right.bits());
		self.set_numeric(match left {
			Num::I(_) => Num::I(bits as i64),
			Num::U(_) | Num::F(_) => Num::U(bits),
		});
	}

	/// Pre-increment numerical values; other kinds are cleared.
	pub fn increment(&mut self) -> &mut Self {
		match &mut self.data {
			Data::Integer(l) => *l = l.wrapping_add(1),
			Data::Unsigned(ul) => *ul = ul.wrapping_add(1),
			Data::Float(f) => *f += 1.0,
			_ => self.clear(),
		}
		self
	}

	/// Pre-decrement numerical values; unsigned zero becomes signed `-1`.
	pub fn decrement(&mut self) -> &mut Self {
		match &mut self.data {
			Data::Integer(l) => *l = l.wrapping_sub(1),
			Data::Unsigned(0) => self.data = Data::Integer(-1),
			Data::Unsigned(ul) => *ul -= 1,
			Data::Float(f) => *f -= 1.0,
			_ => self.clear(),
		}
		self
	}
}

impl AddAssign<&Variant> for Variant {
	fn add_assign(&mut self, rhs: &Variant) {
		if self.kind() == VariantKind::String || rhs.kind() == VariantKind::String {
			let base = self.base;
			*self = Variant::from(format!("{self}{rhs}"));
			self.base = base;
			return;
		}
		self.arithmetic(rhs, |a, b| a + b, |a, b| match a {
			Num::I(l) => Num::I(l.wrapping_add(b.bits() as i64)),
			_ => Num::U(a.bits().wrapping_add(b.bits())),
		});
	}
}

impl SubAssign<&Variant> for Variant {
	fn sub_assign(&mut self, rhs: &Variant) {
		self.arithmetic(rhs, |a, b| a - b, |a, b| match a {
			Num::U(ul) if ul < b.bits() => Num::I(ul.wrapping_sub(b.bits()) as i64),
			Num::U(ul) => Num::U(ul - b.bits()),
			_ => Num::I((a.bits() as i64).wrapping_sub(b.bits() as i64)),
		});
	}
}

impl MulAssign<&Variant> for Variant {
	fn mul_assign(&mut self, rhs: &Variant) {
		self.arithmetic(rhs, |a, b| a * b, |a, b| match a {
			Num::U(ul) => Num::U(ul.wrapping_mul(b.bits())),
			_ => Num::I((a.bits() as i64).wrapping_mul(b.bits() as i64)),
		});
	}
}

impl DivAssign<&Variant> for Variant {
	fn div_assign(&mut self, rhs: &Variant) {
		self.division(rhs, |a, b| a / b, i64::wrapping_div, |a, b| a / b);
	}
}

impl RemAssign<&Variant> for Variant {
	fn rem_assign(&mut self, rhs: &Variant) {
		self.division(rhs, |a, b| a % b, i64::wrapping_rem, |a, b| a % b);
	}
}

impl BitOrAssign<&Variant> for Variant {
	fn bitor_assign(&mut self, rhs: &Variant) {
		self.bitwise(rhs, |a, b| a | b);
	}
}

impl BitXorAssign<&Variant> for Variant {
	fn bitxor_assign(&mut self, rhs: &Variant) {
		self.bitwise(rhs, |a, b| a ^ b);
	}
}

impl BitAndAssign<&Variant> for Variant {
	fn bitand_assign(&mut self, rhs: &Variant) {
		self.bitwise(rhs, |a, b| a & b);
	}
}

impl ShlAssign<&Variant> for Variant {
	fn shl_assign(&mut self, rhs: &Variant) {
		self.bitwise(rhs, |a, b| u32::try_from(b).ok().and_then(|shift| a.checked_shl(shift)).unwrap_or(0));
	}
}

impl ShrAssign<&Variant> for Variant {
	fn shr_assign(&mut self, rhs: &Variant) {
		self.bitwise(rhs, |a, b| u32::try_from(b).ok().and_then(|shift| a.checked_shr(shift)).unwrap_or(0));
	}
}

macro_rules! forward_binary {
	($($trait:ident::$method:ident => $assign_trait:ident::$assign:ident),* $(,)?) => {
		$(
			impl $assign_trait<Variant> for Variant {
				fn $assign(&mut self, rhs: Variant) {
					$assign_trait::$assign(self, &rhs);
				}
			}

			impl $trait<&Variant> for Variant {
				type Output = Variant;

				fn $method(mut self, rhs: &Variant) -> Variant {
					$assign_trait::$assign(&mut self, rhs);
					self
				}
			}

			impl $trait<Variant> for Variant {
				type Output = Variant;

				fn $method(mut self, rhs: Variant) -> Variant {
					$assign_trait::$assign(&mut self, &rhs);
					self
				}
			}

			impl $trait<&Variant> for &Variant {
				type Output = Variant;

				fn $method(self, rhs: &Variant) -> Variant {
					let mut out = self.clone();
					$assign_trait::$assign(&mut out, rhs);
					out
				}
			}
		)*
	};
}

forward_binary!(
	Add::add => AddAssign::add_assign,
	Sub::sub => SubAssign::sub_assign,
	Mul::mul => MulAssign::mul_assign,
	Div::div => DivAssign::div_assign,
	Rem::rem => RemAssign::rem_assign,
	BitOr::bitor => BitOrAssign::bitor_assign,
	BitXor::bitxor => BitXorAssign::bitxor_assign,
	BitAnd::bitand => BitAndAssign::bitand_assign,
	Shl::shl => ShlAssign::shl_assign,
	Shr::shr => ShrAssign::shr_assign,
);

impl Neg for &Variant {
	type Output = Variant;

	fn neg(self) -> Variant {
		let mut out = self.clone();
		match out.data {
			Data::Unsigned(ul) => out.data = Data::Integer((ul as i64).wrapping_neg()),
			Data::Integer(l) => out.data = Data::Integer(l.wrapping_neg()),
			Data::Float(f) => out.data = Data::Float(-f),
			_ => {}
		}
		out
	}
}

impl Neg for Variant {
	type Output = Variant;

	fn neg(self) -> Variant {
		-&self
	}
}

/// Bitwise complement; non-numerical values yield undefined.
impl Not for &Variant {
	type Output = Variant;

	fn not(self) -> Variant {
		let mut out = self.clone();
		match out.data {
			Data::Integer(l) => out.data = Data::Integer(!l),
			Data::Unsigned(ul) => out.data = Data::Unsigned(!ul),
			Data::Float(f) => out.data = Data::Unsigned(!((f as i64) as u64)),
			_ => return Variant::undefined(),
		}
		out
	}
}

impl Not for Variant {
	type Output = Variant;

	fn not(self) -> Variant {
		!&self
	}
}
