use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::engine::ObjectType;

mod ops;

/// Concrete kind of a [`Variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
	/// Never assigned, or cleared by a failed operation.
	Undefined,
	/// Explicit null marker.
	Null,
	/// Signed 64-bit integer.
	Integer,
	/// Unsigned 64-bit integer.
	UnsignedInteger,
	/// 64-bit float.
	Float,
	/// Shared string payload.
	String,
	/// Shared object type payload.
	ObjectType,
}

impl VariantKind {
	/// Render the kind as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Undefined => "undefined",
			Self::Null => "null",
			Self::Integer => "integer",
			Self::UnsignedInteger => "unsigned integer",
			Self::Float => "float",
			Self::String => "string",
			Self::ObjectType => "object type",
		}
	}

	/// Family used for cross-kind comparison and arithmetic.
	pub fn super_kind(self) -> SuperKind {
		match self {
			Self::Undefined | Self::Null => SuperKind::Valueless,
			Self::Integer | Self::UnsignedInteger | Self::Float => SuperKind::Numerical,
			Self::String => SuperKind::String,
			Self::ObjectType => SuperKind::ObjectType,
		}
	}
}

/// Kind families, declared in ordering rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SuperKind {
	/// Undefined and null.
	Valueless,
	/// Integers and floats.
	Numerical,
	/// Strings.
	String,
	/// Object types.
	ObjectType,
}

/// Rendering base for numerical values. Does not affect the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayBase {
	/// Base 10.
	#[default]
	Decimal,
	/// Base 16, rendered with a `0x` prefix.
	Hexadecimal,
	/// Base 8, rendered with a leading `0`.
	Octal,
	/// Base 2, rendered with a `0b` prefix.
	Binary,
}

#[derive(Debug, Clone)]
enum Data {
	Undefined,
	Null,
	Integer(i64),
	Unsigned(u64),
	Float(f64),
	String(Rc<String>),
	ObjectType(Rc<ObjectType>),
}

/// Dynamically typed value used for decoded data and type parameters.
///
/// String and object type payloads are reference counted and shared between clones; the
/// `to_mutable_*` accessors detach a private copy before handing out a mutable reference.
#[derive(Debug, Clone)]
pub struct Variant {
	data: Data,
	base: DisplayBase,
}

impl Default for Variant {
	fn default() -> Self {
		Self::undefined()
	}
}

impl Variant {
	/// Create an undefined value.
	pub fn undefined() -> Self {
		Self {
			data: Data::Undefined,
			base: DisplayBase::Decimal,
		}
	}

	/// Create an explicit null value.
	pub fn null() -> Self {
		Self {
			data: Data::Null,
			base: DisplayBase::Decimal,
		}
	}

	fn from_data(data: Data) -> Self {
		Self {
			data,
			base: DisplayBase::Decimal,
		}
	}

	/// Return the concrete kind.
	pub fn kind(&self) -> VariantKind {
		match self.data {
			Data::Undefined => VariantKind::Undefined,
			Data::Null => VariantKind::Null,
			Data::Integer(_) => VariantKind::Integer,
			Data::Unsigned(_) => VariantKind::UnsignedInteger,
			Data::Float(_) => VariantKind::Float,
			Data::String(_) => VariantKind::String,
			Data::ObjectType(_) => VariantKind::ObjectType,
		}
	}

	/// Return the kind family.
	pub fn super_kind(&self) -> SuperKind {
		self.kind().super_kind()
	}

	/// Whether the value is undefined or null.
	pub fn is_valueless(&self) -> bool {
		self.super_kind() == SuperKind::Valueless
	}

	/// Whether the value is null.
	pub fn is_null(&self) -> bool {
		matches!(self.data, Data::Null)
	}

	/// Whether the value is undefined.
	pub fn is_undefined(&self) -> bool {
		matches!(self.data, Data::Undefined)
	}

	/// Whether the value is an integer or a float.
	pub fn has_numerical_kind(&self) -> bool {
		self.super_kind() == SuperKind::Numerical
	}

	/// Whether [`convert_to`](Self::convert_to) can succeed for `kind`.
	pub fn can_convert_to(&self, kind: VariantKind) -> bool {
		self.super_kind() == kind.super_kind()
	}

	/// Reset to undefined, releasing any shared payload.
	pub fn clear(&mut self) {
		self.data = Data::Undefined;
	}

	/// Current display base.
	pub fn display_base(&self) -> DisplayBase {
		self.base
	}

	/// Set the display base.
	pub fn set_display(&mut self, base: DisplayBase) {
		self.base = base;
	}

	/// Builder-style [`set_display`](Self::set_display).
	pub fn with_display(mut self, base: DisplayBase) -> Self {
		self.base = base;
		self
	}

	/// Set the display base from its numeric radix (2, 8, 10 or 16).
	pub fn set_display_base(&mut self, radix: i64) {
		self.base = match radix {
			2 => DisplayBase::Binary,
			8 => DisplayBase::Octal,
			10 => DisplayBase::Decimal,
			16 => DisplayBase::Hexadecimal,
			other => {
				tracing::error!(radix = other, "unrecognized display base");
				DisplayBase::Decimal
			}
		};
	}

	/// Change the numerical kind in place.
	///
	/// Conversions outside the numerical family log an error and clear the value.
	pub fn convert_to(&mut self, kind: VariantKind) -> &mut Self {
		if self.kind() == kind {
			return self;
		}
		let converted = match (&self.data, kind) {
			(Data::Integer(l), VariantKind::UnsignedInteger) => Some(Data::Unsigned(*l as u64)),
			(Data::Integer(l), VariantKind::Float) => Some(Data::Float(*l as f64)),
			(Data::Unsigned(ul), VariantKind::Integer) => Some(Data::Integer(*ul as i64)),
			(Data::Unsigned(ul), VariantKind::Float) => Some(Data::Float(*ul as f64)),
			(Data::Float(f), VariantKind::Integer) => Some(Data::Integer(*f as i64)),
			(Data::Float(f), VariantKind::UnsignedInteger) => Some(Data::Unsigned(*f as u64)),
			_ => None,
		};
		match converted {
			Some(data) => self.data = data,
			None => {
				tracing::error!(from = self.kind().as_str(), to = kind.as_str(), "invalid type conversion");
				self.clear();
			}
		}
		self
	}

	/// Coerce to `i64`; non-numerical values yield `0`.
	pub fn to_integer(&self) -> i64 {
		match self.data {
			Data::Integer(l) => l,
			Data::Unsigned(ul) => ul as i64,
			Data::Float(f) => f as i64,
			_ => 0,
		}
	}

	/// Coerce to `u64`; non-numerical values yield `0`.
	pub fn to_unsigned_integer(&self) -> u64 {
		match self.data {
			Data::Integer(l) => l as u64,
			Data::Unsigned(ul) => ul,
			Data::Float(f) => f as u64,
			_ => 0,
		}
	}

	/// Coerce to `f64`; non-numerical values yield `0.0`.
	pub fn to_double(&self) -> f64 {
		match self.data {
			Data::Integer(l) => l as f64,
			Data::Unsigned(ul) => ul as f64,
			Data::Float(f) => f,
			_ => 0.0,
		}
	}

	/// Borrow the string payload; non-string values yield `""`.
	pub fn to_str(&self) -> &str {
		match &self.data {
			Data::String(s) => s.as_str(),
			_ => "",
		}
	}

	/// Borrow the string payload without coercion.
	pub fn as_string(&self) -> Option<&str> {
		match &self.data {
			Data::String(s) => Some(s.as_str()),
			_ => None,
		}
	}

	/// Return the object type payload; other kinds yield the null type.
	pub fn to_object_type(&self) -> ObjectType {
		match &self.data {
			Data::ObjectType(t) => ObjectType::clone(t),
			_ => ObjectType::null(),
		}
	}

	/// Borrow the object type payload without cloning.
	pub fn as_object_type(&self) -> Option<&ObjectType> {
		match &self.data {
			Data::ObjectType(t) => Some(t),
			_ => None,
		}
	}

	/// Mutable string access, detaching a private copy when the payload is shared.
	pub fn to_mutable_string(&mut self) -> &mut String {
		if !matches!(self.data, Data::String(_)) {
			tracing::error!(from = self.kind().as_str(), "invalid conversion to string");
			self.data = Data::String(Rc::new(String::new()));
		}
		match &mut self.data {
			Data::String(s) => Rc::make_mut(s),
			_ => unreachable!("payload was just replaced with a string"),
		}
	}

	/// Truthiness: non-zero numbers, non-empty strings, non-null types.
	pub fn to_bool(&self) -> bool {
		match &self.data {
			Data::Integer(l) => *l != 0,
			Data::Unsigned(ul) => *ul != 0,
			Data::Float(f) => *f != 0.0,
			Data::String(s) => !s.is_empty(),
			Data::ObjectType(t) => !t.is_null(),
			Data::Undefined | Data::Null => false,
		}
	}

	/// Number of live handles sharing the heap payload, or `None` for inline kinds.
	pub fn payload_ref_count(&self) -> Option<usize> {
		match &self.data {
			Data::String(s) => Some(Rc::strong_count(s)),
			Data::ObjectType(t) => Some(Rc::strong_count(t)),
			_ => None,
		}
	}

	/// Render strings quoted and ignore the display base.
	pub fn simple_display(&self) -> SimpleDisplay<'_> {
		SimpleDisplay(self)
	}
}

macro_rules! variant_from {
	($variant:ident, $target:ty; $($source:ty),*) => {
		$(
			impl From<$source> for Variant {
				fn from(value: $source) -> Self {
					Self::from_data(Data::$variant(value as $target))
				}
			}
		)*
	};
}

variant_from!(Integer, i64; i8, i16, i32, i64, isize);
variant_from!(Unsigned, u64; u8, u16, u32, u64, usize);
variant_from!(Float, f64; f32, f64);

impl From<bool> for Variant {
	fn from(value: bool) -> Self {
		Self::from_data(Data::Integer(i64::from(value)))
	}
}

impl From<&str> for Variant {
	fn from(value: &str) -> Self {
		Self::from_data(Data::String(Rc::new(value.to_owned())))
	}
}

impl From<String> for Variant {
	fn from(value: String) -> Self {
		Self::from_data(Data::String(Rc::new(value)))
	}
}

impl From<ObjectType> for Variant {
	fn from(value: ObjectType) -> Self {
		Self::from_data(Data::ObjectType(Rc::new(value)))
	}
}

impl fmt::Display for Variant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (&self.data, self.base) {
			(Data::Integer(l), DisplayBase::Binary) if *l < 0 => write!(f, "-0b{:b}", l.unsigned_abs()),
			(Data::Integer(l), DisplayBase::Binary) => write!(f, "0b{l:b}"),
			(Data::Unsigned(ul), DisplayBase::Binary) => write!(f, "0b{ul:b}"),
			(Data::Integer(l), DisplayBase::Hexadecimal) => write!(f, "0x{l:x}"),
			(Data::Unsigned(ul), DisplayBase::Hexadecimal) => write!(f, "0x{ul:x}"),
			(Data::Integer(0), DisplayBase::Octal) | (Data::Unsigned(0), DisplayBase::Octal) => f.write_str("0"),
			(Data::Integer(l), DisplayBase::Octal) => write!(f, "0{l:o}"),
			(Data::Unsigned(ul), DisplayBase::Octal) => write!(f, "0{ul:o}"),
			(Data::Integer(l), _) => write!(f, "{l}"),
			(Data::Unsigned(ul), _) => write!(f, "{ul}"),
			(Data::Float(v), _) => write!(f, "{v}"),
			(Data::String(s), _) => f.write_str(s),
			(Data::ObjectType(t), _) => write!(f, "{t}"),
			(Data::Null, _) => f.write_str("null"),
			(Data::Undefined, _) => f.write_str("undefined"),
		}
	}
}

/// Display adapter returned by [`Variant::simple_display`].
pub struct SimpleDisplay<'a>(&'a Variant);

impl fmt::Display for SimpleDisplay<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0.data {
			Data::String(s) => write!(f, "\"{s}\""),
			Data::Integer(l) => write!(f, "{l}"),
			Data::Unsigned(ul) => write!(f, "{ul}"),
			_ => write!(f, "{}", self.0),
		}
	}
}

#[derive(Clone, Copy)]
pub(crate) enum Num {
	I(i64),
	U(u64),
	F(f64),
}

impl Num {
	fn as_f64(self) -> f64 {
		match self {
			Self::I(l) => l as f64,
			Self::U(ul) => ul as f64,
			Self::F(f) => f,
		}
	}

	fn bits(self) -> u64 {
		match self {
			Self::I(l) => l as u64,
			Self::U(ul) => ul,
			Self::F(f) => (f as i64) as u64,
		}
	}

	fn exact(self) -> i128 {
		match self {
			Self::I(l) => i128::from(l),
			Self::U(ul) => i128::from(ul),
			Self::F(f) => f as i128,
		}
	}

	fn compare(self, other: Num) -> Option<Ordering> {
		match (self, other) {
			(Self::F(_), _) | (_, Self::F(_)) => self.as_f64().partial_cmp(&other.as_f64()),
			_ => Some(self.exact().cmp(&other.exact())),
		}
	}

	fn is_zero(self) -> bool {
		match self {
			Self::F(f) => f == 0.0,
			_ => self.bits() == 0,
		}
	}
}

impl Variant {
	pub(crate) fn numeric(&self) -> Option<Num> {
		match self.data {
			Data::Integer(l) => Some(Num::I(l)),
			Data::Unsigned(ul) => Some(Num::U(ul)),
			Data::Float(f) => Some(Num::F(f)),
			_ => None,
		}
	}

	fn kind_rank(&self) -> u8 {
		match self.data {
			Data::Undefined => 0,
			Data::Null => 1,
			_ => 2,
		}
	}
}

impl PartialEq for Variant {
	fn eq(&self, other: &Self) -> bool {
		match (&self.data, &other.data) {
			(Data::Undefined, Data::Undefined) | (Data::Null, Data::Null) => true,
			(Data::String(a), Data::String(b)) => a == b,
			(Data::ObjectType(a), Data::ObjectType(b)) => a == b,
			_ => match (self.numeric(), other.numeric()) {
				(Some(a), Some(b)) => a.compare(b) == Some(Ordering::Equal),
				_ => false,
			},
		}
	}
}

// NaN is the only value that breaks reflexivity; decoded parameters never carry it as a key.
impl Eq for Variant {}

impl PartialOrd for Variant {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		let (left, right) = (self.super_kind(), other.super_kind());
		if left != right {
			return Some(left.cmp(&right));
		}
		match (&self.data, &other.data) {
			(Data::String(a), Data::String(b)) => Some(a.cmp(b)),
			(Data::ObjectType(a), Data::ObjectType(b)) => Some(a.name().cmp(b.name()).then_with(|| a.to_string().cmp(&b.to_string()))),
			_ => match (self.numeric(), other.numeric()) {
				(Some(a), Some(b)) => a.compare(b),
				_ => Some(self.kind_rank().cmp(&other.kind_rank())),
			},
		}
	}
}

impl Hash for Variant {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match &self.data {
			Data::Undefined => 0_u8.hash(state),
			Data::Null => 1_u8.hash(state),
			Data::Integer(l) => {
				2_u8.hash(state);
				i128::from(*l).hash(state);
			}
			Data::Unsigned(ul) => {
				2_u8.hash(state);
				i128::from(*ul).hash(state);
			}
			Data::Float(f) => {
				if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.7e38 {
					2_u8.hash(state);
					(*f as i128).hash(state);
				} else {
					3_u8.hash(state);
					f.to_bits().hash(state);
				}
			}
			Data::String(s) => {
				4_u8.hash(state);
				s.hash(state);
			}
			Data::ObjectType(t) => {
				5_u8.hash(state);
				t.hash(state);
			}
		}
	}
}

#[cfg(test)]
mod tests;
