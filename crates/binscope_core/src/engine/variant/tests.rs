use super::{DisplayBase, SuperKind, Variant, VariantKind};

#[test]
fn division_round_trips_within_kind() {
	let a = Variant::from(17_i64);
	let b = Variant::from(5_i64);
	let back = (a.clone() / &b) * &b;
	assert_eq!(back, Variant::from(15_i64));
	assert_eq!(back.kind(), VariantKind::Integer);

	let a = Variant::from(7.5_f64);
	let b = Variant::from(2.5_f64);
	assert_eq!((a.clone() / &b) * &b, a);

	let a = Variant::from(40_u64);
	let b = Variant::from(8_u64);
	let back = (a.clone() / &b) * &b;
	assert_eq!(back, a);
	assert_eq!(back.kind(), VariantKind::UnsignedInteger);
}

#[test]
fn division_by_zero_leaves_operand_unchanged() {
	let a = Variant::from(42_i64);
	assert_eq!(a.clone() / Variant::from(0_i64), a);
	assert_eq!(a.clone() % Variant::from(0_u64), a);

	let f = Variant::from(1.5_f64);
	let out = f.clone() / Variant::from(0.0_f64);
	assert_eq!(out, f);
	assert!(out.to_double().is_finite());
}

#[test]
fn string_concatenation_is_associative() {
	let a = Variant::from("ab");
	let b = Variant::from(12_i64);
	let c = Variant::from(0.5_f64);

	let left = (a.clone() + &b) + &c;
	let right = a + &(b + &c);
	assert_eq!(left.to_str(), "ab120.5");
	assert_eq!(left, right);

	let x = Variant::from(3_u64).with_display(DisplayBase::Hexadecimal);
	let y = Variant::from("!");
	assert_eq!((x.clone() + &y).to_str(), "0x3!");
	assert!((x + Variant::null()).is_undefined());
}

#[test]
fn float_contaminates_arithmetic() {
	let out = Variant::from(2_i64) * Variant::from(1.5_f64);
	assert_eq!(out.kind(), VariantKind::Float);
	assert_eq!(out.to_double(), 3.0);

	let out = Variant::from(2_u64) + Variant::from(3_i64);
	assert_eq!(out.kind(), VariantKind::UnsignedInteger);
	assert_eq!(out.to_unsigned_integer(), 5);
}

#[test]
fn unsigned_underflow_becomes_signed() {
	let out = Variant::from(3_u64) - Variant::from(5_u64);
	assert_eq!(out.kind(), VariantKind::Integer);
	assert_eq!(out.to_integer(), -2);

	let mut zero = Variant::from(0_u64);
	zero.decrement();
	assert_eq!(zero.kind(), VariantKind::Integer);
	assert_eq!(zero.to_integer(), -1);
}

#[test]
fn non_numerical_arithmetic_clears() {
	let out = Variant::from("x") - Variant::from(1_i64);
	assert!(out.is_undefined());
	let out = Variant::null() * Variant::from(1_i64);
	assert!(out.is_undefined());
}

#[test]
fn bitwise_uses_unsigned_pattern() {
	let out = Variant::from(-1_i64) & Variant::from(0xff_u64);
	assert_eq!(out.to_integer(), 0xff);
	let out = Variant::from(1_u64) << Variant::from(70_u64);
	assert_eq!(out.to_unsigned_integer(), 0);
	let out = Variant::from(-8_i64) >> Variant::from(1_u64);
	assert_eq!(out.to_unsigned_integer(), (-8_i64 as u64) >> 1);
	let untouched = Variant::from("s") | Variant::from(1_u64);
	assert_eq!(untouched.to_str(), "s");
}

#[test]
fn negation_converts_unsigned_to_signed() {
	let out = -Variant::from(5_u64);
	assert_eq!(out.kind(), VariantKind::Integer);
	assert_eq!(out.to_integer(), -5);
	assert_eq!((!Variant::from(0_u64)).to_unsigned_integer(), u64::MAX);
	assert!((!Variant::from("a")).is_undefined());
}

#[test]
fn equality_and_ordering_follow_super_kinds() {
	assert_eq!(Variant::from(1_u64), Variant::from(1_i64));
	assert_eq!(Variant::from(1.0_f64), Variant::from(1_u8));
	assert_ne!(Variant::from(-1_i64), Variant::from(u64::MAX));
	assert_ne!(Variant::from("1"), Variant::from(1_i64));
	assert_eq!(Variant::null(), Variant::null());
	assert_ne!(Variant::null(), Variant::undefined());

	assert!(Variant::from(1_000_000_i64) < Variant::from("a"));
	assert!(Variant::from(0.5_f64) < Variant::from(1_i64));
	assert!(Variant::from("a") < Variant::from("b"));
	assert_eq!(Variant::from("a").super_kind(), SuperKind::String);
}

#[test]
fn conversions_degrade_instead_of_failing() {
	let s = Variant::from("text");
	assert_eq!(s.to_integer(), 0);
	assert_eq!(s.to_double(), 0.0);
	assert!(s.to_object_type().is_null());
	assert_eq!(Variant::from(3_i64).to_str(), "");

	let mut v = Variant::from(-2_i64);
	v.convert_to(VariantKind::Float);
	assert_eq!(v.kind(), VariantKind::Float);
	assert_eq!(v.to_double(), -2.0);

	let mut bad = Variant::from("12");
	bad.convert_to(VariantKind::Integer);
	assert!(bad.is_undefined());
}

#[test]
fn copy_on_write_detaches_shared_string() {
	let s1 = Variant::from("shared");
	let mut s2 = s1.clone();
	assert_eq!(s1.payload_ref_count(), Some(2));

	s2.to_mutable_string().push_str("-changed");
	assert_eq!(s1.to_str(), "shared");
	assert_eq!(s2.to_str(), "shared-changed");
	assert_eq!(s1.payload_ref_count(), Some(1));
	assert_eq!(s2.payload_ref_count(), Some(1));
}

#[test]
fn display_respects_base() {
	assert_eq!(Variant::from(255_u64).with_display(DisplayBase::Hexadecimal).to_string(), "0xff");
	assert_eq!(Variant::from(8_i64).with_display(DisplayBase::Octal).to_string(), "010");
	assert_eq!(Variant::from(5_u64).with_display(DisplayBase::Binary).to_string(), "0b101");
	assert_eq!(Variant::from(-5_i64).with_display(DisplayBase::Binary).to_string(), "-0b101");
	assert_eq!(Variant::from("q").simple_display().to_string(), "\"q\"");

	let mut v = Variant::from(1_u64);
	v.set_display_base(7);
	assert_eq!(v.display_base(), DisplayBase::Decimal);
}
