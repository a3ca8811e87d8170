use super::ObjectAttributes;
use crate::engine::{Variable, Variant};

#[test]
fn numeric_keys_auto_extend_with_nulls_when_creating() {
	let attributes = ObjectAttributes::new();
	let var = attributes.variable(true);

	let mut third = var.field(&Variant::from(2_i64), true, true);
	third.set_value(Variant::from("c"));

	assert_eq!(attributes.numbered_count(), 3);
	assert!(attributes.get_numbered(0).expect("filled").is_null());
	assert_eq!(attributes.get_numbered(2).expect("set").to_str(), "c");
	assert!(!var.field(&Variant::from(5_i64), false, false).is_defined());
}

#[test]
fn negative_and_invalid_keys_yield_undefined() {
	let attributes = ObjectAttributes::new();
	let var = attributes.variable(true);

	assert!(!var.field(&Variant::from(-1_i64), true, true).is_defined());
	assert!(!var.field(&Variant::from(1.5_f64), false, false).is_defined());
	assert_eq!(attributes.numbered_count(), 0);
}

#[test]
fn valueless_key_reads_last_or_appends() {
	let attributes = ObjectAttributes::new();
	let var = attributes.variable(true);
	assert!(!var.field(&Variant::null(), false, false).is_defined());

	attributes.push_numbered("first");
	attributes.push_numbered("second");
	assert_eq!(var.field(&Variant::null(), false, false).value().to_str(), "second");

	let mut appended = var.field(&Variant::undefined(), true, true);
	appended.set_value(Variant::from(3_i64));
	assert_eq!(attributes.numbered_count(), 3);
}

#[test]
fn named_creation_refuses_existing_names() {
	let attributes = ObjectAttributes::new();
	let var = attributes.variable(true);

	let mut first = var.field(&Variant::from("kind"), true, true);
	first.set_value(Variant::from("a"));
	assert!(!var.field(&Variant::from("kind"), true, true).is_defined());

	let existing = var.field(&Variant::from("kind"), false, false);
	assert_eq!(existing.value().to_str(), "a");
	assert!(!existing.is_modifiable());
	assert_eq!(attributes.field_names(), vec!["kind".to_owned()]);
}

#[test]
fn constant_view_refuses_creation() {
	let attributes = ObjectAttributes::new();
	let view = attributes.variable(false);
	assert!(!view.field(&Variant::from("x"), true, true).is_defined());
	assert!(attributes.is_empty());
}

#[test]
fn set_and_remove_named_fields_keep_name_order() {
	let attributes = ObjectAttributes::new();
	let var = attributes.variable(true);
	var.set_field(&Variant::from("b"), Variable::constant(Variant::from(2_i64)));
	var.set_field(&Variant::from("a"), Variable::constant(Variant::from(1_i64)));
	var.set_field(&Variant::from("b"), Variable::constant(Variant::from(20_i64)));

	assert_eq!(attributes.field_names(), vec!["b".to_owned(), "a".to_owned()]);
	assert_eq!(attributes.get_named("b"), Some(Variant::from(20_i64)));

	var.remove_field(&Variant::from("b"));
	assert_eq!(attributes.field_names(), vec!["a".to_owned()]);
	assert_eq!(attributes.get_named("b"), None);
}
