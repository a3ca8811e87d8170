use super::{ElementNamer, ExtensionBehavior, Member, MemberKind, StructTemplate, register_default_templates};
use crate::engine::{DecodeOptions, Decoder, Endianness, EngineError, FixedSize, Module, Object, Result, SourceFile, TypeExpr, Variant};

fn default_module() -> Module {
	let mut module = Module::new("");
	register_default_templates(&mut module);
	module
}

fn decode_with(module: &Module, expr: &str, bytes: &[u8], options: DecodeOptions) -> Result<Object> {
	let ty = module.eval_type(expr)?;
	let mut file = SourceFile::from_bytes(bytes.to_vec());
	Decoder::new(module, &mut file, options).decode(&ty, "value")
}

fn decode(expr: &str, bytes: &[u8]) -> Result<Object> {
	decode_with(&default_module(), expr, bytes, DecodeOptions::default())
}

fn expr(text: &str) -> TypeExpr {
	TypeExpr::parse(text).expect("valid type expression")
}

#[test]
fn int8_with_hex_base_keeps_raw_byte() {
	let object = decode("int(8, 16)", &[0xFF]).expect("decode int8");
	assert_eq!(*object.value(), Variant::from(255_i64));
	assert_eq!(object.value().to_string(), "0xff");
	assert_eq!(object.size(), 8);
}

#[test]
fn odd_width_int_sign_extends() {
	let object = decode("int(3)", &[0b1010_0000]).expect("decode int3");
	assert_eq!(*object.value(), Variant::from(-3_i64));
	assert_eq!(object.size(), 3);

	let object = decode("uint(3)", &[0b1010_0000]).expect("decode uint3");
	assert_eq!(*object.value(), Variant::from(5_u64));
}

#[test]
fn fixed_width_ints_follow_endianness() {
	assert_eq!(*decode("int(16)", &[0xFF, 0xFE]).expect("be").value(), Variant::from(-2_i64));

	let little = DecodeOptions {
		endianness: Endianness::Little,
		..DecodeOptions::default()
	};
	let object = decode_with(&default_module(), "uint(32)", &[0x78, 0x56, 0x34, 0x12], little).expect("le");
	assert_eq!(*object.value(), Variant::from(0x1234_5678_u64));
}

#[test]
fn integer_parameters_are_validated() {
	let err = decode("int", &[0]).expect_err("size is required");
	assert!(matches!(err, EngineError::MissingParameter { ref parameter, .. } if parameter == "size"));
	assert!(matches!(decode("uint(65)", &[0; 9]), Err(EngineError::IntegerTooWide { size: 65 })));
	assert_eq!(default_module().eval_type("uint").expect("type").fixed_size(), FixedSize::Unknown);
	assert_eq!(default_module().eval_type("uint(12)").expect("type").fixed_size(), FixedSize::Bits(12));
}

#[test]
fn byte_displays_hex() {
	let object = decode("byte", &[0x2A]).expect("decode byte");
	assert_eq!(object.value().to_string(), "0x2a");
}

#[test]
fn uuid_tail_is_always_big_endian() {
	let bytes: Vec<u8> = (0..16).collect();
	let big = decode("uuid", &bytes).expect("decode uuid");
	assert_eq!(big.value().to_str(), "00010203-0405-0607-0809-0A0B0C0D0E0F");
	assert_eq!(big.size(), 128);

	let little = DecodeOptions {
		endianness: Endianness::Little,
		..DecodeOptions::default()
	};
	let object = decode_with(&default_module(), "uuid", &bytes, little).expect("decode uuid");
	assert_eq!(object.value().to_str(), "03020100-0504-0706-0809-0A0B0C0D0E0F");
}

#[test]
fn enum_records_every_matching_label() {
	let object = decode("Enum(uint(8), 1, \"RED\", 1, \"ALSO_RED\", 2, \"GREEN\")", &[1]).expect("decode enum");
	assert_eq!(*object.value(), Variant::from(1_u64));
	assert_eq!(object.size(), 8);
	let labels: Vec<String> = (0..3).filter_map(|i| object.numbered_attribute(i)).map(|v| v.to_str().to_owned()).collect();
	assert_eq!(labels, vec!["RED".to_owned(), "ALSO_RED".to_owned()]);

	let err = decode("Enum", &[1]).expect_err("enum without type");
	assert!(err.to_string().contains("no enum type given"));
	assert_eq!(default_module().eval_type("Enum(uint(16), 1, \"A\")").expect("type").fixed_size(), FixedSize::Bits(16));
}

#[test]
fn array_names_elements_from_pattern() {
	let object = decode("Array(uint(8), 24, \"item%\")", &[10, 20, 30, 40]).expect("decode array");
	let names: Vec<&str> = object.children().iter().map(|child| child.name()).collect();
	assert_eq!(names, vec!["item0", "item1", "item2"]);
	let values: Vec<Variant> = object.children().iter().map(|child| child.value().clone()).collect();
	assert_eq!(values, vec![Variant::from(10_i64), Variant::from(20_i64), Variant::from(30_i64)]);
	assert_eq!(object.size(), 24);
}

#[test]
fn unsized_array_fills_region() {
	let object = decode("Array(byte)", &[1, 2, 3]).expect("decode array");
	assert_eq!(object.children().len(), 3);
	assert!(object.children().iter().all(|child| child.name() == "#"));
}

#[test]
fn tuple_reads_exact_count() {
	let object = decode("Tuple(uint(4), 3, \"n\")", &[0x12, 0x34]).expect("decode tuple");
	assert_eq!(object.children().len(), 3);
	assert!(object.children().iter().all(|child| child.name() == "n"));
	assert_eq!(object.size(), 12);

	assert!(matches!(decode("Tuple(byte, 3)", &[1, 2]), Err(EngineError::UnexpectedEof { .. })));
	assert!(matches!(decode("Tuple(byte)", &[1]), Err(EngineError::MissingParameter { .. })));
	assert_eq!(default_module().eval_type("Tuple(uint(4), 3)").expect("type").fixed_size(), FixedSize::Bits(12));
}

#[test]
fn child_limit_skips_fixed_size_remainder() {
	let options = DecodeOptions {
		max_children: 2,
		..DecodeOptions::default()
	};
	let object = decode_with(&default_module(), "Array(uint(8), _, \"e%\")", &[1, 2, 3, 4, 5], options.clone()).expect("decode array");
	assert_eq!(object.children().len(), 2);
	assert_eq!(object.named_attribute("skipped"), Some(Variant::from(3_u64)));
	assert_eq!(object.size(), 40);

	let err = decode_with(&default_module(), "Array(String, _, \"s%\")", b"a\0b\0c\0", options).expect_err("unsized elements");
	assert!(matches!(err, EngineError::DecodeTooManyChildren { count: 2, max: 2 }));
}

#[test]
fn depth_limit_is_structural() {
	let options = DecodeOptions {
		max_depth: 1,
		..DecodeOptions::default()
	};
	let err = decode_with(&default_module(), "Tuple(byte, 1)", &[0], options).expect_err("too deep");
	assert!(matches!(err, EngineError::DecodeDepthExceeded { max_depth: 1 }));
}

#[test]
fn float_and_string_scalars() {
	assert_eq!(*decode("float(32)", &[0x3F, 0x80, 0, 0]).expect("f32").value(), Variant::from(1.0_f64));
	assert!(matches!(decode("float(16)", &[0, 0]), Err(EngineError::UnsupportedFloatSize { size: 16 })));

	let terminated = decode("String", b"hi\0rest").expect("c string");
	assert_eq!(terminated.value().to_str(), "hi");
	assert_eq!(terminated.size(), 24);

	let fixed = decode("String(4)", b"ab\0\0zz").expect("fixed string");
	assert_eq!(fixed.value().to_str(), "ab");
	assert_eq!(fixed.size(), 32);
}

#[test]
fn element_namer_patterns() {
	assert_eq!(ElementNamer::new("").name(4), "#");
	assert_eq!(ElementNamer::new("entry").name(4), "entry");
	assert_eq!(ElementNamer::new("a%b%").name(7), "a7b7");
}

#[test]
fn struct_members_see_parameters_and_siblings() {
	let mut module = default_module();
	let mut record = StructTemplate::new(vec!["width".to_owned()], Some(Endianness::Little));
	record.push(Member {
		name: "count".to_owned(),
		kind: MemberKind::Field { ty: expr("uint(8)"), size: None },
	});
	record.push(Member {
		name: "values".to_owned(),
		kind: MemberKind::Array {
			element: expr("uint(16)"),
			count: Some(expr("count")),
			size: None,
			pattern: "v%".to_owned(),
		},
	});
	record.push(Member {
		name: "tail".to_owned(),
		kind: MemberKind::Field {
			ty: expr("uint(width)"),
			size: Some(expr("2")),
		},
	});
	module.add_template(record.into_template("Record"));

	let object = decode_with(&module, "Record(8)", &[2, 0x01, 0x00, 0x02, 0x00, 0xAA, 0xBB, 0xCC], DecodeOptions::default()).expect("decode record");
	assert_eq!(object.endianness(), Endianness::Little);
	assert_eq!(object.lookup("values.v1").map(|o| o.value().clone()), Some(Variant::from(2_u64)));
	let tail = object.lookup("tail").expect("tail member");
	assert_eq!(*tail.value(), Variant::from(0xAA_u64));
	assert_eq!(tail.size(), 16);
	assert_eq!(object.size(), 56);
}

#[test]
fn extension_decodes_as_father() {
	let mut module = default_module();
	let father = module.eval_type("uint(8, 16)").expect("father type");
	module.add_template(ExtensionBehavior::new(father).into_template("Tag"));

	let object = decode_with(&module, "Tag", &[0x7F], DecodeOptions::default()).expect("decode tag");
	assert_eq!(object.value().to_string(), "0x7f");
	assert_eq!(object.ty().name(), "Tag");
	assert_eq!(module.eval_type("Tag").expect("type").fixed_size(), FixedSize::Bits(8));
}

fn sized_field(name: &str, ty: &str, size: &str) -> Member {
	Member {
		name: name.to_owned(),
		kind: MemberKind::Field {
			ty: expr(ty),
			size: Some(expr(size)),
		},
	}
}

#[test]
fn member_wider_than_its_size_overruns() {
	let mut module = default_module();
	let mut record = StructTemplate::new(Vec::new(), None);
	record.push(sized_field("head", "uint(16)", "1"));
	module.add_template(record.into_template("Packed"));

	let err = decode_with(&module, "Packed", &[0x12, 0x34, 0x56], DecodeOptions::default()).expect_err("head overruns");
	assert!(matches!(err, EngineError::RegionOverrun { ref name, end: 8, at: 16 } if name == "head"));
}

#[test]
fn member_sizes_are_checked_against_input_and_range() {
	let mut module = default_module();
	let mut short = StructTemplate::new(Vec::new(), None);
	short.push(Member {
		name: "tag".to_owned(),
		kind: MemberKind::Field { ty: expr("uint(8)"), size: None },
	});
	short.push(sized_field("body", "byte", "4"));
	module.add_template(short.into_template("Short"));

	let mut huge = StructTemplate::new(Vec::new(), None);
	huge.push(Member {
		name: "len".to_owned(),
		kind: MemberKind::Field { ty: expr("uint(64)"), size: None },
	});
	huge.push(sized_field("body", "byte", "len"));
	module.add_template(huge.into_template("Huge"));

	let err = decode_with(&module, "Short", &[1, 2, 3], DecodeOptions::default()).expect_err("body past input");
	assert!(matches!(err, EngineError::UnexpectedEof { at: 8, need: 32, rem: 16 }));

	let err = decode_with(&module, "Huge", &[0xFF; 9], DecodeOptions::default()).expect_err("size overflows");
	assert!(matches!(err, EngineError::BadParameter { ref template, ref parameter, .. } if template == "body" && parameter == "size"));
}

#[test]
fn oversized_counts_have_no_fixed_size() {
	let module = default_module();
	assert_eq!(module.eval_type("Tuple(uint(64), 0x4000000000000000)").expect("type").fixed_size(), FixedSize::Unknown);
	assert_eq!(module.eval_type("String(0x2000000000000001)").expect("type").fixed_size(), FixedSize::Unknown);
	assert_eq!(module.eval_type("String(4)").expect("type").fixed_size(), FixedSize::Bits(32));

	let err = decode("String(0x2000000000000001)", b"abcd").expect_err("string past input");
	assert!(matches!(err, EngineError::UnexpectedEof { at: 0, rem: 32, .. }));
}
