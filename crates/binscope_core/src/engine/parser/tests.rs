use super::{DecodeOptions, Decoder, ParsingContext};
use crate::engine::{EngineError, ExtensionBehavior, Module, ObjectType, ObjectTypeTemplate, Result, SourceFile, TemplateBehavior, Variant, register_default_templates};

fn default_module() -> Module {
	let mut module = Module::new("");
	register_default_templates(&mut module);
	module
}

/// Claims a 32-bit region and reads only its first byte.
struct Header;

impl TemplateBehavior for Header {
	fn parse(&self, _ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		ctx.object_mut().set_size(32);
		let byte = ctx.module().get_type("byte")?;
		let first = ctx.read_child(&byte, "first")?;
		ctx.object_mut().set_value(first.value().clone());
		assert_eq!(ctx.remaining(), 24);
		Ok(())
	}
}

#[test]
fn declared_size_moves_cursor_to_object_end() {
	let mut module = default_module();
	module.add_template(ObjectTypeTemplate::new("Header", Vec::<String>::new(), Header));
	let ty = module.get_type("Header").expect("type");

	let mut file = SourceFile::from_bytes(vec![7, 0, 0, 0, 9]);
	let object = Decoder::new(&module, &mut file, DecodeOptions::default()).decode(&ty, "header").expect("decode");
	assert_eq!(object.size(), 32);
	assert_eq!(*object.value(), Variant::from(7_u64));
	assert_eq!(object.children().len(), 1);
	assert_eq!(file.tell(), 32);
}

#[test]
fn root_requires_module_root_type() {
	let module = default_module();
	let mut file = SourceFile::from_bytes(vec![0]);
	let err = Decoder::new(&module, &mut file, DecodeOptions::default()).decode_root().expect_err("no root");
	assert!(matches!(err, EngineError::NoRootType { ref module } if module.is_empty()));
}

#[test]
fn specialization_keeps_declared_type() {
	let mut module = default_module();
	let father = module.eval_type("uint(16)").expect("father");
	module.add_template(ExtensionBehavior::new(father).into_template("Word"));
	let declared = module.eval_type("Array(byte, 16)").expect("declared");
	module.add_specification(declared.clone(), module.get_type("Word").expect("Word"));
	module.set_root(declared.clone());

	let mut file = SourceFile::from_bytes(vec![0x01, 0x02]);
	let object = Decoder::new(&module, &mut file, DecodeOptions::default()).decode_root().expect("decode");
	assert_eq!(object.name(), "root");
	assert_eq!(object.ty().name(), "Word");
	assert_eq!(*object.declared_type(), declared);
	assert_eq!(*object.value(), Variant::from(0x0102_u64));
}

#[test]
fn inspect_preset_is_tighter_than_default() {
	let inspect = DecodeOptions::for_inspect();
	let default = DecodeOptions::default();
	assert!(inspect.max_depth < default.max_depth);
	assert!(inspect.max_children < default.max_children);
}

/// Claims a single byte but reads a 16-bit word into it.
struct Narrow;

impl TemplateBehavior for Narrow {
	fn parse(&self, _ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		ctx.object_mut().set_size(8);
		let word = ctx.module().eval_type("uint(16)")?;
		let value = ctx.read_detached(&word)?;
		ctx.object_mut().set_value(value.value().clone());
		Ok(())
	}
}

#[test]
fn reading_past_a_claimed_region_is_an_error() {
	let mut module = default_module();
	module.add_template(ObjectTypeTemplate::new("Narrow", Vec::<String>::new(), Narrow));
	let ty = module.get_type("Narrow").expect("type");

	let mut file = SourceFile::from_bytes(vec![0x12, 0x34, 0x56]);
	let err = Decoder::new(&module, &mut file, DecodeOptions::default()).decode(&ty, "narrow").expect_err("overrun");
	assert!(matches!(err, EngineError::RegionOverrun { ref name, end: 8, at: 16 } if name == "narrow"));
}

/// Claims a 32-bit region without reading it.
struct Reserved;

impl TemplateBehavior for Reserved {
	fn parse(&self, _ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		ctx.object_mut().set_size(32);
		Ok(())
	}
}

#[test]
fn claimed_region_past_end_of_input_is_eof() {
	let mut module = default_module();
	module.add_template(ObjectTypeTemplate::new("Reserved", Vec::<String>::new(), Reserved));
	let ty = module.get_type("Reserved").expect("type");

	let mut file = SourceFile::from_bytes(vec![7, 0]);
	let err = Decoder::new(&module, &mut file, DecodeOptions::default()).decode(&ty, "header").expect_err("short input");
	assert!(matches!(err, EngineError::UnexpectedEof { at: 0, need: 32, rem: 16 }));
}
