use std::cell::Cell;
use std::rc::Rc;

use super::{Module, ModuleLoader, ModuleSource};
use crate::engine::{EngineError, ExtensionBehavior, FormatAdder, Result, SourceFile, Variant, register_default_templates};

struct Counting {
	loads: Rc<Cell<u32>>,
	imports: Vec<String>,
	magic: Option<&'static str>,
}

impl Counting {
	fn new(imports: &[&str]) -> (Self, Rc<Cell<u32>>) {
		let loads = Rc::new(Cell::new(0));
		let source = Self {
			loads: Rc::clone(&loads),
			imports: imports.iter().map(|key| (*key).to_owned()).collect(),
			magic: None,
		};
		(source, loads)
	}
}

impl ModuleSource for Counting {
	fn add_format_detection(&self, adder: &mut dyn FormatAdder) {
		if let Some(magic) = self.magic {
			adder.add_magic_number(magic);
		}
	}

	fn request_imports(&self) -> Vec<String> {
		self.imports.clone()
	}

	fn load(&self, module: &mut Module) -> Result<()> {
		self.loads.set(self.loads.get() + 1);
		let father = module.eval_type("uint(8)")?;
		module.add_template(ExtensionBehavior::new(father).into_template(format!("{}Tag", module.key()).as_str()));
		Ok(())
	}
}

#[test]
fn unregistered_key_resolves_to_default_module() {
	let mut loader = ModuleLoader::new();
	let (source, loads) = Counting::new(&[]);
	loader.add_module("fmt", Rc::new(source));

	let fallback = loader.get_module("no-such-format").expect("fallback");
	let default = loader.get_module("").expect("default");
	assert!(Rc::ptr_eq(&fallback, &default));
	assert_eq!(loads.get(), 0);
	assert!(!loader.is_loaded("fmt"));
	assert!(default.has_template("int"));
}

#[test]
fn loading_is_idempotent() {
	let mut loader = ModuleLoader::new();
	let (source, loads) = Counting::new(&[]);
	loader.add_module("fmt", Rc::new(source));

	let first = loader.get_module("fmt").expect("load");
	let second = loader.get_module("fmt").expect("cached");
	assert!(Rc::ptr_eq(&first, &second));
	assert_eq!(loads.get(), 1);
	assert!(first.has_template("fmtTag"));
	assert!(first.has_template("uint"));
}

#[test]
fn declared_imports_replace_default_import() {
	let mut loader = ModuleLoader::new();
	let (base, base_loads) = Counting::new(&[]);
	let (top, _) = Counting::new(&["base"]);
	loader.add_module("base", Rc::new(base));
	loader.add_module("top", Rc::new(top));

	let module = loader.get_module("top").expect("load top");
	assert_eq!(module.imports().len(), 1);
	assert_eq!(module.imports()[0].key(), "base");
	assert!(module.has_template("baseTag"));
	assert!(module.has_template("uint"));
	assert_eq!(base_loads.get(), 1);
}

#[test]
fn import_cycles_fail_and_reset() {
	let mut loader = ModuleLoader::new();
	let (a, a_loads) = Counting::new(&["b"]);
	let (b, _) = Counting::new(&["a"]);
	loader.add_module("a", Rc::new(a));
	loader.add_module("b", Rc::new(b));

	let err = loader.get_module("a").expect_err("cycle");
	assert!(matches!(err, EngineError::ImportCycle { ref key } if key == "a"));
	assert_eq!(a_loads.get(), 0);
	assert!(!loader.is_loaded("a"));
	assert!(matches!(loader.get_module("b"), Err(EngineError::ImportCycle { .. })));
}

#[test]
fn detection_rules_register_with_module() {
	let mut loader = ModuleLoader::new();
	let (mut source, _) = Counting::new(&[]);
	source.magic = Some("42 53");
	loader.add_module("bs", Rc::new(source));

	let mut file = SourceFile::from_bytes(b"BS\x01".to_vec());
	let module = loader.module_for_file(&mut file).expect("resolve");
	assert_eq!(module.key(), "bs");
	assert_eq!(file.tell(), 0);
	assert_eq!(loader.keys(), ["".to_owned(), "bs".to_owned()]);
}

#[test]
fn specify_prefers_longest_specified_prefix() {
	let mut module = Module::new("");
	register_default_templates(&mut module);
	let small = module.eval_type("uint(8)").expect("uint");
	let wide = module.eval_type("uint(16)").expect("uint");
	module.add_template(ExtensionBehavior::new(small).into_template("Small"));
	module.add_template(ExtensionBehavior::new(wide).into_template("Wide"));

	let byte = Variant::from(module.get_type("byte").expect("byte"));
	let any_bytes = module.new_type("Tuple", [byte.clone()]).expect("Tuple(byte)");
	let two_bytes = module.new_type("Tuple", [byte, Variant::from(2_i64)]).expect("Tuple(byte, 2)");
	module.add_specification(any_bytes, module.get_type("Small").expect("Small"));
	module.add_specification(two_bytes, module.get_type("Wide").expect("Wide"));

	assert_eq!(module.specify(&module.eval_type("Tuple(byte, 2, \"x\")").expect("type")).name(), "Wide");
	assert_eq!(module.specify(&module.eval_type("Tuple(byte, 7)").expect("type")).name(), "Small");
	assert_eq!(module.specify(&module.eval_type("Tuple(uint(8), 2)").expect("type")).name(), "Tuple");
	assert_eq!(module.specification_count(), 2);
}

#[test]
fn unknown_templates_are_structural() {
	let module = Module::new("x");
	assert!(matches!(module.eval_type("Missing(1)"), Err(EngineError::UnknownTemplate { ref name, .. }) if name == "Missing"));
	assert!(module.root().is_none());
}
