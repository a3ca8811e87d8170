use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::{EngineError, FormatAdder, ObjectType, ObjectTypeTemplate, Result, TypeExpr, Variant};

mod default;
mod loader;

/// Module source registering the built-in templates.
pub use default::DefaultModule;
/// Lazy module registry with import resolution.
pub use loader::{MODULE_SUFFIX, ModuleLoader};

const MAX_SPECIFY_STEPS: usize = 32;

/// Provider of one module's detection rules, imports and templates.
pub trait ModuleSource {
	/// Register magic numbers and extensions identifying this format.
	fn add_format_detection(&self, _adder: &mut dyn FormatAdder) {}

	/// Keys of modules whose templates this module uses.
	fn request_imports(&self) -> Vec<String> {
		Vec::new()
	}

	/// Populate `module`; imports are already attached.
	fn load(&self, module: &mut Module) -> Result<()>;
}

/// Named registry of templates and type specializations.
#[derive(Debug)]
pub struct Module {
	key: String,
	templates: HashMap<String, Rc<ObjectTypeTemplate>>,
	template_order: Vec<String>,
	specifications: HashMap<ObjectType, ObjectType>,
	imports: Vec<Rc<Module>>,
	root: Option<ObjectType>,
}

impl Module {
	/// Create an empty module.
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			templates: HashMap::new(),
			template_order: Vec::new(),
			specifications: HashMap::new(),
			imports: Vec::new(),
			root: None,
		}
	}

	/// Module key; `""` is the default module.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Register a template, replacing any previous one with the same name.
	pub fn add_template(&mut self, template: Rc<ObjectTypeTemplate>) {
		let name = template.name().to_owned();
		if self.templates.insert(name.clone(), template).is_some() {
			tracing::warn!(module = %self.key, template = %name, "template redefined");
		} else {
			self.template_order.push(name);
		}
	}

	/// Find a template here, then in imports in import order.
	pub fn template(&self, name: &str) -> Option<Rc<ObjectTypeTemplate>> {
		if let Some(template) = self.templates.get(name) {
			return Some(Rc::clone(template));
		}
		self.imports.iter().find_map(|import| import.template(name))
	}

	/// Whether `name` resolves here or in imports.
	pub fn has_template(&self, name: &str) -> bool {
		self.template(name).is_some()
	}

	/// Names of templates defined by this module, in registration order.
	pub fn template_names(&self) -> &[String] {
		&self.template_order
	}

	/// Attach an imported module.
	pub fn import(&mut self, module: Rc<Module>) {
		self.imports.push(module);
	}

	/// Imported modules in import order.
	pub fn imports(&self) -> &[Rc<Module>] {
		&self.imports
	}

	/// Unparametrized instance of a named template.
	pub fn get_type(&self, name: &str) -> Result<ObjectType> {
		self.new_type(name, [])
	}

	/// Instance of a named template with leading parameters bound.
	pub fn new_type(&self, name: &str, parameters: impl IntoIterator<Item = Variant>) -> Result<ObjectType> {
		let template = self.template(name).ok_or_else(|| EngineError::UnknownTemplate {
			name: name.to_owned(),
			module: self.key.clone(),
		})?;
		ObjectType::with_parameters(&template, parameters)
	}

	/// Parse and evaluate a type expression without a scope.
	pub fn eval_type(&self, text: &str) -> Result<ObjectType> {
		TypeExpr::parse(text)?.eval_type(self, None)
	}

	/// Decode instances of `parent` as `child` instead.
	///
	/// Parameters left unspecified in `parent` are wildcards: a type matches when the
	/// specified parameters form a prefix of its own.
	pub fn add_specification(&mut self, parent: ObjectType, child: ObjectType) {
		self.specifications.insert(parent, child);
	}

	/// Number of specializations defined by this module.
	pub fn specification_count(&self) -> usize {
		self.specifications.len()
	}

	/// Specialization registered for `ty` here or in imports.
	pub fn specification_for(&self, ty: &ObjectType) -> Option<&ObjectType> {
		for count in (0..=ty.parameter_count()).rev() {
			let key = ty.truncated(count);
			if let Some(found) = self.specifications.get(&key) {
				return Some(found);
			}
		}
		self.imports.iter().find_map(|import| import.specification_for(ty))
	}

	/// Apply specializations until none matches.
	pub fn specify(&self, ty: &ObjectType) -> ObjectType {
		let mut current = ty.clone();
		for _ in 0..MAX_SPECIFY_STEPS {
			match self.specification_for(&current) {
				Some(next) if *next != current => current = next.clone(),
				_ => break,
			}
		}
		current
	}

	/// Set the type decoded for a whole file.
	pub fn set_root(&mut self, root: ObjectType) {
		self.root = Some(root);
	}

	/// Type decoded for a whole file.
	pub fn root(&self) -> Option<&ObjectType> {
		self.root.as_ref()
	}
}

#[cfg(test)]
mod tests;
