use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::engine::{
	Endianness, EngineError, ExtensionBehavior, FormatAdder, Member, MemberKind, Module, ModuleSource, ObjectType, Result, StructTemplate, TypeExpr,
	Variant,
};

mod model;

/// Model files declaring `(id, name, type)` specializations.
pub use model::{ModelEntry, parse_element_id, parse_model};

pub(crate) fn invalid(source_name: &str, reason: impl Into<String>) -> EngineError {
	EngineError::InvalidDescription {
		source_name: source_name.to_owned(),
		reason: reason.into(),
	}
}

pub(crate) fn attributes_of(element: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
	let mut out = Vec::new();
	for attribute in element.attributes() {
		let attribute = attribute.map_err(quick_xml::Error::from)?;
		let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
		let value = attribute.unescape_value()?.into_owned();
		out.push((key, value));
	}
	Ok(out)
}

/// Labelled values of a named enum.
#[derive(Debug, Clone)]
pub struct EnumDescription {
	/// Template name.
	pub name: String,
	/// Underlying value type expression.
	pub ty: String,
	/// `(value expression, label)` pairs in declaration order.
	pub entries: Vec<(String, String)>,
}

/// Model-driven specializations of one parametrized element template.
#[derive(Debug, Clone)]
pub struct ModelDescription {
	/// Template whose first parameter is the element id.
	pub element: String,
	/// Model file, relative to the description file.
	pub src: Option<PathBuf>,
	/// Entries declared inline.
	pub entries: Vec<ModelEntry>,
}

/// Parsed `<module>` description file.
#[derive(Debug, Clone, Default)]
pub struct ModuleDescription {
	/// Label used in error messages, usually the file name.
	pub source_name: String,
	/// Directory that relative model paths resolve against.
	pub base_dir: Option<PathBuf>,
	/// Imported module keys.
	pub imports: Vec<String>,
	/// Magic number patterns.
	pub magics: Vec<String>,
	/// File extensions.
	pub extensions: Vec<String>,
	/// Root type expression.
	pub root: Option<String>,
	/// Struct templates in declaration order.
	pub structs: Vec<(String, StructTemplate)>,
	/// Enum templates in declaration order.
	pub enums: Vec<EnumDescription>,
	/// Model blocks in declaration order.
	pub models: Vec<ModelDescription>,
}

enum Open {
	Module,
	Struct,
	Enum,
	Model,
	Text(TextTarget),
	Leaf,
}

#[derive(Clone, Copy)]
enum TextTarget {
	Magic,
	Extension,
}

struct Attributes<'s> {
	element: String,
	values: Vec<(String, String)>,
	source_name: &'s str,
}

impl Attributes<'_> {
	fn optional(&self, key: &str) -> Option<String> {
		self.values.iter().find(|(name, _)| name == key).map(|(_, value)| value.clone())
	}

	fn required(&self, key: &str) -> Result<String> {
		self.optional(key)
			.ok_or_else(|| invalid(self.source_name, format!("<{}> without `{key}`", self.element)))
	}

	fn expr(&self, key: &str) -> Result<Option<TypeExpr>> {
		self.optional(key).map(|text| TypeExpr::parse(&text)).transpose()
	}
}

impl ModuleDescription {
	/// Read and parse a description file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = fs::read_to_string(path)?;
		let source_name = path.file_name().map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
		let mut description = Self::parse(&text, &source_name)?;
		description.base_dir = path.parent().map(Path::to_path_buf);
		Ok(description)
	}

	/// Parse description text.
	pub fn parse(text: &str, source_name: &str) -> Result<Self> {
		let mut reader = Reader::from_str(text);
		reader.config_mut().trim_text(true);

		let mut out = Self {
			source_name: source_name.to_owned(),
			..Self::default()
		};
		let mut stack: Vec<Open> = Vec::new();
		loop {
			match reader.read_event()? {
				Event::Start(element) => {
					let open = out.open(&element, stack.last(), source_name)?;
					stack.push(open);
				}
				Event::Empty(element) => {
					let open = out.open(&element, stack.last(), source_name)?;
					if let Open::Text(_) = open {
						return Err(invalid(source_name, "empty text element"));
					}
				}
				Event::Text(text) => {
					let text = text.unescape()?.into_owned();
					match stack.last() {
						Some(Open::Text(TextTarget::Magic)) => out.magics.push(text),
						Some(Open::Text(TextTarget::Extension)) => out.extensions.push(text),
						_ => return Err(invalid(source_name, format!("unexpected text `{text}`"))),
					}
				}
				Event::End(_) => {
					stack.pop();
				}
				Event::Eof => break,
				_ => {}
			}
		}

		if !stack.is_empty() {
			return Err(invalid(source_name, "unterminated element"));
		}
		Ok(out)
	}

	fn open(&mut self, element: &BytesStart<'_>, parent: Option<&Open>, source_name: &str) -> Result<Open> {
		let attrs = Attributes {
			element: String::from_utf8_lossy(element.name().as_ref()).into_owned(),
			values: attributes_of(element)?,
			source_name,
		};
		match (parent, attrs.element.as_str()) {
			(None, "module") => Ok(Open::Module),
			(Some(Open::Module), "import") => {
				self.imports.push(attrs.required("format")?);
				Ok(Open::Leaf)
			}
			(Some(Open::Module), "magic") => Ok(Open::Text(TextTarget::Magic)),
			(Some(Open::Module), "extension") => Ok(Open::Text(TextTarget::Extension)),
			(Some(Open::Module), "root") => {
				self.root = Some(attrs.required("type")?);
				Ok(Open::Leaf)
			}
			(Some(Open::Module), "struct") => {
				let params = attrs.optional("params").map(|text| text.split_whitespace().map(str::to_owned).collect()).unwrap_or_default();
				let endian = match attrs.optional("endian") {
					Some(text) => Some(Endianness::parse(&text).ok_or_else(|| invalid(source_name, format!("unknown endianness `{text}`")))?),
					None => None,
				};
				self.structs.push((attrs.required("name")?, StructTemplate::new(params, endian)));
				Ok(Open::Struct)
			}
			(Some(Open::Struct), "field") => {
				let member = Member {
					name: attrs.required("name")?,
					kind: MemberKind::Field {
						ty: TypeExpr::parse(&attrs.required("type")?)?,
						size: attrs.expr("size")?,
					},
				};
				self.push_member(member);
				Ok(Open::Leaf)
			}
			(Some(Open::Struct), "array") => {
				let member = Member {
					name: attrs.required("name")?,
					kind: MemberKind::Array {
						element: TypeExpr::parse(&attrs.required("type")?)?,
						count: attrs.expr("count")?,
						size: attrs.expr("size")?,
						pattern: attrs.optional("pattern").unwrap_or_default(),
					},
				};
				self.push_member(member);
				Ok(Open::Leaf)
			}
			(Some(Open::Module), "enum") => {
				self.enums.push(EnumDescription {
					name: attrs.required("name")?,
					ty: attrs.required("type")?,
					entries: Vec::new(),
				});
				Ok(Open::Enum)
			}
			(Some(Open::Enum), "entry") => {
				let entry = (attrs.required("value")?, attrs.required("label")?);
				if let Some(current) = self.enums.last_mut() {
					current.entries.push(entry);
				}
				Ok(Open::Leaf)
			}
			(Some(Open::Module), "model") => {
				self.models.push(ModelDescription {
					element: attrs.required("element")?,
					src: attrs.optional("src").map(PathBuf::from),
					entries: Vec::new(),
				});
				Ok(Open::Model)
			}
			(Some(Open::Model), "entry") => {
				let entry = ModelEntry {
					id: parse_element_id(&attrs.required("id")?)?,
					name: attrs.required("name")?,
					ty: attrs.required("type")?,
				};
				if let Some(current) = self.models.last_mut() {
					current.entries.push(entry);
				}
				Ok(Open::Leaf)
			}
			(_, name) => Err(invalid(source_name, format!("unexpected element <{name}>"))),
		}
	}

	fn push_member(&mut self, member: Member) {
		if let Some((_, current)) = self.structs.last_mut() {
			current.push(member);
		}
	}
}

/// Module source backed by a parsed description.
#[derive(Debug, Clone)]
pub struct DescriptionModule {
	description: ModuleDescription,
}

impl DescriptionModule {
	/// Wrap a parsed description.
	pub fn new(description: ModuleDescription) -> Self {
		Self { description }
	}

	/// Read and parse a description file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		ModuleDescription::from_file(path).map(Self::new)
	}

	/// Parsed description.
	pub fn description(&self) -> &ModuleDescription {
		&self.description
	}

	fn load_enum(module: &mut Module, description: &EnumDescription) -> Result<()> {
		let mut parameters = vec![Variant::from(module.eval_type(&description.ty)?)];
		for (value, label) in &description.entries {
			parameters.push(TypeExpr::parse(value)?.eval(module, None)?);
			parameters.push(Variant::from(label.as_str()));
		}
		let father = module.new_type("Enum", parameters)?;
		module.add_template(ExtensionBehavior::new(father).into_template(&description.name));
		Ok(())
	}

	fn load_model(&self, module: &mut Module, model: &ModelDescription) -> Result<()> {
		let element = module.template(&model.element).ok_or_else(|| EngineError::UnknownTemplate {
			name: model.element.clone(),
			module: module.key().to_owned(),
		})?;

		let mut entries = model.entries.clone();
		if let Some(src) = &model.src {
			let path = match &self.description.base_dir {
				Some(dir) => dir.join(src),
				None => src.clone(),
			};
			let text = fs::read_to_string(&path)?;
			entries.extend(parse_model(&text, &path.display().to_string())?);
		}

		for entry in &entries {
			if !module.template_names().contains(&entry.name) {
				let father = module.eval_type(&entry.ty)?;
				module.add_template(ExtensionBehavior::new(father).into_template(&entry.name));
			}
			let parent = ObjectType::with_parameters(&element, [Variant::from(entry.id)])?;
			let child = module.get_type(&entry.name)?;
			module.add_specification(parent, child);
		}
		tracing::debug!(module = %module.key(), element = %model.element, entries = entries.len(), "loaded model");
		Ok(())
	}
}

impl ModuleSource for DescriptionModule {
	fn add_format_detection(&self, adder: &mut dyn FormatAdder) {
		for magic in &self.description.magics {
			adder.add_magic_number(magic);
		}
		for extension in &self.description.extensions {
			adder.add_extension(extension);
		}
	}

	fn request_imports(&self) -> Vec<String> {
		self.description.imports.clone()
	}

	fn load(&self, module: &mut Module) -> Result<()> {
		for (name, template) in &self.description.structs {
			module.add_template(template.clone().into_template(name));
		}
		for description in &self.description.enums {
			Self::load_enum(module, description)?;
		}
		for model in &self.description.models {
			self.load_model(module, model)?;
		}
		if let Some(root) = &self.description.root {
			let root = module.eval_type(root)?;
			module.set_root(root);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests;
