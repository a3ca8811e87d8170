use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::engine::{EngineError, ParsingContext, Result, Variant};

/// Statically known size of a type, in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedSize {
	/// Every instance occupies exactly this many bits.
	Bits(u64),
	/// Size depends on the decoded data.
	Unknown,
}

impl FixedSize {
	/// Return the bit count when known.
	pub fn bits(self) -> Option<u64> {
		match self {
			Self::Bits(bits) => Some(bits),
			Self::Unknown => None,
		}
	}
}

/// Decode behavior attached to a template.
pub trait TemplateBehavior {
	/// Decode one instance of `ty` at the context cursor into the context object.
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()>;

	/// Static size of `ty`, if every instance has the same size.
	fn fixed_size(&self, _ty: &ObjectType) -> FixedSize {
		FixedSize::Unknown
	}
}

/// Named, parametrized type constructor.
///
/// Two templates are equal when their names are equal; behavior is not compared.
pub struct ObjectTypeTemplate {
	name: String,
	parameter_names: Vec<String>,
	variadic: bool,
	behavior: Box<dyn TemplateBehavior>,
}

impl ObjectTypeTemplate {
	/// Create a template with a fixed parameter list.
	pub fn new<S: Into<String>>(name: impl Into<String>, parameter_names: impl IntoIterator<Item = S>, behavior: impl TemplateBehavior + 'static) -> Rc<Self> {
		Rc::new(Self {
			name: name.into(),
			parameter_names: parameter_names.into_iter().map(Into::into).collect(),
			variadic: false,
			behavior: Box::new(behavior),
		})
	}

	/// Create a template accepting parameters past the declared ones.
	pub fn variadic<S: Into<String>>(name: impl Into<String>, parameter_names: impl IntoIterator<Item = S>, behavior: impl TemplateBehavior + 'static) -> Rc<Self> {
		Rc::new(Self {
			name: name.into(),
			parameter_names: parameter_names.into_iter().map(Into::into).collect(),
			variadic: true,
			behavior: Box::new(behavior),
		})
	}

	/// Template name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared parameter names.
	pub fn parameter_names(&self) -> &[String] {
		&self.parameter_names
	}

	/// Declared parameter count.
	pub fn parameter_count(&self) -> usize {
		self.parameter_names.len()
	}

	/// Position of a declared parameter.
	pub fn parameter_number(&self, name: &str) -> Option<usize> {
		self.parameter_names.iter().position(|candidate| candidate == name)
	}

	/// Name of the parameter at `index`; variadic extras are named by position.
	pub fn parameter_name(&self, index: usize) -> Option<String> {
		match self.parameter_names.get(index) {
			Some(name) => Some(name.clone()),
			None if self.variadic => Some(index.to_string()),
			None => None,
		}
	}

	/// Whether parameters past the declared list are accepted.
	pub fn is_variadic(&self) -> bool {
		self.variadic
	}

	/// Decode behavior.
	pub fn behavior(&self) -> &dyn TemplateBehavior {
		self.behavior.as_ref()
	}
}

impl PartialEq for ObjectTypeTemplate {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

impl Eq for ObjectTypeTemplate {}

impl fmt::Debug for ObjectTypeTemplate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObjectTypeTemplate")
			.field("name", &self.name)
			.field("parameter_names", &self.parameter_names)
			.field("variadic", &self.variadic)
			.finish_non_exhaustive()
	}
}

/// Template instance with optionally specified parameters.
///
/// The null type has no template and renders as an empty name.
#[derive(Clone, Default)]
pub struct ObjectType {
	template: Option<Rc<ObjectTypeTemplate>>,
	parameters: Vec<Option<Variant>>,
}

impl ObjectType {
	/// Instance of `template` with every parameter unspecified.
	pub fn new(template: &Rc<ObjectTypeTemplate>) -> Self {
		Self {
			template: Some(Rc::clone(template)),
			parameters: Vec::new(),
		}
	}

	/// Instance of `template` with leading parameters bound in order.
	pub fn with_parameters(template: &Rc<ObjectTypeTemplate>, parameters: impl IntoIterator<Item = Variant>) -> Result<Self> {
		let mut ty = Self::new(template);
		for (index, value) in parameters.into_iter().enumerate() {
			ty.set_parameter(index, value)?;
		}
		Ok(ty)
	}

	/// Type with no template.
	pub fn null() -> Self {
		Self::default()
	}

	/// Whether this is the null type.
	pub fn is_null(&self) -> bool {
		self.template.is_none()
	}

	/// Template name, or `""` for the null type.
	pub fn name(&self) -> &str {
		self.template.as_deref().map_or("", ObjectTypeTemplate::name)
	}

	/// Underlying template.
	pub fn template(&self) -> Option<&Rc<ObjectTypeTemplate>> {
		self.template.as_ref()
	}

	/// Number of parameter positions bound so far, specified or not.
	pub fn parameter_count(&self) -> usize {
		self.parameters.len()
	}

	/// Whether the parameter at `index` has been specified.
	pub fn parameter_specified(&self, index: usize) -> bool {
		matches!(self.parameters.get(index), Some(Some(_)))
	}

	/// Value of a specified parameter.
	pub fn parameter_value(&self, index: usize) -> Option<&Variant> {
		self.parameters.get(index).and_then(Option::as_ref)
	}

	/// Value of a specified parameter looked up by declared name.
	pub fn parameter_by_name(&self, name: &str) -> Option<&Variant> {
		let index = self.template.as_ref()?.parameter_number(name)?;
		self.parameter_value(index)
	}

	/// Specify the parameter at `index`.
	pub fn set_parameter(&mut self, index: usize, value: Variant) -> Result<()> {
		let Some(template) = &self.template else {
			return Err(EngineError::TooManyParameters {
				template: String::new(),
				got: index + 1,
				max: 0,
			});
		};
		if !template.is_variadic() && index >= template.parameter_count() {
			return Err(EngineError::TooManyParameters {
				template: template.name().to_owned(),
				got: index + 1,
				max: template.parameter_count(),
			});
		}
		if self.parameters.len() <= index {
			self.parameters.resize(index + 1, None);
		}
		self.parameters[index] = Some(value);
		Ok(())
	}

	/// Mark the parameter at `index` unspecified again.
	pub fn clear_parameter(&mut self, index: usize) {
		if let Some(slot) = self.parameters.get_mut(index) {
			*slot = None;
		}
		while matches!(self.parameters.last(), Some(None)) {
			self.parameters.pop();
		}
	}

	/// Static size through the template behavior.
	pub fn fixed_size(&self) -> FixedSize {
		match &self.template {
			Some(template) => template.behavior().fixed_size(self),
			None => FixedSize::Unknown,
		}
	}

	/// Copy keeping only the first `count` parameter positions.
	pub fn truncated(&self, count: usize) -> ObjectType {
		let mut out = self.clone();
		out.parameters.truncate(count);
		while matches!(out.parameters.last(), Some(None)) {
			out.parameters.pop();
		}
		out
	}

	/// Required parameter as an unsigned count, with a structural error when missing.
	pub fn required_unsigned(&self, index: usize, reason: &'static str) -> Result<u64> {
		let value = self.parameter_value(index).ok_or_else(|| self.missing(index, reason))?;
		self.unsigned_value(index, value)
	}

	/// Optional parameter as an unsigned count.
	pub fn optional_unsigned(&self, index: usize) -> Result<Option<u64>> {
		match self.parameter_value(index) {
			Some(value) => self.unsigned_value(index, value).map(Some),
			None => Ok(None),
		}
	}

	/// Required parameter holding an object type.
	pub fn required_type(&self, index: usize, reason: &'static str) -> Result<ObjectType> {
		let value = self.parameter_value(index).ok_or_else(|| self.missing(index, reason))?;
		match value.as_object_type() {
			Some(ty) if !ty.is_null() => Ok(ty.clone()),
			_ => Err(self.bad_parameter(index, value)),
		}
	}

	/// Structural error for a missing parameter.
	pub fn missing(&self, index: usize, reason: &'static str) -> EngineError {
		EngineError::MissingParameter {
			template: self.name().to_owned(),
			parameter: self.declared_name(index),
			reason,
		}
	}

	/// Structural error for an unusable parameter value.
	pub fn bad_parameter(&self, index: usize, value: &Variant) -> EngineError {
		EngineError::BadParameter {
			template: self.name().to_owned(),
			parameter: self.declared_name(index),
			value: value.simple_display().to_string(),
		}
	}

	fn unsigned_value(&self, index: usize, value: &Variant) -> Result<u64> {
		if !value.has_numerical_kind() || value.to_double() < 0.0 {
			return Err(self.bad_parameter(index, value));
		}
		Ok(value.to_unsigned_integer())
	}

	fn declared_name(&self, index: usize) -> String {
		self.template
			.as_ref()
			.and_then(|template| template.parameter_name(index))
			.unwrap_or_else(|| index.to_string())
	}
}

impl PartialEq for ObjectType {
	fn eq(&self, other: &Self) -> bool {
		self.name() == other.name() && self.parameters == other.parameters
	}
}

impl Eq for ObjectType {}

impl Hash for ObjectType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.name().hash(state);
		self.parameters.hash(state);
	}
}

impl fmt::Display for ObjectType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())?;
		if self.parameters.is_empty() {
			return Ok(());
		}
		f.write_str("(")?;
		for (index, parameter) in self.parameters.iter().enumerate() {
			if index > 0 {
				f.write_str(", ")?;
			}
			if let Some(value) = parameter {
				write!(f, "{}", value.simple_display())?;
			}
		}
		f.write_str(")")
	}
}

impl fmt::Debug for ObjectType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ObjectType({self})")
	}
}
