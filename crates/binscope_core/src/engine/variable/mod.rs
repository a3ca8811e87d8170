use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::engine::Variant;

/// Shared storage cell addressed by variables.
pub type Slot = Rc<RefCell<Variant>>;
/// Positional call arguments.
pub type VariableArgs = Vec<Variable>;
/// Named call arguments.
pub type VariableKeywordArgs = HashMap<String, Variable>;
/// Callable body bound by [`Variable::lambda`].
pub type VariableLambda = Rc<dyn Fn(&VariableArgs, &VariableKeywordArgs) -> Variable>;

/// Create a fresh storage cell.
pub fn slot(value: Variant) -> Slot {
	Rc::new(RefCell::new(value))
}

/// Backing store behind a [`Variable`].
///
/// Every method has a default that reports the capability as missing, so stores only
/// implement what they support.
pub trait VariableImplementation {
	/// Read the current value.
	fn value(&self) -> Variant {
		Variant::undefined()
	}

	/// Replace the current value.
	fn set_value(&self, _value: Variant) {
		tracing::error!("variable has no settable value");
	}

	/// Resolve one key-indexed sub-variable.
	fn field(&self, _key: &Variant, _modifiable: bool, _create_if_needed: bool) -> Variable {
		Variable::undefined()
	}

	/// Bind a sub-variable under `key`.
	fn set_field(&self, key: &Variant, _variable: Variable) {
		tracing::error!(key = %key, "variable has no settable fields");
	}

	/// Remove the sub-variable under `key`.
	fn remove_field(&self, key: &Variant) {
		tracing::error!(key = %key, "variable has no removable fields");
	}

	/// Invoke as a function.
	fn call(&self, _args: &VariableArgs, _kwargs: &VariableKeywordArgs) -> Variable {
		tracing::error!("variable is not callable");
		Variable::undefined()
	}
}

/// Multi-key field path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariablePath {
	keys: Vec<Variant>,
}

impl VariablePath {
	/// Create an empty path.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse a dotted path; all-digit segments become numeric keys.
	pub fn parse(text: &str) -> Self {
		let keys = text
			.split('.')
			.filter(|segment| !segment.is_empty())
			.map(|segment| match segment.parse::<i64>() {
				Ok(number) => Variant::from(number),
				Err(_) => Variant::from(segment),
			})
			.collect();
		Self { keys }
	}

	/// Append one key.
	pub fn push(&mut self, key: impl Into<Variant>) {
		self.keys.push(key.into());
	}

	/// Borrow the keys in order.
	pub fn keys(&self) -> &[Variant] {
		&self.keys
	}

	/// Number of keys.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Whether the path has no keys.
	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}
}

impl<K: Into<Variant>> FromIterator<K> for VariablePath {
	fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
		Self {
			keys: iter.into_iter().map(Into::into).collect(),
		}
	}
}

/// Uniform getter/setter handle over some storage.
///
/// A constant variable never writes through to its storage: [`set_value`](Self::set_value)
/// rebinds it to a private copy instead, and every field reached through it is constant too.
#[derive(Clone, Default)]
pub struct Variable {
	implementation: Option<Rc<dyn VariableImplementation>>,
	modifiable: bool,
}

impl Variable {
	/// Wrap a backing store.
	pub fn new(implementation: Rc<dyn VariableImplementation>, modifiable: bool) -> Self {
		Self {
			implementation: Some(implementation),
			modifiable,
		}
	}

	/// Variable bound to nothing; check [`is_defined`](Self::is_defined) before use.
	pub fn undefined() -> Self {
		Self::default()
	}

	/// Modifiable variable owning a private copy of `value`.
	pub fn copy(value: Variant) -> Self {
		Self::reference(slot(value))
	}

	/// Constant variable owning a private copy of `value`.
	pub fn constant(value: Variant) -> Self {
		Self::constant_reference(slot(value))
	}

	/// Modifiable variable owning a null value.
	pub fn null() -> Self {
		Self::copy(Variant::null())
	}

	/// Modifiable variable writing through to `slot`.
	pub fn reference(slot: Slot) -> Self {
		Self::new(Rc::new(SlotVariable(slot)), true)
	}

	/// Constant variable reading from `slot`.
	pub fn constant_reference(slot: Slot) -> Self {
		Self::new(Rc::new(SlotVariable(slot)), false)
	}

	/// Callable variable.
	pub fn lambda(body: impl Fn(&VariableArgs, &VariableKeywordArgs) -> Variable + 'static) -> Self {
		Self::new(Rc::new(LambdaVariable(Rc::new(body))), false)
	}

	/// Whether the variable is bound to a store.
	pub fn is_defined(&self) -> bool {
		self.implementation.is_some()
	}

	/// Whether writes go through to the bound store.
	pub fn is_modifiable(&self) -> bool {
		self.modifiable
	}

	/// Make the variable constant.
	pub fn set_constant(&mut self) {
		self.modifiable = false;
	}

	/// Read the value; undefined variables read as undefined.
	pub fn value(&self) -> Variant {
		match &self.implementation {
			Some(implementation) => implementation.value(),
			None => Variant::undefined(),
		}
	}

	/// Replace the value, or rebind to a private copy when constant.
	pub fn set_value(&mut self, value: Variant) {
		match &self.implementation {
			None => tracing::error!(value = %value, "assignment to undefined variable"),
			Some(implementation) if self.modifiable => implementation.set_value(value),
			Some(_) => *self = Self::copy(value),
		}
	}

	/// Resolve one field. Creation is refused through constant variables.
	pub fn field(&self, key: &Variant, modifiable: bool, create_if_needed: bool) -> Variable {
		let Some(implementation) = &self.implementation else {
			return Self::undefined();
		};
		let writable = modifiable && self.modifiable;
		let mut out = implementation.field(key, writable, create_if_needed && self.modifiable);
		if !writable {
			out.set_constant();
		}
		out
	}

	/// Resolve a field path one key at a time; stops at the first undefined step.
	pub fn field_path(&self, path: &VariablePath, modifiable: bool, create_if_needed: bool) -> Variable {
		let mut current = self.clone();
		for key in path.keys() {
			current = current.field(key, modifiable, create_if_needed);
			if !current.is_defined() {
				break;
			}
		}
		current
	}

	/// Bind `variable` under `key`.
	pub fn set_field(&self, key: &Variant, variable: Variable) {
		match &self.implementation {
			Some(implementation) if self.modifiable => implementation.set_field(key, variable),
			Some(_) => tracing::error!(key = %key, "field assignment through constant variable"),
			None => tracing::error!(key = %key, "field assignment on undefined variable"),
		}
	}

	/// Bind `variable` at the end of `path`, creating intermediate fields.
	pub fn set_field_path(&self, path: &VariablePath, variable: Variable) {
		let Some((last, parents)) = path.keys().split_last() else {
			return;
		};
		let parent = parents.iter().fold(self.clone(), |current, key| current.field(key, true, true));
		parent.set_field(last, variable);
	}

	/// Remove the field under `key`.
	pub fn remove_field(&self, key: &Variant) {
		match &self.implementation {
			Some(implementation) if self.modifiable => implementation.remove_field(key),
			Some(_) => tracing::error!(key = %key, "field removal through constant variable"),
			None => tracing::error!(key = %key, "field removal on undefined variable"),
		}
	}

	/// Invoke a callable variable.
	pub fn call(&self, args: &VariableArgs, kwargs: &VariableKeywordArgs) -> Variable {
		match &self.implementation {
			Some(implementation) => implementation.call(args, kwargs),
			None => {
				tracing::error!("call on undefined variable");
				Self::undefined()
			}
		}
	}
}

impl fmt::Debug for Variable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if !self.is_defined() {
			return f.write_str("Variable(undefined)");
		}
		f.debug_struct("Variable").field("value", &self.value()).field("modifiable", &self.modifiable).finish()
	}
}

struct SlotVariable(Slot);

impl VariableImplementation for SlotVariable {
	fn value(&self) -> Variant {
		self.0.borrow().clone()
	}

	fn set_value(&self, value: Variant) {
		*self.0.borrow_mut() = value;
	}
}

struct LambdaVariable(VariableLambda);

impl VariableImplementation for LambdaVariable {
	fn call(&self, args: &VariableArgs, kwargs: &VariableKeywordArgs) -> Variable {
		(self.0)(args, kwargs)
	}
}
