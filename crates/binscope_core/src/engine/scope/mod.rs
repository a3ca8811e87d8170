use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::{Variable, VariableImplementation, Variant};

/// Name resolution frame used while evaluating type expressions.
pub trait Scope {
	/// Resolve `key`; missing names yield an undefined variable.
	fn get(&self, key: &str) -> Variable;

	/// Introduce a new binding in this frame.
	fn declare(&self, key: &str) -> Variable {
		tracing::error!(key, "scope does not accept declarations");
		Variable::undefined()
	}

	/// Nested scope reachable through `key`.
	fn get_scope(&self, key: &str) -> Option<Box<dyn Scope>> {
		let variable = self.get(key);
		variable.is_defined().then(|| Box::new(VariableScope::new(variable)) as Box<dyn Scope>)
	}
}

/// Resolve a dotted name such as `header.count` through nested scopes.
pub fn resolve_path(scope: &dyn Scope, path: &str) -> Variable {
	let mut segments = path.split('.');
	let Some(first) = segments.next() else {
		return Variable::undefined();
	};
	let mut rest: Vec<&str> = segments.collect();
	let Some(last) = rest.pop() else {
		return scope.get(first);
	};

	let Some(mut current) = scope.get_scope(first) else {
		return Variable::undefined();
	};
	for segment in rest {
		match current.get_scope(segment) {
			Some(next) => current = next,
			None => return Variable::undefined(),
		}
	}
	current.get(last)
}

fn key_variant(key: &str) -> Variant {
	match key.parse::<i64>() {
		Ok(number) => Variant::from(number),
		Err(_) => Variant::from(key),
	}
}

/// Scope view over the fields of a variable.
pub struct VariableScope {
	variable: Variable,
}

impl VariableScope {
	/// Wrap `variable`.
	pub fn new(variable: Variable) -> Self {
		Self { variable }
	}
}

impl Scope for VariableScope {
	fn get(&self, key: &str) -> Variable {
		self.variable.field(&key_variant(key), false, false)
	}

	fn declare(&self, key: &str) -> Variable {
		let key = key_variant(key);
		if self.variable.field(&key, false, false).is_defined() {
			tracing::error!(key = %key, "name already declared");
			return Variable::undefined();
		}
		self.variable.field(&key, true, true)
	}
}

/// Frame of local bindings chained to one parent context.
///
/// Lookups fall through to the context variable's fields when a name is not bound locally.
pub struct LocalScope {
	context: Variable,
	fields: RefCell<HashMap<String, Variable>>,
}

impl LocalScope {
	/// Create a frame above `context`; pass an undefined variable for a root frame.
	pub fn new(context: Variable) -> Rc<Self> {
		Rc::new(Self {
			context,
			fields: RefCell::new(HashMap::new()),
		})
	}

	/// Bind or rebind `key` in this frame.
	pub fn bind(&self, key: &str, variable: Variable) {
		self.fields.borrow_mut().insert(key.to_owned(), variable);
	}

	/// Whether `key` is bound in this frame.
	pub fn is_bound(&self, key: &str) -> bool {
		self.fields.borrow().contains_key(key)
	}

	/// Accessor over this frame, usable as the context of a nested frame.
	pub fn variable(self: &Rc<Self>) -> Variable {
		Variable::new(Rc::clone(self) as Rc<dyn VariableImplementation>, true)
	}
}

impl Scope for LocalScope {
	fn get(&self, key: &str) -> Variable {
		if let Some(bound) = self.fields.borrow().get(key) {
			return bound.clone();
		}
		if self.context.is_defined() {
			return self.context.field(&key_variant(key), false, false);
		}
		Variable::undefined()
	}

	fn declare(&self, key: &str) -> Variable {
		if self.is_bound(key) {
			tracing::error!(key, "name already declared in this scope");
			return Variable::undefined();
		}
		let variable = Variable::null();
		self.bind(key, variable.clone());
		variable
	}
}

impl VariableImplementation for LocalScope {
	fn value(&self) -> Variant {
		Variant::null()
	}

	fn field(&self, key: &Variant, modifiable: bool, create_if_needed: bool) -> Variable {
		let name = key.to_string();
		let found = self.get(&name);
		if found.is_defined() || !create_if_needed {
			let mut found = found;
			if !modifiable {
				found.set_constant();
			}
			return found;
		}
		self.declare(&name)
	}

	fn set_field(&self, key: &Variant, variable: Variable) {
		self.bind(&key.to_string(), variable);
	}

	fn remove_field(&self, key: &Variant) {
		self.fields.borrow_mut().remove(&key.to_string());
	}
}
