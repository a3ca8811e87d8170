use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::engine::{Slot, Variable, VariableImplementation, Variant, slot};

#[derive(Default)]
struct AttributeStore {
	numbered: Vec<Slot>,
	named: HashMap<String, Slot>,
	names: Vec<String>,
}

/// Numbered sequence plus insertion-ordered named map attached to a decoded object.
///
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct ObjectAttributes {
	store: Rc<RefCell<AttributeStore>>,
}

impl ObjectAttributes {
	/// Create an empty attribute list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a null numbered attribute and return a modifiable handle to it.
	pub fn add_numbered(&self) -> Variable {
		let cell = slot(Variant::null());
		self.store.borrow_mut().numbered.push(Rc::clone(&cell));
		Variable::reference(cell)
	}

	/// Append a numbered attribute holding `value`.
	pub fn push_numbered(&self, value: impl Into<Variant>) {
		self.add_numbered().set_value(value.into());
	}

	/// Create a named attribute; an existing name logs an error and yields undefined.
	pub fn add_named(&self, name: &str) -> Variable {
		let mut store = self.store.borrow_mut();
		if store.named.contains_key(name) {
			tracing::error!(name, "attribute name already exists");
			return Variable::undefined();
		}
		let cell = slot(Variant::null());
		store.named.insert(name.to_owned(), Rc::clone(&cell));
		store.names.push(name.to_owned());
		Variable::reference(cell)
	}

	/// Create a named attribute holding `value`.
	pub fn set_named(&self, name: &str, value: impl Into<Variant>) {
		self.add_named(name).set_value(value.into());
	}

	/// Read the numbered attribute at `index`.
	pub fn get_numbered(&self, index: usize) -> Option<Variant> {
		self.store.borrow().numbered.get(index).map(|cell| cell.borrow().clone())
	}

	/// Read the named attribute `name`.
	pub fn get_named(&self, name: &str) -> Option<Variant> {
		self.store.borrow().named.get(name).map(|cell| cell.borrow().clone())
	}

	/// Number of numbered attributes.
	pub fn numbered_count(&self) -> usize {
		self.store.borrow().numbered.len()
	}

	/// Named attribute names in insertion order.
	pub fn field_names(&self) -> Vec<String> {
		self.store.borrow().names.clone()
	}

	/// Whether no attribute was recorded.
	pub fn is_empty(&self) -> bool {
		let store = self.store.borrow();
		store.numbered.is_empty() && store.named.is_empty()
	}

	/// Accessor over this attribute list.
	pub fn variable(&self, modifiable: bool) -> Variable {
		Variable::new(Rc::new(self.clone()), modifiable)
	}

	fn numbered_field(&self, number: i64, create_if_needed: bool) -> Variable {
		let Ok(index) = usize::try_from(number) else {
			if create_if_needed {
				tracing::error!(number, "negative numbered attribute key");
			}
			return Variable::undefined();
		};
		if create_if_needed {
			while self.numbered_count() <= index {
				self.add_numbered();
			}
		}
		match self.store.borrow().numbered.get(index) {
			Some(cell) => Variable::reference(Rc::clone(cell)),
			None => Variable::undefined(),
		}
	}

	fn named_field(&self, name: &str, create_if_needed: bool) -> Variable {
		if create_if_needed {
			return self.add_named(name);
		}
		match self.store.borrow().named.get(name) {
			Some(cell) => Variable::reference(Rc::clone(cell)),
			None => Variable::undefined(),
		}
	}
}

impl fmt::Debug for ObjectAttributes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let store = self.store.borrow();
		let numbered: Vec<Variant> = store.numbered.iter().map(|cell| cell.borrow().clone()).collect();
		let named: Vec<(&str, Variant)> = store
			.names
			.iter()
			.filter_map(|name| store.named.get(name).map(|cell| (name.as_str(), cell.borrow().clone())))
			.collect();
		f.debug_struct("ObjectAttributes").field("numbered", &numbered).field("named", &named).finish()
	}
}

impl VariableImplementation for ObjectAttributes {
	fn field(&self, key: &Variant, _modifiable: bool, create_if_needed: bool) -> Variable {
		if key.is_valueless() {
			if create_if_needed {
				return self.add_numbered();
			}
			let last = self.store.borrow().numbered.last().cloned();
			return last.map_or_else(Variable::undefined, Variable::constant_reference);
		}
		if key.has_numerical_kind() {
			return self.numbered_field(key.to_integer(), create_if_needed);
		}
		if let Some(name) = key.as_string() {
			return self.named_field(name, create_if_needed);
		}
		if create_if_needed {
			tracing::error!(kind = key.kind().as_str(), "invalid attribute key kind");
		}
		Variable::undefined()
	}

	fn set_field(&self, key: &Variant, variable: Variable) {
		let existing = self.field(key, true, false);
		let mut target = if existing.is_defined() && !key.is_valueless() {
			existing
		} else {
			self.field(key, true, true)
		};
		if target.is_defined() {
			target.set_value(variable.value());
		}
	}

	fn remove_field(&self, key: &Variant) {
		let Some(name) = key.as_string() else {
			tracing::error!(key = %key, "only named attributes can be removed");
			return;
		};
		let mut store = self.store.borrow_mut();
		if store.named.remove(name).is_some() {
			store.names.retain(|candidate| candidate != name);
		}
	}
}

#[cfg(test)]
mod tests;
