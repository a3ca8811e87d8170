use std::rc::Rc;

use crate::engine::{Endianness, ObjectAttributes, ObjectType, Variable, VariableImplementation, Variant};

/// Decoded node: typed value positioned in the source, with ordered children.
#[derive(Debug, Clone)]
pub struct Object {
	ty: ObjectType,
	declared: ObjectType,
	name: String,
	value: Variant,
	size: Option<u64>,
	pos: u64,
	endianness: Endianness,
	children: Vec<Rc<Object>>,
	attributes: Option<ObjectAttributes>,
}

impl Object {
	/// Create an empty node at bit position `pos`.
	pub fn new(ty: ObjectType, declared: ObjectType, name: impl Into<String>, pos: u64, endianness: Endianness) -> Self {
		Self {
			ty,
			declared,
			name: name.into(),
			value: Variant::null(),
			size: None,
			pos,
			endianness,
			children: Vec::new(),
			attributes: None,
		}
	}

	/// Type the node was decoded as, after specialization.
	pub fn ty(&self) -> &ObjectType {
		&self.ty
	}

	/// Type requested by the parent, before specialization.
	pub fn declared_type(&self) -> &ObjectType {
		&self.declared
	}

	/// Node name within its parent.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Decoded value.
	pub fn value(&self) -> &Variant {
		&self.value
	}

	/// Replace the decoded value.
	pub fn set_value(&mut self, value: impl Into<Variant>) {
		self.value = value.into();
	}

	/// Size in bits; zero until known.
	pub fn size(&self) -> u64 {
		self.size.unwrap_or(0)
	}

	/// Whether a size was set explicitly or by decoding.
	pub fn has_size(&self) -> bool {
		self.size.is_some()
	}

	/// Set the size in bits.
	pub fn set_size(&mut self, bits: u64) {
		self.size = Some(bits);
	}

	/// Bit position of the first bit.
	pub fn pos(&self) -> u64 {
		self.pos
	}

	/// Bit position one past the last bit, when the size is known and the end is addressable.
	pub fn end(&self) -> Option<u64> {
		self.size.and_then(|size| self.pos.checked_add(size))
	}

	/// Byte order inherited by children.
	pub fn endianness(&self) -> Endianness {
		self.endianness
	}

	/// Override the byte order for this node and its children.
	pub fn set_endianness(&mut self, endianness: Endianness) {
		self.endianness = endianness;
	}

	/// Children in decode order.
	pub fn children(&self) -> &[Rc<Object>] {
		&self.children
	}

	/// First child named `name`.
	pub fn child(&self, name: &str) -> Option<&Rc<Object>> {
		self.children.iter().find(|child| child.name == name)
	}

	/// Follow a dotted path of child names; numeric segments index children.
	pub fn lookup(&self, path: &str) -> Option<&Object> {
		let mut current = self;
		for segment in path.split('.').filter(|segment| !segment.is_empty()) {
			let next = match segment.parse::<usize>() {
				Ok(index) => current.children.get(index),
				Err(_) => current.child(segment),
			};
			current = next?;
		}
		Some(current)
	}

	/// Append a decoded child.
	pub fn push_child(&mut self, child: Rc<Object>) {
		self.children.push(child);
	}

	/// Attribute list, if any was recorded.
	pub fn attributes(&self) -> Option<&ObjectAttributes> {
		self.attributes.as_ref()
	}

	/// Attribute list, created on first use.
	pub fn attributes_mut(&mut self) -> &ObjectAttributes {
		self.attributes.get_or_insert_with(ObjectAttributes::new)
	}

	/// Named attribute value.
	pub fn named_attribute(&self, name: &str) -> Option<Variant> {
		self.attributes.as_ref()?.get_named(name)
	}

	/// Numbered attribute value.
	pub fn numbered_attribute(&self, index: usize) -> Option<Variant> {
		self.attributes.as_ref()?.get_numbered(index)
	}

	/// Named attribute names in insertion order.
	pub fn attribute_names(&self) -> Vec<String> {
		self.attributes.as_ref().map(ObjectAttributes::field_names).unwrap_or_default()
	}

	/// Constant accessor over a finished node.
	///
	/// Its value is the decoded value; string keys resolve children, then named attributes;
	/// numeric keys index children.
	pub fn variable(self: &Rc<Self>) -> Variable {
		Variable::new(Rc::new(ObjectSnapshot(Rc::clone(self))), false)
	}
}

struct ObjectSnapshot(Rc<Object>);

impl VariableImplementation for ObjectSnapshot {
	fn value(&self) -> Variant {
		self.0.value.clone()
	}

	fn field(&self, key: &Variant, _modifiable: bool, _create_if_needed: bool) -> Variable {
		let object = &self.0;
		if let Some(name) = key.as_string() {
			if let Some(child) = object.child(name) {
				return child.variable();
			}
			return match object.named_attribute(name) {
				Some(value) => Variable::constant(value),
				None => Variable::undefined(),
			};
		}
		if key.has_numerical_kind() {
			let child = usize::try_from(key.to_integer()).ok().and_then(|index| object.children.get(index));
			return child.map_or_else(Variable::undefined, Object::variable);
		}
		Variable::undefined()
	}
}
