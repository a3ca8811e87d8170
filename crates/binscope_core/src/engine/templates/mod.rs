use crate::engine::{Module, ObjectTypeTemplate};

mod container;
mod enumeration;
mod integer;
mod scalar;
mod structure;

/// Element containers and their child naming.
pub use container::{ArrayBehavior, ElementNamer, TupleBehavior};
/// Labelled value decoding.
pub use enumeration::EnumBehavior;
/// Integer, byte and uuid decoding.
pub use integer::{ByteBehavior, IntBehavior, UintBehavior, UuidBehavior};
/// Float and string decoding.
pub use scalar::{FloatBehavior, StringBehavior};
/// Description-defined records and named aliases.
pub use structure::{ExtensionBehavior, Member, MemberKind, StructTemplate};

/// Register the built-in templates on `module`.
pub fn register_default_templates(module: &mut Module) {
	module.add_template(ObjectTypeTemplate::new("int", ["size", "_base"], IntBehavior));
	module.add_template(ObjectTypeTemplate::new("uint", ["size", "_base"], UintBehavior));
	module.add_template(ObjectTypeTemplate::new("byte", Vec::<String>::new(), ByteBehavior));
	module.add_template(ObjectTypeTemplate::new("uuid", Vec::<String>::new(), UuidBehavior));
	module.add_template(ObjectTypeTemplate::new("float", ["size"], FloatBehavior));
	module.add_template(ObjectTypeTemplate::new("String", ["size"], StringBehavior));
	module.add_template(ObjectTypeTemplate::variadic("Enum", ["type"], EnumBehavior));
	module.add_template(ObjectTypeTemplate::new("Array", ["elementType", "size", "namePattern"], ArrayBehavior));
	module.add_template(ObjectTypeTemplate::new("Tuple", ["elementType", "count", "namePattern"], TupleBehavior));
}

#[cfg(test)]
mod tests;
