use crate::engine::{FixedSize, ObjectType, ParsingContext, Result, TemplateBehavior};

/// `Enum(type, value1, label1, ...)`: decodes `type` and labels every matching value.
pub struct EnumBehavior;

impl TemplateBehavior for EnumBehavior {
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let inner = ty.required_type(0, "no enum type given")?;
		let decoded = ctx.read_detached(&inner)?;
		let value = decoded.value().clone();

		let object = ctx.object_mut();
		for pair in (1..ty.parameter_count()).step_by(2) {
			let (Some(candidate), Some(label)) = (ty.parameter_value(pair), ty.parameter_value(pair + 1)) else {
				continue;
			};
			if *candidate == value {
				object.attributes_mut().push_numbered(label.clone());
			}
		}
		object.set_value(value);
		object.set_size(decoded.size());
		Ok(())
	}

	fn fixed_size(&self, ty: &ObjectType) -> FixedSize {
		match ty.parameter_value(0).and_then(|value| value.as_object_type()) {
			Some(inner) => inner.fixed_size(),
			None => FixedSize::Unknown,
		}
	}
}
