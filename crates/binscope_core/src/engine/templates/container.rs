use crate::engine::{EngineError, FixedSize, ObjectType, ParsingContext, Result, TemplateBehavior};

/// Child naming shared by element containers.
///
/// A pattern without `%` names every child the same; otherwise `%` is replaced by the
/// zero-based child index. An empty pattern behaves as `#`.
#[derive(Debug, Clone)]
pub struct ElementNamer {
	parts: Vec<String>,
}

impl ElementNamer {
	/// Build a namer from a pattern.
	pub fn new(pattern: &str) -> Self {
		let pattern = if pattern.is_empty() { "#" } else { pattern };
		Self {
			parts: pattern.split('%').map(str::to_owned).collect(),
		}
	}

	/// Name of the child at `index`.
	pub fn name(&self, index: usize) -> String {
		match self.parts.as_slice() {
			[fixed] => fixed.clone(),
			parts => parts.join(&index.to_string()),
		}
	}
}

fn pattern_of(ty: &ObjectType, index: usize) -> ElementNamer {
	let pattern = ty.parameter_value(index).map(|value| value.to_str().to_owned()).unwrap_or_default();
	ElementNamer::new(&pattern)
}

/// Decode exactly `count` elements, or elements until the region ends when `count` is `None`.
fn read_elements(ctx: &mut ParsingContext<'_, '_>, element: &ObjectType, namer: &ElementNamer, count: Option<u64>) -> Result<()> {
	let fixed = ctx.module().specify(element).fixed_size();
	let max_children = ctx.options().max_children;
	let mut index = 0_usize;

	loop {
		let done = match count {
			Some(count) => index as u64 >= count,
			None => ctx.remaining() == 0,
		};
		if done {
			return Ok(());
		}

		if index >= max_children {
			let Some(bits) = fixed.bits().filter(|bits| *bits > 0) else {
				return Err(EngineError::DecodeTooManyChildren {
					count: index,
					max: max_children,
				});
			};
			let fit = ctx.remaining() / bits;
			let skipped = count.map_or(fit, |count| (count - index as u64).min(fit));
			let target = ctx.tell() + skipped * bits;
			ctx.file().seek(target);
			ctx.object_mut().attributes_mut().set_named("skipped", skipped);
			tracing::debug!(skipped, element = %element, "container child limit reached");
			return Ok(());
		}

		let before = ctx.tell();
		ctx.read_child(element, &namer.name(index))?;
		index += 1;
		if ctx.tell() == before && count.is_none() {
			tracing::warn!(element = %element, "zero-sized element ends unbounded container");
			return Ok(());
		}
	}
}

/// `Array(elementType, size, namePattern)`: elements filling `size` bits, or the enclosing region.
pub struct ArrayBehavior;

impl TemplateBehavior for ArrayBehavior {
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let element = ty.required_type(0, "no element type given")?;
		if let Some(size) = ty.optional_unsigned(1)? {
			ctx.object_mut().set_size(size);
		}
		read_elements(ctx, &element, &pattern_of(ty, 2), None)
	}

	fn fixed_size(&self, ty: &ObjectType) -> FixedSize {
		match ty.optional_unsigned(1) {
			Ok(Some(size)) => FixedSize::Bits(size),
			_ => FixedSize::Unknown,
		}
	}
}

/// `Tuple(elementType, count, namePattern)`: exactly `count` elements.
pub struct TupleBehavior;

impl TemplateBehavior for TupleBehavior {
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let element = ty.required_type(0, "no element type given")?;
		let count = ty.required_unsigned(1, "no element count given")?;
		read_elements(ctx, &element, &pattern_of(ty, 2), Some(count))
	}

	fn fixed_size(&self, ty: &ObjectType) -> FixedSize {
		let element = ty.parameter_value(0).and_then(|value| value.as_object_type()).map(ObjectType::fixed_size);
		match (element, ty.optional_unsigned(1)) {
			(Some(FixedSize::Bits(bits)), Ok(Some(count))) => bits.checked_mul(count).map_or(FixedSize::Unknown, FixedSize::Bits),
			_ => FixedSize::Unknown,
		}
	}
}
