use crate::engine::{EngineError, FixedSize, ObjectType, ParsingContext, Result, TemplateBehavior, Variant};

/// `float(size)`: IEEE 754 binary32 or binary64.
pub struct FloatBehavior;

impl TemplateBehavior for FloatBehavior {
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let size = ty.required_unsigned(0, "no float size given")?;
		let endianness = ctx.endianness();
		let value = match size {
			32 => f64::from(f32::from_bits(ctx.file().read_uint(32, endianness)? as u32)),
			64 => f64::from_bits(ctx.file().read_uint(64, endianness)?),
			other => return Err(EngineError::UnsupportedFloatSize { size: other as i64 }),
		};
		ctx.object_mut().set_value(value);
		Ok(())
	}

	fn fixed_size(&self, ty: &ObjectType) -> FixedSize {
		match ty.optional_unsigned(0) {
			Ok(Some(size @ (32 | 64))) => FixedSize::Bits(size),
			_ => FixedSize::Unknown,
		}
	}
}

/// `String(size)`: `size` bytes of text, or NUL-terminated text when unsized.
///
/// Unsized strings also stop at the end of the enclosing region.
pub struct StringBehavior;

impl TemplateBehavior for StringBehavior {
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let bytes = match ty.optional_unsigned(0)? {
			Some(count) => {
				let mut bytes = ctx.file().read_bytes(usize::try_from(count).unwrap_or(usize::MAX))?;
				if let Some(nul) = bytes.iter().position(|byte| *byte == 0) {
					bytes.truncate(nul);
				}
				bytes
			}
			None => {
				let mut bytes = Vec::new();
				while ctx.remaining() >= 8 {
					let byte = ctx.file().read_bits(8)? as u8;
					if byte == 0 {
						break;
					}
					bytes.push(byte);
				}
				bytes
			}
		};
		ctx.object_mut().set_value(Variant::from(String::from_utf8_lossy(&bytes).into_owned()));
		Ok(())
	}

	fn fixed_size(&self, ty: &ObjectType) -> FixedSize {
		match ty.optional_unsigned(0) {
			Ok(Some(count)) => count.checked_mul(8).map_or(FixedSize::Unknown, FixedSize::Bits),
			_ => FixedSize::Unknown,
		}
	}
}
