use crate::engine::{DisplayBase, EngineError, FixedSize, ObjectType, ParsingContext, Result, TemplateBehavior, Variant};

fn display_base(ty: &ObjectType) -> DisplayBase {
	match ty.parameter_value(1).map(Variant::to_integer) {
		Some(2) => DisplayBase::Binary,
		Some(8) => DisplayBase::Octal,
		Some(16) => DisplayBase::Hexadecimal,
		_ => DisplayBase::Decimal,
	}
}

fn integer_size(ty: &ObjectType) -> Result<u64> {
	let size = ty.required_unsigned(0, "no integer size given")?;
	if size > 64 {
		return Err(EngineError::IntegerTooWide { size: size as i64 });
	}
	Ok(size)
}

fn sized_fixed_size(ty: &ObjectType) -> FixedSize {
	match ty.optional_unsigned(0) {
		Ok(Some(size)) => FixedSize::Bits(size),
		_ => FixedSize::Unknown,
	}
}

/// Sign-extend the low `size` bits of `raw`.
pub(crate) fn sign_extend(raw: u64, size: u64) -> i64 {
	match size {
		0 => 0,
		64.. => raw as i64,
		_ if raw & (1 << (size - 1)) != 0 => (raw | (u64::MAX << size)) as i64,
		_ => raw as i64,
	}
}

/// `int(size, _base)`: signed integer of up to 64 bits.
pub struct IntBehavior;

impl TemplateBehavior for IntBehavior {
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let size = integer_size(ty)?;
		let endianness = ctx.endianness();
		let raw = ctx.file().read_uint(size, endianness)?;
		let value = match size {
			// 8-bit reads keep the raw byte
			8 => Variant::from(raw as i64),
			16 => Variant::from(raw as u16 as i16),
			32 => Variant::from(raw as u32 as i32),
			64 => Variant::from(raw as i64),
			_ => Variant::from(sign_extend(raw, size)),
		};
		ctx.object_mut().set_value(value.with_display(display_base(ty)));
		Ok(())
	}

	fn fixed_size(&self, ty: &ObjectType) -> FixedSize {
		sized_fixed_size(ty)
	}
}

/// `uint(size, _base)`: unsigned integer of up to 64 bits.
pub struct UintBehavior;

impl TemplateBehavior for UintBehavior {
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let size = integer_size(ty)?;
		let endianness = ctx.endianness();
		let raw = ctx.file().read_uint(size, endianness)?;
		ctx.object_mut().set_value(Variant::from(raw).with_display(display_base(ty)));
		Ok(())
	}

	fn fixed_size(&self, ty: &ObjectType) -> FixedSize {
		sized_fixed_size(ty)
	}
}

/// `byte`: one unsigned byte shown in hex.
pub struct ByteBehavior;

impl TemplateBehavior for ByteBehavior {
	fn parse(&self, _ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let raw = ctx.file().read_bits(8)?;
		ctx.object_mut().set_value(Variant::from(raw).with_display(DisplayBase::Hexadecimal));
		Ok(())
	}

	fn fixed_size(&self, _ty: &ObjectType) -> FixedSize {
		FixedSize::Bits(8)
	}
}

/// `uuid`: 128-bit identifier rendered in canonical uppercase form.
///
/// The first three fields follow the object byte order; the trailing 64 bits are always big-endian.
pub struct UuidBehavior;

impl TemplateBehavior for UuidBehavior {
	fn parse(&self, _ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		let endianness = ctx.endianness();
		let file = ctx.file();
		let first = file.read_uint(32, endianness)?;
		let second = file.read_uint(16, endianness)?;
		let third = file.read_uint(16, endianness)?;
		let tail = file.read_bits(64)?;
		let text = format!("{first:08X}-{second:04X}-{third:04X}-{:04X}-{:012X}", tail >> 48, tail & 0xFFFF_FFFF_FFFF);
		ctx.object_mut().set_value(text);
		Ok(())
	}

	fn fixed_size(&self, _ty: &ObjectType) -> FixedSize {
		FixedSize::Bits(128)
	}
}
