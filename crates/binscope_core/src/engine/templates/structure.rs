use std::rc::Rc;

use crate::engine::{
	EngineError, Endianness, FixedSize, LocalScope, Module, ObjectType, ObjectTypeTemplate, ParsingContext, Result, Scope, TemplateBehavior, TypeExpr, Variable, Variant,
};

/// Container shape of a struct member.
#[derive(Debug, Clone)]
pub enum MemberKind {
	/// Single child of the given type, optionally bounded to `size` bytes.
	Field {
		/// Child type expression.
		ty: TypeExpr,
		/// Region size in bytes.
		size: Option<TypeExpr>,
	},
	/// Element sequence: a `Tuple` when `count` is given, else an `Array` bounded by `size` bytes.
	Array {
		/// Element type expression.
		element: TypeExpr,
		/// Element count.
		count: Option<TypeExpr>,
		/// Region size in bytes.
		size: Option<TypeExpr>,
		/// Element name pattern.
		pattern: String,
	},
}

/// Named member of a struct.
#[derive(Debug, Clone)]
pub struct Member {
	/// Child name; also bound in the struct scope once decoded.
	pub name: String,
	/// Container shape.
	pub kind: MemberKind,
}

/// Description-defined record: members decoded in order inside a scope frame.
///
/// The frame binds the struct parameters and every decoded member, so later member
/// expressions can refer to both.
#[derive(Debug, Clone, Default)]
pub struct StructTemplate {
	params: Vec<String>,
	endian: Option<Endianness>,
	members: Vec<Member>,
}

impl StructTemplate {
	/// Create an empty struct with the given parameter names.
	pub fn new(params: Vec<String>, endian: Option<Endianness>) -> Self {
		Self {
			params,
			endian,
			members: Vec::new(),
		}
	}

	/// Append a member.
	pub fn push(&mut self, member: Member) {
		self.members.push(member);
	}

	/// Members in decode order.
	pub fn members(&self) -> &[Member] {
		&self.members
	}

	/// Wrap into a named template.
	pub fn into_template(self, name: &str) -> Rc<ObjectTypeTemplate> {
		let params = self.params.clone();
		ObjectTypeTemplate::new(name, params, self)
	}

	fn member_type(member: &Member, module: &Module, scope: &dyn Scope) -> Result<(ObjectType, Option<u64>)> {
		match &member.kind {
			MemberKind::Field { ty, size } => Ok((ty.eval_type(module, Some(scope))?, byte_size(&member.name, size.as_ref(), module, scope)?)),
			MemberKind::Array { element, count, size, pattern } => {
				let element = Variant::from(element.eval_type(module, Some(scope))?);
				let pattern = Variant::from(pattern.as_str());
				let ty = match count {
					Some(count) => module.new_type("Tuple", [element, count.eval(module, Some(scope))?, pattern])?,
					None => {
						let mut ty = module.new_type("Array", [element])?;
						if let Some(bits) = byte_size(&member.name, size.as_ref(), module, scope)? {
							ty.set_parameter(1, Variant::from(bits))?;
						}
						ty.set_parameter(2, pattern)?;
						ty
					}
				};
				Ok((ty, None))
			}
		}
	}
}

fn byte_size(member: &str, size: Option<&TypeExpr>, module: &Module, scope: &dyn Scope) -> Result<Option<u64>> {
	let Some(size) = size else {
		return Ok(None);
	};
	let value = size.eval(module, Some(scope))?;
	let bits = value.to_unsigned_integer().checked_mul(8).ok_or_else(|| EngineError::BadParameter {
		template: member.to_owned(),
		parameter: "size".to_owned(),
		value: value.simple_display().to_string(),
	})?;
	Ok(Some(bits))
}

impl TemplateBehavior for StructTemplate {
	fn parse(&self, ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		if let Some(endian) = self.endian {
			ctx.object_mut().set_endianness(endian);
		}

		let frame = LocalScope::new(ctx.scope().clone());
		for (index, name) in self.params.iter().enumerate() {
			let value = ty.parameter_value(index).cloned().unwrap_or_else(Variant::null);
			frame.bind(name, Variable::constant(value));
		}
		let mut scope = frame.variable();
		scope.set_constant();

		let module = ctx.module();
		for member in &self.members {
			let (member_ty, size) = Self::member_type(member, module, &*frame)?;
			let child = ctx.read_member(&member_ty, &member.name, scope.clone(), size)?;
			frame.bind(&member.name, child.variable());
		}
		Ok(())
	}
}

/// Named template decoding as a fixed father type.
pub struct ExtensionBehavior {
	father: ObjectType,
}

impl ExtensionBehavior {
	/// Extend `father`.
	pub fn new(father: ObjectType) -> Self {
		Self { father }
	}

	/// Wrap into a named template without parameters.
	pub fn into_template(self, name: &str) -> Rc<ObjectTypeTemplate> {
		ObjectTypeTemplate::new(name, Vec::<String>::new(), self)
	}
}

impl TemplateBehavior for ExtensionBehavior {
	fn parse(&self, _ty: &ObjectType, ctx: &mut ParsingContext<'_, '_>) -> Result<()> {
		match self.father.template() {
			Some(template) => template.behavior().parse(&self.father, ctx),
			None => Ok(()),
		}
	}

	fn fixed_size(&self, _ty: &ObjectType) -> FixedSize {
		self.father.fixed_size()
	}
}
