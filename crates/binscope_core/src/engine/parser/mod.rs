use std::rc::Rc;

use crate::engine::{Endianness, EngineError, Module, Object, ObjectType, Result, SourceFile, Variable};

/// Runtime limits for tree decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum template nesting depth.
	pub max_depth: u32,
	/// Maximum children decoded per container; fixed-size remainders are skipped.
	pub max_children: usize,
	/// Byte order of the root object.
	pub endianness: Endianness,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			max_children: 1 << 20,
			endianness: Endianness::Big,
		}
	}
}

impl DecodeOptions {
	/// Preset tuned for interactive inspection output.
	pub fn for_inspect() -> Self {
		Self {
			max_depth: 32,
			max_children: 4096,
			endianness: Endianness::Big,
		}
	}
}

/// Walks templates against a source file to build an object tree.
pub struct Decoder<'a> {
	module: &'a Module,
	file: &'a mut SourceFile,
	options: DecodeOptions,
	depth: u32,
}

impl<'a> Decoder<'a> {
	/// Create a decoder over `file` resolving types through `module`.
	pub fn new(module: &'a Module, file: &'a mut SourceFile, options: DecodeOptions) -> Self {
		Self {
			module,
			file,
			options,
			depth: 0,
		}
	}

	/// Decode the module root type from the current cursor.
	pub fn decode_root(&mut self) -> Result<Object> {
		let root = self.module.root().cloned().ok_or_else(|| EngineError::NoRootType {
			module: self.module.key().to_owned(),
		})?;
		self.decode(&root, "root")
	}

	/// Decode one instance of `ty` from the current cursor.
	pub fn decode(&mut self, ty: &ObjectType, name: &str) -> Result<Object> {
		let limit = self.file.len_bits();
		let endianness = self.options.endianness;
		self.read_object(ty, name, endianness, Variable::undefined(), None, limit)
	}

	fn read_object(&mut self, ty: &ObjectType, name: &str, endianness: Endianness, scope: Variable, size: Option<u64>, limit: u64) -> Result<Object> {
		if self.depth >= self.options.max_depth {
			return Err(EngineError::DecodeDepthExceeded {
				max_depth: self.options.max_depth,
			});
		}

		let specified = self.module.specify(ty);
		let template = specified.template().cloned().ok_or_else(|| EngineError::ExpectedObjectType {
			got: "null type".to_owned(),
		})?;
		let pos = self.file.tell();
		let mut object = Object::new(specified.clone(), ty.clone(), name, pos, endianness);
		if let Some(size) = size {
			checked_end(pos, size, limit)?;
			object.set_size(size);
		}

		self.depth += 1;
		let outcome = {
			let mut ctx = ParsingContext {
				decoder: self,
				object: &mut object,
				scope,
				limit,
			};
			template.behavior().parse(&specified, &mut ctx)
		};
		self.depth -= 1;
		outcome?;

		let tell = self.file.tell();
		if !object.has_size() {
			object.set_size(tell.saturating_sub(pos));
			return Ok(object);
		}
		let end = checked_end(pos, object.size(), limit)?;
		if tell > end {
			return Err(EngineError::RegionOverrun {
				name: name.to_owned(),
				end,
				at: tell,
			});
		}
		if end > tell {
			self.file.seek(end);
		}
		Ok(object)
	}
}

/// End of a `size`-bit region at `pos`, which must fit below `limit`.
fn checked_end(pos: u64, size: u64, limit: u64) -> Result<u64> {
	pos.checked_add(size).filter(|end| *end <= limit).ok_or(EngineError::UnexpectedEof {
		at: pos,
		need: size,
		rem: limit.saturating_sub(pos),
	})
}

/// View handed to a template while it decodes one object.
pub struct ParsingContext<'p, 'a> {
	decoder: &'p mut Decoder<'a>,
	object: &'p mut Object,
	scope: Variable,
	limit: u64,
}

impl<'a> ParsingContext<'_, 'a> {
	/// Object being decoded.
	pub fn object(&self) -> &Object {
		&*self.object
	}

	/// Mutable object being decoded.
	pub fn object_mut(&mut self) -> &mut Object {
		&mut *self.object
	}

	/// Shared source cursor.
	pub fn file(&mut self) -> &mut SourceFile {
		&mut *self.decoder.file
	}

	/// Current cursor position in bits.
	pub fn tell(&self) -> u64 {
		self.decoder.file.tell()
	}

	/// Module used for type lookups and specializations.
	pub fn module(&self) -> &'a Module {
		self.decoder.module
	}

	/// Active decode limits.
	pub fn options(&self) -> &DecodeOptions {
		&self.decoder.options
	}

	/// Enclosing scope handed down by the parent.
	pub fn scope(&self) -> &Variable {
		&self.scope
	}

	/// Byte order of the object being decoded.
	pub fn endianness(&self) -> Endianness {
		self.object.endianness()
	}

	/// End of the region children may occupy: the object end when sized, else the parent region end.
	pub fn region_end(&self) -> u64 {
		self.object.end().map_or(self.limit, |end| end.min(self.limit))
	}

	/// Bits left in the region.
	pub fn remaining(&self) -> u64 {
		self.region_end().saturating_sub(self.tell())
	}

	/// Decode a child with the enclosing scope and append it.
	pub fn read_child(&mut self, ty: &ObjectType, name: &str) -> Result<Rc<Object>> {
		let scope = self.scope.clone();
		self.read_member(ty, name, scope, None)
	}

	/// Decode a child with an explicit scope and optional preset size in bits, and append it.
	pub fn read_member(&mut self, ty: &ObjectType, name: &str, scope: Variable, size: Option<u64>) -> Result<Rc<Object>> {
		let limit = self.region_end();
		let endianness = self.object.endianness();
		let child = Rc::new(self.decoder.read_object(ty, name, endianness, scope, size, limit)?);
		self.object.push_child(Rc::clone(&child));
		Ok(child)
	}

	/// Decode an instance of `ty` at the cursor without attaching it.
	pub fn read_detached(&mut self, ty: &ObjectType) -> Result<Object> {
		let limit = self.region_end();
		let endianness = self.object.endianness();
		let name = self.object.name().to_owned();
		let scope = self.scope.clone();
		self.decoder.read_object(ty, &name, endianness, scope, None, limit)
	}
}

#[cfg(test)]
mod tests;
