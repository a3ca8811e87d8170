use std::fmt;

use crate::engine::{EngineError, Module, ObjectType, Result, Scope, Variant, resolve_path};

/// Parsed `name(arg, ...)` type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
	/// Number or string literal.
	Literal(Variant),
	/// `_`: leaves a parameter position unspecified.
	Unspecified,
	/// Bare or dotted identifier: a scope binding, else a template with no parameters.
	Name(String),
	/// Template instantiation.
	Call {
		/// Template name.
		name: String,
		/// Parameter expressions in order.
		args: Vec<TypeExpr>,
	},
}

impl TypeExpr {
	/// Parse expression text.
	pub fn parse(text: &str) -> Result<Self> {
		let mut parser = Parser { text, chars: text.char_indices().collect(), at: 0 };
		let expr = parser.expr()?;
		parser.skip_ws();
		if parser.at < parser.chars.len() {
			return Err(parser.error());
		}
		Ok(expr)
	}

	/// Evaluate to a value, resolving identifiers through `scope` then `module`.
	pub fn eval(&self, module: &Module, scope: Option<&dyn Scope>) -> Result<Variant> {
		match self {
			Self::Literal(value) => Ok(value.clone()),
			Self::Unspecified => Ok(Variant::undefined()),
			Self::Name(name) => {
				if let Some(scope) = scope {
					let bound = resolve_path(scope, name);
					if bound.is_defined() {
						return Ok(bound.value());
					}
				}
				module.get_type(name).map(Variant::from)
			}
			Self::Call { name, args } => {
				let template = module.template(name).ok_or_else(|| EngineError::UnknownTemplate {
					name: name.clone(),
					module: module.key().to_owned(),
				})?;
				let mut ty = ObjectType::new(&template);
				for (index, arg) in args.iter().enumerate() {
					if !matches!(arg, Self::Unspecified) {
						ty.set_parameter(index, arg.eval(module, scope)?)?;
					}
				}
				Ok(Variant::from(ty))
			}
		}
	}

	/// Evaluate and require an object type.
	pub fn eval_type(&self, module: &Module, scope: Option<&dyn Scope>) -> Result<ObjectType> {
		let value = self.eval(module, scope)?;
		match value.as_object_type() {
			Some(ty) if !ty.is_null() => Ok(ty.clone()),
			_ => Err(EngineError::ExpectedObjectType {
				got: value.simple_display().to_string(),
			}),
		}
	}
}

impl fmt::Display for TypeExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(value) => write!(f, "{}", value.simple_display()),
			Self::Unspecified => f.write_str("_"),
			Self::Name(name) => f.write_str(name),
			Self::Call { name, args } => {
				write!(f, "{name}(")?;
				for (index, arg) in args.iter().enumerate() {
					if index > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{arg}")?;
				}
				f.write_str(")")
			}
		}
	}
}

struct Parser<'t> {
	text: &'t str,
	chars: Vec<(usize, char)>,
	at: usize,
}

impl Parser<'_> {
	fn peek(&self) -> Option<char> {
		self.chars.get(self.at).map(|(_, c)| *c)
	}

	fn bump(&mut self) -> Option<char> {
		let c = self.peek()?;
		self.at += 1;
		Some(c)
	}

	fn skip_ws(&mut self) {
		while self.peek().is_some_and(char::is_whitespace) {
			self.at += 1;
		}
	}

	fn offset(&self) -> usize {
		self.chars.get(self.at).map_or(self.text.len(), |(offset, _)| *offset)
	}

	fn error(&self) -> EngineError {
		EngineError::InvalidTypeExpr {
			expr: self.text.to_owned(),
			at: self.offset(),
		}
	}

	fn expr(&mut self) -> Result<TypeExpr> {
		self.skip_ws();
		match self.peek() {
			Some('"') => self.string(),
			Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.number(),
			Some(c) if c.is_alphabetic() || c == '_' => self.identifier(),
			_ => Err(self.error()),
		}
	}

	fn string(&mut self) -> Result<TypeExpr> {
		self.bump();
		let mut out = String::new();
		loop {
			match self.bump() {
				Some('"') => return Ok(TypeExpr::Literal(Variant::from(out))),
				Some('\\') => match self.bump() {
					Some('n') => out.push('\n'),
					Some('t') => out.push('\t'),
					Some(c) => out.push(c),
					None => return Err(self.error()),
				},
				Some(c) => out.push(c),
				None => return Err(self.error()),
			}
		}
	}

	fn number(&mut self) -> Result<TypeExpr> {
		let start = self.at;
		while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_')) {
			self.at += 1;
		}
		let token: String = self.chars[start..self.at].iter().map(|(_, c)| *c).collect();
		parse_number(&token).map(TypeExpr::Literal).ok_or_else(|| EngineError::InvalidTypeExpr {
			expr: self.text.to_owned(),
			at: self.chars[start].0,
		})
	}

	fn identifier(&mut self) -> Result<TypeExpr> {
		let start = self.at;
		while self.peek().is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '.')) {
			self.at += 1;
		}
		let name: String = self.chars[start..self.at].iter().map(|(_, c)| *c).collect();
		if name == "_" {
			return Ok(TypeExpr::Unspecified);
		}

		self.skip_ws();
		if self.peek() != Some('(') {
			return Ok(TypeExpr::Name(name));
		}
		self.bump();
		let mut args = Vec::new();
		self.skip_ws();
		if self.peek() == Some(')') {
			self.bump();
			return Ok(TypeExpr::Call { name, args });
		}
		loop {
			args.push(self.expr()?);
			self.skip_ws();
			match self.bump() {
				Some(',') => continue,
				Some(')') => return Ok(TypeExpr::Call { name, args }),
				_ => return Err(self.error()),
			}
		}
	}
}

/// Parse a numeric literal: decimal, `0x` hex, `0b` binary, optionally negative, or a float.
pub fn parse_number(token: &str) -> Option<Variant> {
	let token = token.replace('_', "");
	let (negative, digits) = match token.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, token.strip_prefix('+').unwrap_or(&token)),
	};
	let radix_digits = digits
		.strip_prefix("0x")
		.or_else(|| digits.strip_prefix("0X"))
		.map(|rest| (16, rest))
		.or_else(|| digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")).map(|rest| (2, rest)));

	let magnitude = match radix_digits {
		Some((radix, rest)) => u64::from_str_radix(rest, radix).ok()?,
		None => match digits.parse::<u64>() {
			Ok(value) => value,
			Err(_) => {
				let value = digits.parse::<f64>().ok()?;
				return Some(Variant::from(if negative { -value } else { value }));
			}
		},
	};

	if negative {
		let value = i64::try_from(magnitude).ok()?;
		return Some(Variant::from(-value));
	}
	Some(match i64::try_from(magnitude) {
		Ok(value) => Variant::from(value),
		Err(_) => Variant::from(magnitude),
	})
}
