use std::fmt::Write as _;

use binscope::engine::{Object, Variant, VariantKind};

/// Output truncation limits for decoded object trees.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of children printed for a single object.
	pub max_children: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum recursive print depth.
	pub max_print_depth: u32,
	/// Print bit positions and sizes next to each node.
	pub show_positions: bool,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_children: 64,
			max_string_len: 200,
			max_print_depth: 16,
			show_positions: false,
		}
	}
}

/// Render one decoded object tree.
pub fn render_object(object: &Object, options: PrintOptions) -> String {
	let mut out = String::new();
	write_object(&mut out, object, 0, 0, options);
	out
}

fn write_object(out: &mut String, object: &Object, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	let _ = write!(out, "{pad}{}: {}", object.name(), object.ty());
	if !object.value().is_valueless() {
		let _ = write!(out, " = {}", format_value(object.value(), options));
	}
	if options.show_positions {
		let _ = write!(out, " @{}+{}", object.pos(), object.size());
	}
	let labels = labels(object);
	if !labels.is_empty() {
		let _ = write!(out, " [{}]", labels.join(", "));
	}

	let children = object.children();
	if children.is_empty() {
		out.push('\n');
		return;
	}
	if depth >= options.max_print_depth {
		let _ = writeln!(out, " {{ ... {} children }}", children.len());
		return;
	}

	out.push_str(" {\n");
	for child in children.iter().take(options.max_children) {
		write_object(out, child, indent + 2, depth + 1, options);
	}
	if children.len() > options.max_children {
		let _ = writeln!(out, "{pad}  ... {} more", children.len() - options.max_children);
	}
	let _ = writeln!(out, "{pad}}}");
}

fn labels(object: &Object) -> Vec<String> {
	let mut out = Vec::new();
	if let Some(attributes) = object.attributes() {
		for index in 0..attributes.numbered_count() {
			if let Some(value) = attributes.get_numbered(index) {
				out.push(value.to_string());
			}
		}
		for name in attributes.field_names() {
			if let Some(value) = attributes.get_named(&name) {
				out.push(format!("{name}={value}"));
			}
		}
	}
	out
}

/// Render a value for text output, quoting and truncating strings.
pub fn format_value(value: &Variant, options: PrintOptions) -> String {
	match value.kind() {
		VariantKind::String => format!("\"{}\"", truncate(value.to_str(), options.max_string_len)),
		_ => value.to_string(),
	}
}

/// Convert a value into its JSON form.
pub fn value_json(value: &Variant) -> serde_json::Value {
	match value.kind() {
		VariantKind::Undefined | VariantKind::Null => serde_json::Value::Null,
		VariantKind::Integer => serde_json::Value::from(value.to_integer()),
		VariantKind::UnsignedInteger => serde_json::Value::from(value.to_unsigned_integer()),
		VariantKind::Float => serde_json::Number::from_f64(value.to_double()).map_or(serde_json::Value::Null, serde_json::Value::Number),
		VariantKind::String => serde_json::Value::from(value.to_str()),
		VariantKind::ObjectType => serde_json::Value::from(value.to_string()),
	}
}

fn truncate(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((cut, _)) => format!("{}...", &text[..cut]),
		None => text.to_owned(),
	}
}
