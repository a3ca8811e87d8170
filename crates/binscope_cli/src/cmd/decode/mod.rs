use std::path::{Path, PathBuf};

use binscope::engine::{DecodeOptions, Decoder, Endianness, Object, SourceFile};

use crate::cmd::print::{PrintOptions, render_object, value_json};
use crate::cmd::util::{emit_json, format_label, load_modules};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	/// Module key to decode with instead of the detected one.
	#[arg(long)]
	pub format: Option<String>,
	/// Type expression to decode instead of the module root type.
	#[arg(long = "type")]
	pub type_expr: Option<String>,
	/// Byte order of the top-level object.
	#[arg(long, default_value = "big", value_parser = parse_endian)]
	pub endian: Endianness,
	/// Start from the tighter inspection limits.
	#[arg(long)]
	pub inspect: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long = "max-children")]
	pub max_children: Option<usize>,
	/// Print bit positions and sizes.
	#[arg(long)]
	pub positions: bool,
	#[arg(long)]
	pub json: bool,
}

/// Decode a file into an object tree.
pub fn run(modules: Option<&Path>, args: Args) -> binscope::engine::Result<()> {
	let mut loader = load_modules(modules)?;
	let mut file = SourceFile::open(&args.file)?;

	let module = match &args.format {
		Some(key) => loader.get_module(key)?,
		None => loader.module_for_file(&mut file)?,
	};

	let defaults = if args.inspect { DecodeOptions::for_inspect() } else { DecodeOptions::default() };
	let options = DecodeOptions {
		max_depth: args.max_depth.unwrap_or(defaults.max_depth),
		max_children: args.max_children.unwrap_or(defaults.max_children),
		endianness: args.endian,
	};

	let mut decoder = Decoder::new(&module, &mut file, options);
	let root = match &args.type_expr {
		Some(text) => {
			let ty = module.eval_type(text)?;
			decoder.decode(&ty, "root")?
		}
		None => decoder.decode_root()?,
	};

	if args.json {
		emit_json(&DecodeJson {
			path: args.file.display().to_string(),
			format: module.key().to_owned(),
			root: object_json(&root),
		});
		return Ok(());
	}

	println!("path: {}", args.file.display());
	println!("format: {}", format_label(module.key()));
	let options = PrintOptions {
		show_positions: args.positions,
		..PrintOptions::default()
	};
	print!("{}", render_object(&root, options));
	Ok(())
}

fn parse_endian(text: &str) -> Result<Endianness, String> {
	Endianness::parse(text).ok_or_else(|| format!("unknown endianness `{text}`, expected big or little"))
}

fn object_json(object: &Object) -> ObjectJson {
	let attributes = object.attributes();
	ObjectJson {
		name: object.name().to_owned(),
		type_name: object.ty().to_string(),
		declared: object.declared_type().to_string(),
		pos: object.pos(),
		size: object.size(),
		value: value_json(object.value()),
		display: (!object.value().is_valueless()).then(|| object.value().to_string()),
		labels: attributes
			.map(|attributes| (0..attributes.numbered_count()).filter_map(|index| attributes.get_numbered(index)).map(|value| value_json(&value)).collect())
			.unwrap_or_default(),
		attributes: object
			.attribute_names()
			.into_iter()
			.filter_map(|name| object.named_attribute(&name).map(|value| (name, value_json(&value))))
			.collect(),
		children: object.children().iter().map(|child| object_json(child)).collect(),
	}
}

#[derive(serde::Serialize)]
struct ObjectJson {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
	declared: String,
	pos: u64,
	size: u64,
	value: serde_json::Value,
	display: Option<String>,
	labels: Vec<serde_json::Value>,
	attributes: serde_json::Map<String, serde_json::Value>,
	children: Vec<ObjectJson>,
}

#[derive(serde::Serialize)]
struct DecodeJson {
	path: String,
	format: String,
	root: ObjectJson,
}
