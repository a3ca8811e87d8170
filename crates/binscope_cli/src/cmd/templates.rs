use std::path::Path;

use binscope::engine::{Module, ObjectType};

use crate::cmd::util::{emit_json, format_label, load_modules};

#[derive(clap::Args)]
pub struct Args {
	/// Module key; the default module when omitted.
	pub format: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List the templates a module defines.
pub fn run(modules: Option<&Path>, args: Args) -> binscope::engine::Result<()> {
	let mut loader = load_modules(modules)?;
	let module = loader.get_module(args.format.as_deref().unwrap_or_default())?;
	let templates = template_rows(&module)?;

	if args.json {
		emit_json(&TemplatesJson {
			module: module.key().to_owned(),
			root: module.root().map(ObjectType::to_string),
			imports: module.imports().iter().map(|import| import.key().to_owned()).collect(),
			templates,
		});
		return Ok(());
	}

	println!("module: {}", format_label(module.key()));
	println!("root: {}", module.root().map_or_else(|| "-".to_owned(), ObjectType::to_string));
	let imports: Vec<&str> = module.imports().iter().map(|import| format_label(import.key())).collect();
	println!("imports: {}", if imports.is_empty() { "-".to_owned() } else { imports.join(",") });
	println!("templates: {}", templates.len());
	println!("name\tparams\tbits");
	for row in &templates {
		let mut params = row.params.join(",");
		if row.variadic {
			params.push_str(",...");
		}
		let bits = row.fixed_bits.map_or_else(|| "-".to_owned(), |bits| bits.to_string());
		println!("{}\t{}\t{bits}", row.name, if params.is_empty() { "-" } else { &params });
	}
	Ok(())
}

fn template_rows(module: &Module) -> binscope::engine::Result<Vec<TemplateJson>> {
	let mut rows = Vec::new();
	for name in module.template_names() {
		let Some(template) = module.template(name) else {
			continue;
		};
		rows.push(TemplateJson {
			name: name.clone(),
			params: template.parameter_names().to_vec(),
			variadic: template.is_variadic(),
			fixed_bits: module.get_type(name)?.fixed_size().bits(),
		});
	}
	Ok(rows)
}

#[derive(serde::Serialize)]
struct TemplateJson {
	name: String,
	params: Vec<String>,
	variadic: bool,
	fixed_bits: Option<u64>,
}

#[derive(serde::Serialize)]
struct TemplatesJson {
	module: String,
	root: Option<String>,
	imports: Vec<String>,
	templates: Vec<TemplateJson>,
}
