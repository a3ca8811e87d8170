use std::path::Path;

use crate::cmd::util::{emit_json, format_label, load_modules};

#[derive(clap::Args)]
pub struct Args {
	#[arg(long)]
	pub json: bool,
}

/// List registered formats with their detection rules.
pub fn run(modules: Option<&Path>, args: Args) -> binscope::engine::Result<()> {
	let loader = load_modules(modules)?;
	let detector = loader.detector();

	let rows: Vec<FormatJson> = loader
		.keys()
		.iter()
		.map(|key| FormatJson {
			key: key.clone(),
			magic: detector.magic_numbers(key),
			extensions: detector.extensions(key),
		})
		.collect();

	if args.json {
		emit_json(&FormatsJson { formats: rows });
		return Ok(());
	}

	println!("formats: {}", rows.len());
	println!("key\tmagic\textensions");
	for row in &rows {
		let magic = if row.magic.is_empty() { "-".to_owned() } else { row.magic.join(" | ") };
		let extensions = if row.extensions.is_empty() { "-".to_owned() } else { row.extensions.join(",") };
		println!("{}\t{magic}\t{extensions}", format_label(&row.key));
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct FormatJson {
	key: String,
	magic: Vec<String>,
	extensions: Vec<String>,
}

#[derive(serde::Serialize)]
struct FormatsJson {
	formats: Vec<FormatJson>,
}
