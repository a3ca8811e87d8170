use std::path::{Path, PathBuf};

use binscope::engine::SourceFile;

use crate::cmd::util::{emit_json, format_label, load_modules};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Report the format detected for a file.
pub fn run(modules: Option<&Path>, args: Args) -> binscope::engine::Result<()> {
	let loader = load_modules(modules)?;
	let mut file = SourceFile::open(&args.file)?;
	let format = loader.detector().get_format(&mut file);

	if args.json {
		emit_json(&DetectJson {
			path: args.file.display().to_string(),
			format,
			compression: file.compression().as_str().to_owned(),
			bits: file.len_bits(),
		});
		return Ok(());
	}

	println!("path: {}", args.file.display());
	println!("format: {}", format_label(&format));
	println!("compression: {}", file.compression().as_str());
	println!("bits: {}", file.len_bits());
	Ok(())
}

#[derive(serde::Serialize)]
struct DetectJson {
	path: String,
	format: String,
	compression: String,
	bits: u64,
}
