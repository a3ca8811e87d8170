#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "binscope", about = "Declarative binary format inspection tools")]
struct Cli {
	/// Folder of `<key>.module.xml` format descriptions.
	#[arg(long, global = true)]
	modules: Option<PathBuf>,
	/// Log module loading and soft decode errors.
	#[arg(short, long, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Formats(cmd::formats::Args),
	Detect(cmd::detect::Args),
	Templates(cmd::templates::Args),
	Decode(cmd::decode::Args),
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	if let Err(err) = run(cli) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_tracing(verbose: bool) {
	let fallback = if verbose { "binscope=debug" } else { "warn" };
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
		.with_writer(std::io::stderr)
		.init();
}

fn run(cli: Cli) -> binscope::engine::Result<()> {
	let modules = cli.modules.as_deref();

	match cli.command {
		Commands::Formats(args) => cmd::formats::run(modules, args),
		Commands::Detect(args) => cmd::detect::run(modules, args),
		Commands::Templates(args) => cmd::templates::run(modules, args),
		Commands::Decode(args) => cmd::decode::run(modules, args),
	}
}
