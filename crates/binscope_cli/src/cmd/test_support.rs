use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use binscope_testkit::{fixture_path as shared_fixture_path, parse_json, target_dir as workspace_target_dir};

static BINSCOPE_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn fixture_path(name: &str) -> PathBuf {
	shared_fixture_path(name)
}

pub(crate) fn modules_arg() -> String {
	binscope_testkit::modules_dir().display().to_string()
}

pub(crate) fn run_binscope(args: &[&str]) -> Output {
	Command::new(binscope_bin()).args(args).output().expect("binscope command executes")
}

pub(crate) fn run_binscope_json(args: &[&str]) -> serde_json::Value {
	let output = run_binscope(args);
	assert!(
		output.status.success(),
		"binscope command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	parse_json(&output.stdout)
}

fn binscope_bin() -> &'static PathBuf {
	BINSCOPE_BIN.get_or_init(resolve_binscope_bin)
}

fn resolve_binscope_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_binscope") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "binscope.exe" } else { "binscope" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "binscope"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build binscope binary at {}", bin.display());

	bin
}
