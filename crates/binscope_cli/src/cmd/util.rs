use std::path::Path;

use binscope::engine::{ModuleLoader, Result};

/// Build a loader over the default module and every description in `modules`.
pub(crate) fn load_modules(modules: Option<&Path>) -> Result<ModuleLoader> {
	let mut loader = ModuleLoader::new();
	if let Some(dir) = modules {
		let keys = loader.add_folder(dir)?;
		tracing::debug!(dir = %dir.display(), count = keys.len(), "registered module folder");
	}
	Ok(loader)
}

/// Label shown for a format key; the default module has an empty key.
pub(crate) fn format_label(key: &str) -> &str {
	if key.is_empty() { "(default)" } else { key }
}

/// Pretty-print a serializable payload to stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to render json: {err}"),
	}
}

#[cfg(test)]
mod tests {
	use super::{format_label, load_modules};
	use crate::cmd::test_support::fixture_path;

	#[test]
	fn default_key_gets_a_label() {
		assert_eq!(format_label(""), "(default)");
		assert_eq!(format_label("chunky"), "chunky");
	}

	#[test]
	fn loader_registers_fixture_folder() {
		let loader = load_modules(Some(&fixture_path("modules"))).expect("load fixture modules");
		assert!(loader.is_registered("chunky"));
		assert!(loader.is_registered(""));

		let bare = load_modules(None).expect("default only");
		assert_eq!(bare.keys(), [String::new()]);
	}
}
