use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::engine::{
	DecodeOptions, Decoder, DefaultModule, DescriptionModule, EngineError, Module, ModuleSource, Object, Result, SourceFile, StandardFormatDetector,
};

/// File name suffix of module description files.
pub const MODULE_SUFFIX: &str = ".module.xml";

enum LoadState {
	Unloaded,
	Loading,
	Loaded(Rc<Module>),
}

struct Record {
	source: Rc<dyn ModuleSource>,
	state: LoadState,
}

/// Registry of module sources, loading each module lazily on first access.
///
/// The default module is registered under `""` and resolves every unknown key.
pub struct ModuleLoader {
	records: HashMap<String, Record>,
	order: Vec<String>,
	detector: StandardFormatDetector,
}

impl Default for ModuleLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ModuleLoader {
	/// Create a loader holding only the default module.
	pub fn new() -> Self {
		let mut loader = Self {
			records: HashMap::new(),
			order: Vec::new(),
			detector: StandardFormatDetector::new(),
		};
		loader.add_module("", Rc::new(DefaultModule));
		loader
	}

	/// Register `source` under `key`, adding its detection rules.
	pub fn add_module(&mut self, key: &str, source: Rc<dyn ModuleSource>) {
		source.add_format_detection(&mut self.detector.adder(key));
		let previous = self.records.insert(
			key.to_owned(),
			Record {
				source,
				state: LoadState::Unloaded,
			},
		);
		if previous.is_some() {
			tracing::warn!(key, "module source replaced");
		} else {
			self.order.push(key.to_owned());
		}
	}

	/// Register every `<key>.module.xml` in `dir`, returning the keys added.
	pub fn add_folder(&mut self, dir: impl AsRef<Path>) -> Result<Vec<String>> {
		let mut listing = Vec::new();
		for entry in fs::read_dir(dir.as_ref())? {
			listing.push(entry?.path());
		}
		self.add_listing(listing)
	}

	/// Register the module description files found in a precomputed listing.
	pub fn add_listing(&mut self, listing: impl IntoIterator<Item = PathBuf>) -> Result<Vec<String>> {
		let mut selected: Vec<(String, PathBuf)> = listing
			.into_iter()
			.filter_map(|path| {
				let name = path.file_name()?.to_str()?;
				let key = name.strip_suffix(MODULE_SUFFIX)?.to_owned();
				Some((key, path))
			})
			.collect();
		selected.sort();

		let mut keys = Vec::with_capacity(selected.len());
		for (key, path) in selected {
			let source = DescriptionModule::from_file(&path)?;
			tracing::debug!(key = %key, path = %path.display(), "registered module description");
			self.add_module(&key, Rc::new(source));
			keys.push(key);
		}
		Ok(keys)
	}

	/// Registered keys in registration order, the default module first.
	pub fn keys(&self) -> &[String] {
		&self.order
	}

	/// Whether `key` has a registered source.
	pub fn is_registered(&self, key: &str) -> bool {
		self.records.contains_key(key)
	}

	/// Whether `key` has finished loading.
	pub fn is_loaded(&self, key: &str) -> bool {
		matches!(self.records.get(key), Some(Record { state: LoadState::Loaded(_), .. }))
	}

	/// Detector holding every registered rule.
	pub fn detector(&self) -> &StandardFormatDetector {
		&self.detector
	}

	/// Resolve a module, loading it and its imports on first access.
	///
	/// Unregistered keys resolve to the default module. Modules without declared imports
	/// import the default module.
	pub fn get_module(&mut self, key: &str) -> Result<Rc<Module>> {
		let key = if self.records.contains_key(key) {
			key.to_owned()
		} else {
			tracing::debug!(key, "unregistered module key, using default module");
			String::new()
		};

		let source = {
			let Some(record) = self.records.get_mut(&key) else {
				return Err(EngineError::UnknownModule { key });
			};
			match &record.state {
				LoadState::Loaded(module) => return Ok(Rc::clone(module)),
				LoadState::Loading => return Err(EngineError::ImportCycle { key }),
				LoadState::Unloaded => {}
			}
			record.state = LoadState::Loading;
			Rc::clone(&record.source)
		};

		match self.load(&key, source.as_ref()) {
			Ok(module) => {
				self.set_state(&key, LoadState::Loaded(Rc::clone(&module)));
				tracing::info!(key = %key, templates = module.template_names().len(), "loaded module");
				Ok(module)
			}
			Err(err) => {
				self.set_state(&key, LoadState::Unloaded);
				Err(err)
			}
		}
	}

	fn load(&mut self, key: &str, source: &dyn ModuleSource) -> Result<Rc<Module>> {
		let mut imports = source.request_imports();
		if imports.is_empty() && !key.is_empty() {
			imports.push(String::new());
		}

		let mut module = Module::new(key);
		for import in imports {
			module.import(self.get_module(&import)?);
		}
		source.load(&mut module)?;
		Ok(Rc::new(module))
	}

	fn set_state(&mut self, key: &str, state: LoadState) {
		if let Some(record) = self.records.get_mut(key) {
			record.state = state;
		}
	}

	/// Detect the format of `file` and resolve its module.
	pub fn module_for_file(&mut self, file: &mut SourceFile) -> Result<Rc<Module>> {
		let key = self.detector.get_format(file);
		self.get_module(&key)
	}

	/// Detect, resolve and decode the root type of `file`.
	pub fn decode_file(&mut self, file: &mut SourceFile, options: DecodeOptions) -> Result<Object> {
		let module = self.module_for_file(file)?;
		Decoder::new(&module, file, options).decode_root()
	}
}
