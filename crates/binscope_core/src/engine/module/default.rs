use crate::engine::{Module, ModuleSource, Result, register_default_templates};

/// Source of the default module (`""`): built-in templates only, no detection rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModule;

impl ModuleSource for DefaultModule {
	fn load(&self, module: &mut Module) -> Result<()> {
		register_default_templates(module);
		Ok(())
	}
}
