mod attributes;
mod description;
mod detector;
mod error;
mod expr;
mod module;
mod object;
mod object_type;
mod parser;
mod scope;
mod source;
mod templates;
mod variable;
mod variant;

/// Numbered and named attribute lists.
pub use attributes::ObjectAttributes;
/// XML module descriptions and element models.
pub use description::{DescriptionModule, EnumDescription, ModelDescription, ModelEntry, ModuleDescription, parse_element_id, parse_model};
/// Magic-number and extension format detection.
pub use detector::{DetectorAdder, FormatAdder, MAX_PROBE_BYTES, StandardFormatDetector};
/// Error and result aliases.
pub use error::{EngineError, Result};
/// Textual type expressions.
pub use expr::{TypeExpr, parse_number};
/// Template registries and lazy module resolution.
pub use module::{DefaultModule, MODULE_SUFFIX, Module, ModuleLoader, ModuleSource};
/// Decoded tree node.
pub use object::Object;
/// Type templates and their instances.
pub use object_type::{FixedSize, ObjectType, ObjectTypeTemplate, TemplateBehavior};
/// Tree decoding entry points and options.
pub use parser::{DecodeOptions, Decoder, ParsingContext};
/// Name resolution frames.
pub use scope::{LocalScope, Scope, VariableScope, resolve_path};
/// Bit-addressable source files.
pub use source::{Compression, Endianness, FileAnchor, SourceFile, ZSTD_MAGIC, decode_bytes};
/// Built-in and description-defined template behaviors.
pub use templates::{
	ArrayBehavior, ByteBehavior, ElementNamer, EnumBehavior, ExtensionBehavior, FloatBehavior, IntBehavior, Member, MemberKind, StringBehavior, StructTemplate,
	TupleBehavior, UintBehavior, UuidBehavior, register_default_templates,
};
/// Variable accessors over shared storage.
pub use variable::{Slot, Variable, VariableArgs, VariableImplementation, VariableKeywordArgs, VariableLambda, VariablePath, slot};
/// Dynamic value model.
pub use variant::{DisplayBase, SimpleDisplay, SuperKind, Variant, VariantKind};
