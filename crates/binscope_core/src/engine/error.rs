use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Structural errors that abort loading or decoding.
///
/// Value-level problems (bad conversions, division by zero, wrong attribute keys) are not
/// represented here; they are logged and degrade the offending value instead.
#[derive(Debug, Error)]
pub enum EngineError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Decompressed stream exceeded the configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Not enough bits remained for a requested read.
	#[error("unexpected eof at bit {at}, need {need} bits, remaining {rem}")]
	UnexpectedEof {
		/// Bit offset where the read was attempted.
		at: u64,
		/// Requested bits.
		need: u64,
		/// Bits still available.
		rem: u64,
	},
	/// A template required a parameter that was not specified.
	#[error("missing parameter {parameter} for {template}: {reason}")]
	MissingParameter {
		/// Template name.
		template: String,
		/// Declared parameter name.
		parameter: String,
		/// Human readable reason.
		reason: &'static str,
	},
	/// Integer width above 64 bits.
	#[error("integer size must be <= 64, got {size}")]
	IntegerTooWide {
		/// Requested width in bits.
		size: i64,
	},
	/// Float width other than 32 or 64 bits.
	#[error("unsupported float size {size}")]
	UnsupportedFloatSize {
		/// Requested width in bits.
		size: i64,
	},
	/// A template parameter had an unusable value.
	#[error("bad parameter {parameter} for {template}: {value}")]
	BadParameter {
		/// Template name.
		template: String,
		/// Declared parameter name.
		parameter: String,
		/// Rendered offending value.
		value: String,
	},
	/// More parameters bound than the template declares.
	#[error("too many parameters for {template}: got {got}, max {max}")]
	TooManyParameters {
		/// Template name.
		template: String,
		/// Bound parameter count.
		got: usize,
		/// Declared parameter count.
		max: usize,
	},
	/// Template name did not resolve in the module or its imports.
	#[error("unknown template {name} in module <{module}>")]
	UnknownTemplate {
		/// Requested template name.
		name: String,
		/// Module key used for the lookup.
		module: String,
	},
	/// Type expression evaluated to something other than an object type.
	#[error("expected object type, got {got}")]
	ExpectedObjectType {
		/// Rendered value that was produced instead.
		got: String,
	},
	/// Type expression text could not be parsed.
	#[error("invalid type expression at {at}: {expr}")]
	InvalidTypeExpr {
		/// Original expression text.
		expr: String,
		/// Character offset of the failure.
		at: usize,
	},
	/// Module has no root type to decode.
	#[error("module <{module}> has no root type")]
	NoRootType {
		/// Module key.
		module: String,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Container reached the child limit with an element type of unknown size.
	#[error("decode container too large: children={count}, max={max}")]
	DecodeTooManyChildren {
		/// Number of children already read.
		count: usize,
		/// Maximum permitted children.
		max: usize,
	},
	/// A template read past the end of the region its object was given.
	#[error("`{name}` overran its region: ends at bit {end}, cursor at {at}")]
	RegionOverrun {
		/// Object name.
		name: String,
		/// Region end in bits.
		end: u64,
		/// Cursor position after decoding.
		at: u64,
	},
	/// No module source is registered under the key.
	#[error("module <{key}> is not registered")]
	UnknownModule {
		/// Requested module key.
		key: String,
	},
	/// Module import chain re-entered a module that is still loading.
	#[error("import cycle detected while loading module <{key}>")]
	ImportCycle {
		/// Key of the module that was re-entered.
		key: String,
	},
	/// Module description file was malformed.
	#[error("invalid module description {source_name}: {reason}")]
	InvalidDescription {
		/// File name or label of the description.
		source_name: String,
		/// Human readable reason.
		reason: String,
	},
	/// XML syntax error in a description or model file.
	#[error("xml: {0}")]
	Xml(#[from] quick_xml::Error),
	/// Model element identifier was not a valid hex literal.
	#[error("invalid model element id: {id}")]
	InvalidElementId {
		/// Offending identifier text.
		id: String,
	},
}
