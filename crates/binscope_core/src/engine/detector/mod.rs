use crate::engine::SourceFile;

/// Longest prefix read when probing magic numbers.
pub const MAX_PROBE_BYTES: usize = 256;

/// Sink for the detection rules of one format.
pub trait FormatAdder {
	/// Add a magic pattern: space separated hex byte pairs, `xx` matching any byte.
	fn add_magic_number(&mut self, magic: &str);

	/// Add a file extension, without the leading dot.
	fn add_extension(&mut self, extension: &str);
}

#[derive(Debug, Clone)]
struct MagicRule {
	format: String,
	pattern: Vec<Option<u8>>,
}

impl MagicRule {
	fn matches(&self, probe: &[u8]) -> bool {
		self.pattern.len() <= probe.len() && self.pattern.iter().zip(probe).all(|(expected, actual)| expected.is_none_or(|byte| byte == *actual))
	}
}

/// Magic-number and extension based format detector.
#[derive(Debug, Clone, Default)]
pub struct StandardFormatDetector {
	magic: Vec<MagicRule>,
	extensions: Vec<(String, String)>,
}

impl StandardFormatDetector {
	/// Create a detector with no rules.
	pub fn new() -> Self {
		Self::default()
	}

	/// Rule sink attributing every rule to `format`.
	pub fn adder(&mut self, format: &str) -> DetectorAdder<'_> {
		DetectorAdder {
			detector: self,
			format: format.to_owned(),
		}
	}

	/// Identify the format of `file`; `""` when nothing matches.
	///
	/// Magic rules are anchored at offset 0 and win over extensions. Among matching magic
	/// rules the longest pattern wins, ties going to the first registered. The cursor is
	/// restored before returning.
	pub fn get_format(&self, file: &mut SourceFile) -> String {
		if let Some(format) = self.match_magic(file) {
			return format;
		}
		let Some(extension) = file.extension() else {
			return String::new();
		};
		self.extensions
			.iter()
			.find(|(_, candidate)| *candidate == extension)
			.map(|(format, _)| format.clone())
			.unwrap_or_default()
	}

	/// Formats with at least one rule, in registration order.
	pub fn formats(&self) -> Vec<String> {
		let mut out: Vec<String> = Vec::new();
		let names = self.magic.iter().map(|rule| &rule.format).chain(self.extensions.iter().map(|(format, _)| format));
		for name in names {
			if !out.contains(name) {
				out.push(name.clone());
			}
		}
		out
	}

	/// Magic patterns registered for `format`, rendered back to text.
	pub fn magic_numbers(&self, format: &str) -> Vec<String> {
		self.magic.iter().filter(|rule| rule.format == format).map(|rule| render_pattern(&rule.pattern)).collect()
	}

	/// Extensions registered for `format`.
	pub fn extensions(&self, format: &str) -> Vec<String> {
		self.extensions.iter().filter(|(candidate, _)| candidate == format).map(|(_, ext)| ext.clone()).collect()
	}

	fn match_magic(&self, file: &mut SourceFile) -> Option<String> {
		let longest = self.magic.iter().map(|rule| rule.pattern.len()).max()?.min(MAX_PROBE_BYTES);
		let probe = {
			let mut anchor = file.anchor();
			anchor.seek(0);
			let available = (anchor.remaining_bits() / 8) as usize;
			anchor.read_bytes(longest.min(available)).unwrap_or_default()
		};

		let mut best: Option<&MagicRule> = None;
		for rule in self.magic.iter().filter(|rule| rule.matches(&probe)) {
			if best.is_none_or(|current| rule.pattern.len() > current.pattern.len()) {
				best = Some(rule);
			}
		}
		best.map(|rule| rule.format.clone())
	}
}

/// [`FormatAdder`] bound to one format key of a [`StandardFormatDetector`].
pub struct DetectorAdder<'d> {
	detector: &'d mut StandardFormatDetector,
	format: String,
}

impl FormatAdder for DetectorAdder<'_> {
	fn add_magic_number(&mut self, magic: &str) {
		match parse_pattern(magic) {
			Some(pattern) if !pattern.is_empty() => self.detector.magic.push(MagicRule {
				format: self.format.clone(),
				pattern,
			}),
			_ => tracing::warn!(format = %self.format, magic, "ignoring malformed magic number"),
		}
	}

	fn add_extension(&mut self, extension: &str) {
		let extension = extension.trim_start_matches('.').to_ascii_lowercase();
		self.detector.extensions.push((self.format.clone(), extension));
	}
}

fn parse_pattern(text: &str) -> Option<Vec<Option<u8>>> {
	text.split_whitespace()
		.map(|token| match token {
			"xx" | "XX" => Some(None),
			_ if token.len() == 2 => u8::from_str_radix(token, 16).ok().map(Some),
			_ => None,
		})
		.collect()
}

fn render_pattern(pattern: &[Option<u8>]) -> String {
	pattern
		.iter()
		.map(|byte| match byte {
			Some(byte) => format!("{byte:02x}"),
			None => "xx".to_owned(),
		})
		.collect::<Vec<_>>()
		.join(" ")
}
