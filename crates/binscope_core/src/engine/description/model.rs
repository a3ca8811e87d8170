use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::engine::description::{attributes_of, invalid};
use crate::engine::{EngineError, Result};

/// One `(id, name, type)` model declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
	/// Element identifier with its length marker cleared.
	pub id: u64,
	/// Name of the template created for the element.
	pub name: String,
	/// Type expression the element decodes as.
	pub ty: String,
}

/// Parse an element identifier such as `0x1A45DFA3`.
///
/// The most significant set bit of the first hex digit is cleared; remaining digits are
/// appended four bits at a time.
pub fn parse_element_id(text: &str) -> Result<u64> {
	let invalid_id = || EngineError::InvalidElementId { id: text.to_owned() };
	let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).ok_or_else(invalid_id)?;
	let mut chars = digits.chars();
	let first = chars.next().and_then(|c| c.to_digit(16)).ok_or_else(invalid_id)?;
	let mut value = match first {
		0 => 0,
		digit => u64::from(digit & !(1 << (31 - digit.leading_zeros()))),
	};
	for c in chars {
		let digit = c.to_digit(16).ok_or_else(invalid_id)?;
		value = value.checked_mul(16).ok_or_else(invalid_id)? | u64::from(digit);
	}
	Ok(value)
}

/// Parse a model document: every child of the top-level element declares one entry.
pub fn parse_model(text: &str, source_name: &str) -> Result<Vec<ModelEntry>> {
	let mut reader = Reader::from_str(text);
	reader.config_mut().trim_text(true);

	let mut depth = 0_usize;
	let mut entries = Vec::new();
	loop {
		match reader.read_event()? {
			Event::Start(element) => {
				if depth == 1 {
					entries.push(entry(&attributes_of(&element)?, source_name)?);
				}
				depth += 1;
			}
			Event::Empty(element) if depth == 1 => entries.push(entry(&attributes_of(&element)?, source_name)?),
			Event::End(_) => depth = depth.saturating_sub(1),
			Event::Eof => break,
			_ => {}
		}
	}
	Ok(entries)
}

fn entry(attributes: &[(String, String)], source_name: &str) -> Result<ModelEntry> {
	let get = |key: &str| {
		attributes
			.iter()
			.find(|(name, _)| name == key)
			.map(|(_, value)| value.clone())
			.ok_or_else(|| invalid(source_name, format!("model entry without `{key}`")))
	};
	Ok(ModelEntry {
		id: parse_element_id(&get("id")?)?,
		name: get("name")?,
		ty: get("type")?,
	})
}
