use std::rc::Rc;

use super::{DescriptionModule, ModuleDescription, parse_element_id, parse_model};
use crate::engine::{DecodeOptions, EngineError, ModuleLoader, SourceFile, Variant};

const PIXELS: &str = r#"
<module>
	<magic>50 58 xx 01</magic>
	<extension>px</extension>
	<root type="Image"/>
	<enum name="Depth" type="uint(8)">
		<entry value="1" label="MONO"/>
		<entry value="8" label="GRAY"/>
	</enum>
	<struct name="Image" endian="little">
		<array name="magic" type="byte" count="4" pattern="m%"/>
		<field name="depth" type="Depth"/>
		<field name="count" type="uint(16)"/>
		<array name="pixels" type="uint(depth)" count="count" pattern="p%"/>
	</struct>
</module>
"#;

#[test]
fn description_parses_every_section() {
	let description = ModuleDescription::parse(PIXELS, "pixels.module.xml").expect("parse description");
	assert_eq!(description.magics, vec!["50 58 xx 01".to_owned()]);
	assert_eq!(description.extensions, vec!["px".to_owned()]);
	assert_eq!(description.root.as_deref(), Some("Image"));
	assert_eq!(description.enums[0].entries.len(), 2);
	assert_eq!(description.structs[0].1.members().len(), 4);
	assert!(description.imports.is_empty());
}

#[test]
fn description_module_decodes_end_to_end() {
	let mut loader = ModuleLoader::new();
	let source = DescriptionModule::new(ModuleDescription::parse(PIXELS, "pixels.module.xml").expect("parse"));
	loader.add_module("pixels", Rc::new(source));

	let mut file = SourceFile::from_bytes(vec![0x50, 0x58, 0x00, 0x01, 8, 2, 0, 0xAA, 0xBB]);
	let root = loader.decode_file(&mut file, DecodeOptions::default()).expect("decode");

	let depth = root.lookup("depth").expect("depth");
	assert_eq!(*depth.value(), Variant::from(8_u64));
	assert_eq!(depth.numbered_attribute(0).map(|v| v.to_str().to_owned()).as_deref(), Some("GRAY"));
	assert_eq!(root.lookup("count").map(|o| o.value().clone()), Some(Variant::from(2_u64)));
	assert_eq!(root.lookup("pixels.p1").map(|o| o.value().clone()), Some(Variant::from(0xBB_u64)));
	assert_eq!(root.size(), 72);
}

#[test]
fn malformed_descriptions_are_structural() {
	let err = ModuleDescription::parse("<module><struct/></module>", "bad.module.xml").expect_err("struct without name");
	assert!(matches!(err, EngineError::InvalidDescription { ref reason, .. } if reason.contains("`name`")));

	let err = ModuleDescription::parse("<module><bogus/></module>", "bad.module.xml").expect_err("unknown element");
	assert!(err.to_string().contains("<bogus>"));

	let err = ModuleDescription::parse(r#"<module><struct name="S"><field name="x" type="uint(("/></struct></module>"#, "bad.module.xml")
		.expect_err("bad type expression");
	assert!(matches!(err, EngineError::InvalidTypeExpr { .. }));
}

#[test]
fn element_ids_clear_length_marker() {
	assert_eq!(parse_element_id("0x81").expect("id"), 1);
	assert_eq!(parse_element_id("0x1A45DFA3").expect("id"), 0x0A45_DFA3);
	assert_eq!(parse_element_id("0x4286").expect("id"), 0x0286);
	assert_eq!(parse_element_id("0x0F").expect("id"), 0x0F);
	assert!(matches!(parse_element_id("81"), Err(EngineError::InvalidElementId { .. })));
	assert!(parse_element_id("0xZZ").is_err());
}

#[test]
fn model_entries_come_from_top_level_children() {
	let text = r#"<model>
		<element id="0x81" name="Text" type="String"/>
		<element id="0x82" name="Count" type="uint(16)"></element>
	</model>"#;
	let entries = parse_model(text, "inline").expect("parse model");
	assert_eq!(entries.len(), 2);
	assert_eq!(entries[1].id, 2);
	assert_eq!(entries[1].ty, "uint(16)");

	let err = parse_model("<model><element id=\"0x81\"/></model>", "inline").expect_err("missing name");
	assert!(matches!(err, EngineError::InvalidDescription { .. }));
}
