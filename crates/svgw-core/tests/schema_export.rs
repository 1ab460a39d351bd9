//! Integration tests: the exported schema as the frontend reads it.

use pretty_assertions::assert_eq;
use svgw_core::{SchemaVersion, VERSION, export_schema, registry, startup_script};

#[test]
fn both_formats_list_attributes_in_declared_order() {
    let names = export_schema(registry(), SchemaVersion::NamesOnly);
    let defaults = export_schema(registry(), SchemaVersion::Defaults);
    for schema in registry().iter() {
        let class = schema.class_name();
        let declared: Vec<&str> = schema.attributes().map(|f| f.name).collect();
        let listed: Vec<&str> = names[class]["attributes"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        let keyed: Vec<&str> = defaults[class]["attributes"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(listed, declared, "{class}");
        assert_eq!(keyed, declared, "{class}");
    }
}

#[test]
fn canvas_controls_are_not_exported_as_attributes() {
    let doc = export_schema(registry(), SchemaVersion::Defaults);
    let canvas = &doc["SVGWidget"];
    assert_eq!(canvas["tag_name"], "svg");
    assert!(canvas["attributes"].get("mode").is_none());
    assert_eq!(canvas["view_name"], "SVGView");
}

#[test]
fn startup_script_embeds_the_document() {
    let doc = export_schema(registry(), SchemaVersion::Defaults);
    let script = startup_script(&doc);
    assert!(script.starts_with(&format!("// svgwidgets {VERSION}\n")));
    let payload = script
        .lines()
        .nth(1)
        .and_then(|l| l.strip_prefix("window.widget_properties = "))
        .and_then(|l| l.strip_suffix(';'))
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(payload).unwrap();
    assert_eq!(parsed, doc);
}
