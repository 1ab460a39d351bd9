//! Schema export: the shape metadata the rendering side needs to build one
//! view class per kind.
//!
//! The document is published once as `window.widget_properties`, after which
//! the rendering module is loaded and registers its views from it.

use crate::schema::{Registry, ShapeSchema};
use serde::Serialize;

pub const VERSION: &str = "0.3";

/// Rendering module loaded after the schema has been published.
pub const RENDER_MODULE: &str = "svgwidgets.js";

/// Shape of the `attributes` entry in the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    /// Oldest format: attribute names only, in declared order.
    NamesOnly,
    /// Attribute name → default value, keys in declared order.
    #[default]
    Defaults,
}

#[derive(Serialize)]
struct KindEntry<'a> {
    tag_name: &'a str,
    fertile: bool,
    draggable: bool,
    view_name: &'a str,
    attributes: serde_json::Value,
    has_content: bool,
}

fn attributes_entry(schema: &ShapeSchema, version: SchemaVersion) -> serde_json::Value {
    match version {
        SchemaVersion::NamesOnly => schema
            .attributes()
            .map(|f| serde_json::Value::String(f.name.to_string()))
            .collect(),
        SchemaVersion::Defaults => schema
            .attributes()
            .map(|f| (f.name.to_string(), f.default.to_json()))
            .collect::<serde_json::Map<_, _>>()
            .into(),
    }
}

/// Serialize every registered kind, keyed by class name.
#[must_use]
pub fn export_schema(registry: &Registry, version: SchemaVersion) -> serde_json::Value {
    let mut doc = serde_json::Map::new();
    for schema in registry.iter() {
        let entry = KindEntry {
            tag_name: schema.tag_name,
            fertile: schema.fertile,
            draggable: schema.draggable,
            view_name: &schema.view_name,
            attributes: attributes_entry(schema, version),
            has_content: schema.has_content,
        };
        // KindEntry only holds strings, bools and JSON values.
        let value = serde_json::to_value(entry).unwrap_or_default();
        doc.insert(schema.class_name().to_string(), value);
    }
    serde_json::Value::Object(doc)
}

/// The snippet that publishes `doc` into the page's global scope.
#[must_use]
pub fn startup_script(doc: &serde_json::Value) -> String {
    format!("// svgwidgets {VERSION}\nwindow.widget_properties = {doc};\n")
}
