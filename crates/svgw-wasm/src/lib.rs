//! WASM bridge for SVG Widgets: exposes the builder panel and the shape
//! schema to the notebook frontend.
//!
//! Compiled via `wasm-pack build --target web`. Every entry point reports
//! failure as a console log line plus a `false` or `{"ok":false}` return.

use serde::Serialize;
use svgw_core::{
    Handled, NodeId, OutboundMessage, SchemaVersion, export_schema, registry, startup_script,
};
use svgw_widgets::{BuilderConfig, BuilderPanel, FieldRef, Widget};
use wasm_bindgen::prelude::*;

/// Install the console logger and panic hook once the module is loaded.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook_setup();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("logger already installed");
    }
    log::info!("svgwidgets {} loaded", svgw_core::VERSION);
}

/// The drawing builder as seen from JavaScript.
///
/// Holds the panel, which owns the toolbar controls, the canvas and every
/// shape node. Messages from shape views and control changes all go through
/// this struct.
#[wasm_bindgen]
pub struct SvgBuilder {
    panel: BuilderPanel,
}

#[wasm_bindgen]
impl SvgBuilder {
    /// Create a builder from an optional JSON `BuilderConfig`. A config that
    /// fails to parse is logged and the defaults are used.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Self {
        let config = match config_json.as_deref().map(serde_json::from_str::<BuilderConfig>) {
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                log::warn!("invalid builder config, using defaults: {err}");
                BuilderConfig::default()
            }
            None => BuilderConfig::default(),
        };
        Self {
            panel: BuilderPanel::with_config(config),
        }
    }

    /// Id of the panel widget itself.
    pub fn id(&self) -> String {
        self.panel.id.as_str().to_string()
    }

    pub fn canvas_id(&self) -> String {
        self.panel.canvas_id().as_str().to_string()
    }

    /// Top-level widget ids in display order, as a JSON array.
    pub fn layout_json(&self) -> String {
        let ids: Vec<&str> = self.panel.layout().iter().map(|id| id.as_str()).collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Synchronized state of any widget as JSON. Empty string if unknown.
    pub fn state_of(&self, id: &str) -> String {
        NodeId::lookup(id)
            .and_then(|id| self.panel.state_of(id))
            .map(|state| state.to_string())
            .unwrap_or_default()
    }

    /// Deliver a comm message from the view of `target`.
    ///
    /// Returns JSON: `{"ok":true,"child":"rect_4","skipped":[...]}` for a new
    /// child, `{"ok":true,"html":"..."}` for markup, `{"ok":true}` when
    /// ignored, or `{"ok":false,"error":"..."}`.
    pub fn handle_message(&mut self, target: &str, json: &str) -> String {
        let Some(target) = known_id(target) else {
            return error_reply(&UnknownId(target)).to_string();
        };
        let reply = match self.panel.handle_message(target, json) {
            Ok(Handled::ChildCreated(report)) => {
                let skipped: Vec<String> = report.skipped.iter().map(|e| e.to_string()).collect();
                serde_json::json!({ "ok": true, "child": report.id.as_str(), "skipped": skipped })
            }
            Ok(Handled::Markup(html)) => serde_json::json!({ "ok": true, "html": html }),
            Ok(Handled::Ignored) => serde_json::json!({ "ok": true }),
            Err(err) => error_reply(&err),
        };
        reply.to_string()
    }

    /// Write a field from the frontend (a control click, a shape drag).
    /// `value_json` is a JSON string or number.
    ///
    /// Returns JSON `{"ok":true,"changed":["owner.field",...]}` or an error.
    pub fn set_field(&mut self, owner: &str, field: &str, value_json: &str) -> String {
        let value = match serde_json::from_str::<serde_json::Value>(value_json) {
            Ok(json) => svgw_core::AttrValue::from_json(&json).map_err(|e| e.to_string()),
            Err(err) => Err(err.to_string()),
        };
        let value = match value {
            Ok(value) => value,
            Err(err) => {
                log::warn!("{owner}.{field}: bad value {value_json}: {err}");
                return error_reply(&err).to_string();
            }
        };
        let Some(owner_id) = known_id(owner) else {
            return error_reply(&UnknownId(owner)).to_string();
        };
        let target = FieldRef::new(owner_id, field);
        match self.panel.set_field(&target, value) {
            Ok(changed) => {
                let changed: Vec<String> = changed.iter().map(|f| f.to_string()).collect();
                serde_json::json!({ "ok": true, "changed": changed }).to_string()
            }
            Err(err) => error_reply(&err).to_string(),
        }
    }

    /// Queue a `get_html` request for `id`. Returns `false` for unknown nodes.
    pub fn request_markup(&mut self, id: &str) -> bool {
        let Some(node) = known_id(id) else {
            return false;
        };
        match self.panel.request_markup(node) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("request_markup: {err}");
                false
            }
        }
    }

    /// Take queued outbound messages as a JSON array of
    /// `{"target": id, "message": {...}}`.
    pub fn drain_outbox(&mut self) -> String {
        let envelopes: Vec<Envelope> = self
            .panel
            .drain_outbox()
            .into_iter()
            .map(|(target, message)| Envelope {
                target: target.as_str().to_string(),
                message,
            })
            .collect();
        serde_json::to_string(&envelopes).unwrap_or_else(|_| "[]".to_string())
    }

    /// Canvas markup rendered from backend state.
    pub fn markup(&self) -> String {
        self.panel.markup()
    }

    pub fn render_module(&self) -> String {
        self.panel.config().render_module.clone()
    }

    /// Panel state (`_view_name` and `children`) as JSON.
    pub fn panel_state(&self) -> String {
        self.panel.state().to_string()
    }
}

#[derive(Serialize)]
struct Envelope {
    target: String,
    message: OutboundMessage,
}

/// Resolve an id sent by the frontend. Unknown ids are logged and never
/// interned.
fn known_id(id: &str) -> Option<NodeId> {
    let found = NodeId::lookup(id);
    if found.is_none() {
        log::warn!("unknown widget id from frontend: {id}");
    }
    found
}

struct UnknownId<'a>(&'a str);

impl std::fmt::Display for UnknownId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no such widget: {}", self.0)
    }
}

fn error_reply(err: &dyn std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "ok": false, "error": err.to_string() })
}

// ─── Schema publishing ───────────────────────────────────────────────────

/// The schema export as JSON. `names_only` selects the oldest format.
#[wasm_bindgen]
pub fn widget_properties(names_only: bool) -> String {
    let version = if names_only {
        SchemaVersion::NamesOnly
    } else {
        SchemaVersion::Defaults
    };
    export_schema(registry(), version).to_string()
}

/// The startup snippet defining `window.widget_properties`.
#[wasm_bindgen]
pub fn widget_startup_script() -> String {
    startup_script(&export_schema(registry(), SchemaVersion::Defaults))
}

/// Define `window.widget_properties` in the page, then load the rendering
/// module. Returns `false` if there is no document to publish into.
#[wasm_bindgen]
pub fn publish_schema(render_module: Option<String>) -> bool {
    let module = render_module.unwrap_or_else(|| svgw_core::RENDER_MODULE.to_string());
    match try_publish(&module) {
        Ok(()) => {
            log::info!("published {} shape kinds, loading {module}", registry().len());
            true
        }
        Err(err) => {
            log::error!("publish_schema failed: {err:?}");
            false
        }
    }
}

fn try_publish(module: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let doc = export_schema(registry(), SchemaVersion::Defaults);
    let properties = js_sys::JSON::parse(&doc.to_string())?;
    js_sys::Reflect::set(&window, &JsValue::from_str("widget_properties"), &properties)?;

    let script = document.create_element("script")?;
    script.set_attribute("type", "module")?;
    script.set_attribute("src", module)?;
    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("no document head"))?;
    head.append_child(&script)?;
    Ok(())
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("svgwidgets panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> serde_json::Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn new_child_reply_names_the_child() {
        let mut builder = SvgBuilder::new(None);
        let canvas = builder.canvas_id();
        let reply = parse(&builder.handle_message(
            &canvas,
            r#"{"message_type":"new","class_name":"RectWidget","attributes":{"x":"5"}}"#,
        ));
        assert_eq!(reply["ok"], true);
        assert!(reply["child"].as_str().unwrap().starts_with("rect"));
        assert_eq!(reply["skipped"], serde_json::json!([]));
    }

    #[test]
    fn malformed_message_is_an_error_reply() {
        let mut builder = SvgBuilder::new(None);
        let canvas = builder.canvas_id();
        let reply = parse(&builder.handle_message(&canvas, r#"{"message_type":"new"}"#));
        assert_eq!(reply["ok"], false);
    }

    #[test]
    fn set_field_reports_changed_fields() {
        let mut builder = SvgBuilder::new(None);
        let layout: Vec<String> = serde_json::from_str(&builder.layout_json()).unwrap();
        let reply = parse(&builder.set_field(&layout[0], "value", r#""rect""#));
        assert_eq!(reply["changed"].as_array().map(Vec::len), Some(2));
        let canvas = parse(&builder.state_of(&builder.canvas_id()));
        assert_eq!(canvas["mode"], "rect");

        let reply = parse(&builder.set_field(&layout[0], "value", "true"));
        assert_eq!(reply["ok"], false);
    }

    #[test]
    fn outbox_drains_as_envelopes() {
        let mut builder = SvgBuilder::new(None);
        let canvas = builder.canvas_id();
        assert!(builder.request_markup(&canvas));
        assert!(!builder.request_markup("nowhere_1"));
        let out = parse(&builder.drain_outbox());
        assert_eq!(
            out,
            serde_json::json!([{ "target": canvas, "message": { "message_type": "get_html" } }])
        );
        assert_eq!(builder.drain_outbox(), "[]");
    }

    #[test]
    fn unknown_ids_are_not_interned() {
        let mut builder = SvgBuilder::new(None);
        let ghost = "ghost_from_frontend_42";
        assert_eq!(builder.state_of(ghost), "");
        assert!(!builder.request_markup(ghost));
        let html = r#"{"message_type":"html","html":""}"#;
        let reply = parse(&builder.handle_message(ghost, html));
        assert_eq!(reply["ok"], false);
        let reply = parse(&builder.set_field(ghost, "value", "1"));
        assert_eq!(reply["ok"], false);
        assert_eq!(NodeId::lookup(ghost), None);
    }

    #[test]
    fn bad_config_falls_back_to_defaults() {
        let builder = SvgBuilder::new(Some("not json".into()));
        assert_eq!(builder.render_module(), svgw_core::RENDER_MODULE);
        assert_eq!(builder.state_of("missing_1"), "");
    }

    #[test]
    fn exported_properties_cover_every_class() {
        let doc = parse(&widget_properties(false));
        assert_eq!(doc.as_object().map(|o| o.len()), Some(8));
        assert!(doc["SVGWidget"]["fertile"].as_bool().unwrap());
        assert!(widget_startup_script().contains("window.widget_properties = "));
    }
}
