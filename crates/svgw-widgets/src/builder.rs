//! The drawing builder panel.
//!
//! Composes the toolbar controls with a canvas root and links each control's
//! value to the matching canvas tool field:
//!
//! | Control | Canvas field |
//! |---|---|
//! | tool selector | `mode` |
//! | stroke color | `stroke` |
//! | stroke width | `stroke_width` |
//! | fill color | `fill` |
//! | fill opacity | `fill_opacity` |
//!
//! The panel owns the shape tree, so it is also the entry point for comm
//! messages addressed to any shape node.

use crate::controls::{Choice, Control, Row, Slider};
use crate::link::{FieldRef, FieldStore, LinkHandle, Links};
use crate::widget::Widget;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use svgw_core::emitter::emit_document;
use svgw_core::{
    AttrValue, DispatchError, FieldError, Handled, NodeId, OutboundMessage, Outbox, SchemaError,
    ShapeNode, ShapeTree,
};

// ─── Config ───────────────────────────────────────────────────────────────

/// Range and starting value of a toolbar slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

/// Configuration for [`BuilderPanel::with_config`].
///
/// Deserializes from partial JSON; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Drawing tools offered by the tool selector. The first is selected.
    pub tools: Vec<String>,
    /// Colors offered for stroke and fill. Fill also offers `none`.
    pub palette: Vec<String>,
    pub stroke: String,
    pub fill: String,
    pub stroke_width: SliderConfig,
    pub fill_opacity: SliderConfig,
    /// Rendering module loaded once the schema is published.
    pub render_module: String,
}

pub const DEFAULT_TOOLS: [&str; 6] = ["select", "rect", "circle", "ellipse", "line", "path"];

pub const DEFAULT_PALETTE: [&str; 8] = [
    "black", "red", "orange", "yellow", "green", "blue", "magenta", "white",
];

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            tools: DEFAULT_TOOLS.iter().map(|s| s.to_string()).collect(),
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
            stroke: "black".into(),
            fill: "blue".into(),
            stroke_width: SliderConfig {
                min: 0.0,
                max: 20.0,
                step: 0.5,
                value: 3.0,
            },
            fill_opacity: SliderConfig {
                min: 0.0,
                max: 1.0,
                step: 0.05,
                value: 0.5,
            },
            render_module: svgw_core::RENDER_MODULE.into(),
        }
    }
}

impl SliderConfig {
    fn normalized(self, name: &str, fallback: SliderConfig) -> Self {
        if !(self.min.is_finite() && self.max.is_finite() && self.value.is_finite()) {
            log::warn!("{name}: non-finite slider bounds, using defaults");
            return fallback;
        }
        let (min, max) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            log::warn!("{name}: min > max, swapping");
            (self.max, self.min)
        };
        Self {
            min,
            max,
            step: if self.step > 0.0 { self.step } else { fallback.step },
            value: self.value.clamp(min, max),
        }
    }
}

impl BuilderConfig {
    /// Repair values the controls cannot represent: empty option lists fall
    /// back to the defaults and slider bounds are put in order.
    #[must_use]
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let tools = if self.tools.is_empty() {
            log::warn!("empty tool list, using defaults");
            defaults.tools
        } else {
            self.tools
        };
        let palette = if self.palette.is_empty() {
            log::warn!("empty palette, using defaults");
            defaults.palette
        } else {
            self.palette
        };
        Self {
            tools,
            palette,
            stroke: self.stroke,
            fill: self.fill,
            stroke_width: self
                .stroke_width
                .normalized("stroke_width", defaults.stroke_width),
            fill_opacity: self
                .fill_opacity
                .normalized("fill_opacity", defaults.fill_opacity),
            render_module: self.render_module,
        }
    }
}

// ─── Surface ─────────────────────────────────────────────────────────────

/// Everything that owns synchronized fields: the shape tree and the controls.
#[derive(Debug)]
pub struct Surface {
    pub tree: ShapeTree,
    pub controls: HashMap<NodeId, Control>,
}

impl Surface {
    fn add_control(&mut self, control: Control) -> NodeId {
        let id = control.id();
        self.controls.insert(id, control);
        id
    }
}

impl FieldStore for Surface {
    fn read(&self, field: &FieldRef) -> Option<AttrValue> {
        if let Some(control) = self.controls.get(&field.owner) {
            return control.get(&field.field);
        }
        self.tree.get(field.owner)?.get(&field.field).cloned()
    }

    fn write(&mut self, field: &FieldRef, value: AttrValue) -> Result<bool, FieldError> {
        if let Some(control) = self.controls.get_mut(&field.owner) {
            return control.set(&field.field, value);
        }
        self.tree
            .get_mut(field.owner)
            .ok_or(FieldError::UnknownOwner(field.owner))?
            .set(&field.field, value)
    }
}

// ─── Builder Panel ───────────────────────────────────────────────────────

/// Handles of the five toolbar links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLinks {
    pub mode: LinkHandle,
    pub stroke: LinkHandle,
    pub stroke_width: LinkHandle,
    pub fill: LinkHandle,
    pub fill_opacity: LinkHandle,
}

/// A drawing GUI: toolbar controls plus a canvas, kept in sync.
#[derive(Debug)]
pub struct BuilderPanel {
    pub id: NodeId,
    surface: Surface,
    links: Links,
    handles: PanelLinks,
    outbox: Outbox,
    config: BuilderConfig,

    pub tool: NodeId,
    pub stroke_color: NodeId,
    pub stroke_width: NodeId,
    pub fill_color: NodeId,
    pub fill_opacity: NodeId,
    pub stroke_box: NodeId,
    pub fill_box: NodeId,
}

impl BuilderPanel {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        let config = config.normalized();
        let mut surface = Surface {
            tree: ShapeTree::canvas(),
            controls: HashMap::new(),
        };

        let tool = surface.add_control(Control::ToggleButtons(Choice::new(
            "toggle",
            "Drawing tools:",
            config.tools.clone(),
            "",
        )));
        let stroke_color = surface.add_control(Control::Dropdown(Choice::new(
            "dropdown",
            "Stroke:",
            config.palette.clone(),
            &config.stroke,
        )));
        let sw = config.stroke_width;
        let stroke_width = surface.add_control(Control::FloatSlider(Slider::new(
            "Stroke width:",
            sw.min,
            sw.max,
            sw.step,
            sw.value,
        )));
        let fill_options = std::iter::once("none".to_string())
            .chain(config.palette.iter().filter(|c| *c != "none").cloned())
            .collect();
        let fill_color = surface.add_control(Control::Dropdown(Choice::new(
            "dropdown",
            "Fill:",
            fill_options,
            &config.fill,
        )));
        let fo = config.fill_opacity;
        let fill_opacity = surface.add_control(Control::FloatSlider(Slider::new(
            "Fill opacity:",
            fo.min,
            fo.max,
            fo.step,
            fo.value,
        )));
        let stroke_box = surface.add_control(Control::HBox(Row::new([stroke_color, stroke_width])));
        let fill_box = surface.add_control(Control::HBox(Row::new([fill_color, fill_opacity])));

        let canvas = surface.tree.root_id();
        let mut links = Links::new();
        let mut bind = |control: NodeId, field: &str| {
            links.link(
                &mut surface,
                FieldRef::new(control, "value"),
                FieldRef::new(canvas, field),
            )
        };
        let handles = PanelLinks {
            mode: bind(tool, "mode"),
            stroke: bind(stroke_color, "stroke"),
            stroke_width: bind(stroke_width, "stroke_width"),
            fill: bind(fill_color, "fill"),
            fill_opacity: bind(fill_opacity, "fill_opacity"),
        };

        log::debug!("builder panel ready with canvas {canvas}");
        Self {
            id: NodeId::with_prefix("builder"),
            surface,
            links,
            handles,
            outbox: Outbox::new(),
            config,
            tool,
            stroke_color,
            stroke_width,
            fill_color,
            fill_opacity,
            stroke_box,
            fill_box,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn tree(&self) -> &ShapeTree {
        &self.surface.tree
    }

    pub fn canvas_id(&self) -> NodeId {
        self.surface.tree.root_id()
    }

    pub fn canvas(&self) -> &ShapeNode {
        self.surface.tree.root_node()
    }

    pub fn control(&self, id: NodeId) -> Option<&Control> {
        self.surface.controls.get(&id)
    }

    /// Top-level widgets in display order:
    /// tool selector, stroke controls, fill controls, canvas.
    pub fn layout(&self) -> [NodeId; 4] {
        [self.tool, self.stroke_box, self.fill_box, self.canvas_id()]
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn handles(&self) -> PanelLinks {
        self.handles
    }

    pub fn unlink(&mut self, handle: LinkHandle) -> bool {
        self.links.unlink(handle)
    }

    pub fn get_field(&self, field: &FieldRef) -> Option<AttrValue> {
        self.surface.read(field)
    }

    /// Write a synchronized field, as the frontend does when the user clicks
    /// a control or drags a shape, and mirror it across links.
    /// Returns every field that changed.
    pub fn set_field(
        &mut self,
        field: &FieldRef,
        value: AttrValue,
    ) -> Result<Vec<FieldRef>, FieldError> {
        self.links
            .write(&mut self.surface, field, value)
            .inspect_err(|err| log::warn!("rejected write to {field}: {err}"))
    }

    /// Decode and dispatch a comm message addressed to a shape node.
    pub fn handle_message(&mut self, target: NodeId, json: &str) -> Result<Handled, DispatchError> {
        self.surface.tree.handle_json(target, json)
    }

    /// Queue a `get_html` request for a shape node.
    pub fn request_markup(&mut self, node: NodeId) -> Result<(), SchemaError> {
        self.surface.tree.request_markup(node, &mut self.outbox)
    }

    /// Take every queued outbound message.
    pub fn drain_outbox(&mut self) -> Vec<(NodeId, OutboundMessage)> {
        self.outbox.drain()
    }

    /// State of any widget in the panel, including `children` for containers.
    pub fn state_of(&self, id: NodeId) -> Option<serde_json::Value> {
        if id == self.id {
            return Some(self.state());
        }
        if let Some(control) = self.surface.controls.get(&id) {
            return Some(control.state());
        }
        let tree = &self.surface.tree;
        let node = tree.get(id)?;
        let mut state = node.state();
        if node.is_fertile()
            && let (Some(obj), Some(idx)) = (state.as_object_mut(), tree.index_of(id))
        {
            let children: Vec<&str> = tree
                .children(idx)
                .into_iter()
                .map(|c| tree.graph[c].id.as_str())
                .collect();
            obj.insert("children".into(), children.into());
        }
        Some(state)
    }

    /// Markup of the canvas as rendered from backend state.
    pub fn markup(&self) -> String {
        emit_document(&self.surface.tree)
    }
}

impl Default for BuilderPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for BuilderPanel {
    fn id(&self) -> NodeId {
        self.id
    }

    fn view_name(&self) -> &str {
        "VBoxView"
    }

    fn state(&self) -> serde_json::Value {
        let children: Vec<&str> = self.layout().iter().map(|id| id.as_str()).collect();
        serde_json::json!({
            "_view_name": self.view_name(),
            "children": children,
        })
    }
}
