//! Shape schema registry.
//!
//! Each shape kind is declared once in [`DECLARATIONS`] with its tag name,
//! category and attribute defaults written as literals. [`register_all`] turns
//! the declarations into typed [`ShapeSchema`] values: the category decides
//! `fertile`/`draggable`, the presence of a content default decides
//! `has_content`, and each default literal decides whether its field is
//! numeric or text.

use crate::error::SchemaError;
use crate::value::{AttrType, AttrValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// ─── Kinds ───────────────────────────────────────────────────────────────

/// The closed set of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Canvas,
    Group,
    Rect,
    Circle,
    Ellipse,
    Line,
    Path,
    Text,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Canvas,
        ShapeKind::Group,
        ShapeKind::Rect,
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::Line,
        ShapeKind::Path,
        ShapeKind::Text,
    ];

    /// The name the frontend uses for this kind in `"new"` messages.
    pub fn class_name(self) -> &'static str {
        match self {
            ShapeKind::Canvas => "SVGWidget",
            ShapeKind::Group => "GroupWidget",
            ShapeKind::Rect => "RectWidget",
            ShapeKind::Circle => "CircleWidget",
            ShapeKind::Ellipse => "EllipseWidget",
            ShapeKind::Line => "LineWidget",
            ShapeKind::Path => "PathWidget",
            ShapeKind::Text => "TextWidget",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.class_name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Containers may hold children; leaves are draggable instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Container,
    Leaf,
}

/// Where a field ends up on the rendering side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Written as a markup attribute.
    Attribute,
    /// Written as the element's text content.
    Content,
    /// Drawing-tool state carried by the canvas; never rendered.
    Control,
}

/// One synchronized field of a shape kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: AttrType,
    pub default: AttrValue,
    pub role: FieldRole,
}

impl FieldSpec {
    fn declared(name: &'static str, literal: &str, role: FieldRole) -> Self {
        let default = AttrValue::infer(literal);
        Self {
            name,
            ty: default.ty(),
            default,
            role,
        }
    }
}

// ─── Declarations ────────────────────────────────────────────────────────

struct Declaration {
    kind: ShapeKind,
    tag_name: &'static str,
    category: Category,
    attributes: &'static [(&'static str, &'static str)],
    content: Option<&'static str>,
    controls: &'static [(&'static str, &'static str)],
}

/// Drawing-tool fields carried by the canvas root.
pub const CANVAS_CONTROLS: &[(&str, &str)] = &[
    ("mode", "select"),
    ("stroke", "black"),
    ("stroke_width", "3"),
    ("fill", "blue"),
    ("fill_opacity", "0.5"),
];

const DECLARATIONS: &[Declaration] = &[
    Declaration {
        kind: ShapeKind::Canvas,
        tag_name: "svg",
        category: Category::Container,
        attributes: &[("width", "400"), ("height", "300")],
        content: None,
        controls: CANVAS_CONTROLS,
    },
    Declaration {
        kind: ShapeKind::Group,
        tag_name: "g",
        category: Category::Container,
        attributes: &[("transform", "")],
        content: None,
        controls: &[],
    },
    Declaration {
        kind: ShapeKind::Rect,
        tag_name: "rect",
        category: Category::Leaf,
        attributes: &[
            ("x", "10"),
            ("y", "10"),
            ("width", "100"),
            ("height", "50"),
            ("fill", "blue"),
            ("fill-opacity", "0.5"),
            ("stroke", "red"),
            ("stroke-width", "3"),
            ("transform", ""),
        ],
        content: None,
        controls: &[],
    },
    Declaration {
        kind: ShapeKind::Circle,
        tag_name: "circle",
        category: Category::Leaf,
        attributes: &[
            ("cx", "50"),
            ("cy", "110"),
            ("r", "20"),
            ("fill", "red"),
            ("fill-opacity", "0.5"),
            ("stroke", "green"),
            ("stroke-width", "3"),
            ("transform", ""),
        ],
        content: None,
        controls: &[],
    },
    Declaration {
        kind: ShapeKind::Ellipse,
        tag_name: "ellipse",
        category: Category::Leaf,
        attributes: &[
            ("cx", "250"),
            ("cy", "110"),
            ("rx", "20"),
            ("ry", "10"),
            ("fill", "magenta"),
            ("fill-opacity", "0.5"),
            ("stroke", "cyan"),
            ("stroke-width", "3"),
            ("transform", ""),
        ],
        content: None,
        controls: &[],
    },
    Declaration {
        kind: ShapeKind::Line,
        tag_name: "line",
        category: Category::Leaf,
        attributes: &[
            ("x1", "10"),
            ("y1", "200"),
            ("x2", "100"),
            ("y2", "150"),
            ("stroke", "orange"),
            ("stroke-width", "3"),
            ("transform", ""),
        ],
        content: None,
        controls: &[],
    },
    Declaration {
        kind: ShapeKind::Path,
        tag_name: "path",
        category: Category::Leaf,
        attributes: &[
            ("d", "M 10,250 C70,150 200,150 200,250"),
            ("stroke", "black"),
            ("stroke-width", "3"),
            ("fill", "cyan"),
            ("fill-opacity", "0.5"),
            ("transform", ""),
        ],
        content: None,
        controls: &[],
    },
    Declaration {
        kind: ShapeKind::Text,
        tag_name: "text",
        category: Category::Leaf,
        attributes: &[("x", "100"), ("y", "100"), ("fill", "black")],
        content: Some("Hello World!"),
        controls: &[],
    },
];

// ─── Schemas ─────────────────────────────────────────────────────────────

/// The registered, typed schema of one shape kind.
#[derive(Debug, Clone)]
pub struct ShapeSchema {
    pub kind: ShapeKind,
    pub tag_name: &'static str,
    /// Frontend view class: the class name with `Widget` swapped for `View`.
    pub view_name: String,
    pub fertile: bool,
    pub draggable: bool,
    pub has_content: bool,
    /// Attributes in declared order, then content, then control fields.
    fields: Vec<FieldSpec>,
}

impl ShapeSchema {
    fn from_declaration(decl: &Declaration) -> Self {
        let fertile = decl.category == Category::Container;

        let mut fields: Vec<FieldSpec> = decl
            .attributes
            .iter()
            .map(|&(name, literal)| FieldSpec::declared(name, literal, FieldRole::Attribute))
            .collect();
        if let Some(content) = decl.content {
            fields.push(FieldSpec::declared("content", content, FieldRole::Content));
        }
        fields.extend(
            decl.controls
                .iter()
                .map(|&(name, literal)| FieldSpec::declared(name, literal, FieldRole::Control)),
        );

        let class_name = decl.kind.class_name();
        let stem = class_name.strip_suffix("Widget").unwrap_or(class_name);

        Self {
            kind: decl.kind,
            tag_name: decl.tag_name,
            view_name: format!("{stem}View"),
            fertile,
            draggable: !fertile,
            has_content: decl.content.is_some(),
            fields,
        }
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Every synchronized field in canonical order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Only the markup attributes, in declared order.
    pub fn attributes(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.role == FieldRole::Attribute)
    }

    /// Position of a field in [`Self::fields`].
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// All registered shape kinds, indexed by kind.
#[derive(Debug)]
pub struct Registry {
    schemas: Vec<ShapeSchema>,
}

impl Registry {
    pub fn get(&self, kind: ShapeKind) -> &ShapeSchema {
        &self.schemas[kind.index()]
    }

    /// Resolve a frontend class name such as `RectWidget`.
    pub fn lookup(&self, class_name: &str) -> Result<&ShapeSchema, SchemaError> {
        ShapeKind::from_class_name(class_name)
            .map(|kind| self.get(kind))
            .ok_or_else(|| SchemaError::UnknownKind(class_name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeSchema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Build the registry from the static declaration list.
#[must_use]
pub fn register_all() -> Registry {
    let mut schemas: Vec<ShapeSchema> = DECLARATIONS
        .iter()
        .map(ShapeSchema::from_declaration)
        .collect();
    schemas.sort_by_key(|s| s.kind.index());
    log::debug!("registered {} shape kinds", schemas.len());
    Registry { schemas }
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(register_all);

/// The process-wide registry, built on first use.
pub fn registry() -> &'static Registry {
    &REGISTRY
}
