//! Shape nodes and the tree they live in.
//!
//! The tree is a `StableDiGraph` with parent→child edges, owned by whoever
//! created the root (normally the builder panel). Nodes are never removed, so
//! children sorted by `NodeIndex` come back in the order they arrived, which is
//! also their paint order.

use crate::error::{FieldError, SchemaError};
use crate::id::NodeId;
use crate::schema::{FieldSpec, ShapeKind, ShapeSchema, registry};
use crate::value::AttrValue;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Shape Node ──────────────────────────────────────────────────────────

/// One shape instance: its kind and current field values.
///
/// `values` is aligned with the kind's [`ShapeSchema::fields`], so the set of
/// keys a node exposes is always exactly its schema's.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    pub id: NodeId,
    pub kind: ShapeKind,
    values: SmallVec<[AttrValue; 12]>,
}

impl ShapeNode {
    /// Create a node with a fresh id and the kind's default values.
    pub fn new(kind: ShapeKind) -> Self {
        let id = NodeId::with_prefix(registry().get(kind).tag_name);
        Self::with_id(id, kind)
    }

    pub fn with_id(id: NodeId, kind: ShapeKind) -> Self {
        let values = registry()
            .get(kind)
            .fields()
            .iter()
            .map(|f| f.default.clone())
            .collect();
        Self { id, kind, values }
    }

    pub fn schema(&self) -> &'static ShapeSchema {
        registry().get(self.kind)
    }

    pub fn is_fertile(&self) -> bool {
        self.schema().fertile
    }

    pub fn get(&self, field: &str) -> Option<&AttrValue> {
        self.schema().position(field).map(|i| &self.values[i])
    }

    /// Numeric value of a field, if the field exists and is numeric.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(AttrValue::as_number)
    }

    /// Text value of a field, if the field exists and is text.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(AttrValue::as_text)
    }

    /// Text content, for kinds that carry it.
    pub fn content(&self) -> Option<&str> {
        if self.schema().has_content {
            self.text("content")
        } else {
            None
        }
    }

    /// Write a field, coercing to its declared type.
    /// Returns whether the stored value changed.
    pub fn set(&mut self, field: &str, value: AttrValue) -> Result<bool, FieldError> {
        let schema = self.schema();
        let Some(pos) = schema.position(field) else {
            return Err(FieldError::UnknownField {
                owner: self.id,
                field: field.to_string(),
            });
        };
        let coerced = schema.fields()[pos]
            .ty
            .coerce(value)
            .map_err(|source| FieldError::Coerce {
                owner: self.id,
                field: field.to_string(),
                source,
            })?;
        if self.values[pos] == coerced {
            return Ok(false);
        }
        self.values[pos] = coerced;
        Ok(true)
    }

    /// Every field with its current value, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldSpec, &AttrValue)> {
        self.schema().fields().iter().zip(self.values.iter())
    }
}

// ─── Shape Tree ──────────────────────────────────────────────────────────

/// Outcome of a successful child creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildReport {
    pub id: NodeId,
    pub index: NodeIndex,
    /// Attributes that were dropped because they could not be applied.
    pub skipped: Vec<FieldError>,
}

/// A tree of shape nodes rooted at a single container.
#[derive(Debug, Clone)]
pub struct ShapeTree {
    pub graph: StableDiGraph<ShapeNode, ()>,
    pub root: NodeIndex,
    id_index: HashMap<NodeId, NodeIndex>,
}

impl ShapeTree {
    /// A tree holding a single canvas root.
    #[must_use]
    pub fn canvas() -> Self {
        Self::with_root(ShapeNode::new(ShapeKind::Canvas))
    }

    #[must_use]
    pub fn with_root(root: ShapeNode) -> Self {
        let mut graph = StableDiGraph::new();
        let id = root.id;
        let root = graph.add_node(root);
        let mut id_index = HashMap::new();
        id_index.insert(id, root);
        Self {
            graph,
            root,
            id_index,
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.graph[self.root].id
    }

    pub fn root_node(&self) -> &ShapeNode {
        &self.graph[self.root]
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&ShapeNode> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ShapeNode> {
        self.index_of(id).map(|idx| &mut self.graph[idx])
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of a node in arrival order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Children of a node by id, in arrival order. Empty for unknown ids.
    pub fn children_of(&self, id: NodeId) -> Vec<&ShapeNode> {
        self.index_of(id)
            .map(|idx| {
                self.children(idx)
                    .into_iter()
                    .map(|c| &self.graph[c])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append a node under `parent`. The caller checks fertility.
    fn append(&mut self, parent: NodeIndex, node: ShapeNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.id_index.insert(id, idx);
        idx
    }

    /// Create a child of kind `class_name` under `parent`, apply `attrs`
    /// over its defaults, and append it after the existing children.
    ///
    /// Fails without touching the tree when the parent is unknown or a leaf,
    /// or when the class name is not registered. Attributes that are not in
    /// the kind's schema or cannot be coerced are skipped one by one; they do
    /// not abort the creation and are listed in [`ChildReport::skipped`].
    pub fn apply_child(
        &mut self,
        parent: NodeId,
        class_name: &str,
        attrs: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ChildReport, SchemaError> {
        let parent_idx = self
            .index_of(parent)
            .ok_or(SchemaError::UnknownNode(parent))?;
        let parent_kind = self.graph[parent_idx].kind;
        if !registry().get(parent_kind).fertile {
            return Err(SchemaError::NotFertile {
                node: parent,
                kind: parent_kind,
            });
        }
        let schema = registry().lookup(class_name)?;

        let mut child = ShapeNode::new(schema.kind);
        let owner = child.id;
        let mut skipped = Vec::new();
        for (name, raw) in attrs {
            let applied = AttrValue::from_json(raw)
                .map_err(|source| FieldError::Coerce {
                    owner,
                    field: name.clone(),
                    source,
                })
                .and_then(|value| child.set(name, value));
            if let Err(err) = applied {
                log::warn!("skipping attribute on new {class_name}: {err}");
                skipped.push(err);
            }
        }

        let id = child.id;
        let index = self.append(parent_idx, child);
        log::debug!("created {id} ({class_name}) under {parent}");
        Ok(ChildReport { id, index, skipped })
    }
}
