//! Emitter: ShapeTree → SVG markup.
//!
//! Mirrors what a view produces for its element: the tag, every markup
//! attribute in declared order, text content for kinds that have it, and
//! children in paint order. Canvas control fields are not rendered.

use crate::model::ShapeTree;
use crate::schema::FieldRole;
use petgraph::graph::NodeIndex;
use std::fmt::Write;

/// Emit the subtree rooted at `idx`.
#[must_use]
pub fn emit_markup(tree: &ShapeTree, idx: NodeIndex) -> String {
    let mut out = String::with_capacity(256);
    emit_node(&mut out, tree, idx);
    out
}

/// Emit the whole tree.
#[must_use]
pub fn emit_document(tree: &ShapeTree) -> String {
    emit_markup(tree, tree.root)
}

fn emit_node(out: &mut String, tree: &ShapeTree, idx: NodeIndex) {
    let node = &tree.graph[idx];
    let tag = node.schema().tag_name;

    let _ = write!(out, "<{tag}");
    for (field, value) in node.fields() {
        if field.role != FieldRole::Attribute {
            continue;
        }
        let _ = write!(out, " {}=\"{}\"", field.name, escape(&value.to_string(), true));
    }
    out.push('>');

    if let Some(content) = node.content() {
        out.push_str(&escape(content, false));
    }
    for child in tree.children(idx) {
        emit_node(out, tree, child);
    }

    let _ = write!(out, "</{tag}>");
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
