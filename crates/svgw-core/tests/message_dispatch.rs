//! Integration tests: comm messages driving the shape tree.
//!
//! Feeds raw JSON messages through `ShapeTree::handle_json` the way the
//! transport delivers them and checks the resulting tree and markup.

use pretty_assertions::assert_eq;
use svgw_core::{
    AttrValue, DispatchError, Handled, NodeId, Outbox, SchemaError, ShapeKind, ShapeTree,
    emit_document, registry,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn new_message(class_name: &str, attributes: serde_json::Value) -> String {
    serde_json::json!({
        "message_type": "new",
        "class_name": class_name,
        "attributes": attributes,
    })
    .to_string()
}

fn create(
    tree: &mut ShapeTree,
    parent: NodeId,
    class_name: &str,
    attributes: serde_json::Value,
) -> NodeId {
    match tree.handle_json(parent, &new_message(class_name, attributes)) {
        Ok(Handled::ChildCreated(report)) => report.id,
        other => panic!("expected a new child, got {other:?}"),
    }
}

// ─── Numeric fields ─────────────────────────────────────────────────────

#[test]
fn numeric_fields_stay_numeric_across_updates() {
    init_logger();
    let mut tree = ShapeTree::canvas();
    let root = tree.root_id();
    let attrs = serde_json::json!({ "x": "12.5", "width": 80 });
    let rect = create(&mut tree, root, "RectWidget", attrs);

    let node = tree.get_mut(rect).unwrap();
    node.set("x", "40".into()).unwrap();
    node.set("y", AttrValue::Number(7.0)).unwrap();
    assert!(node.set("height", "tall".into()).is_err());

    let numeric: Vec<_> = node
        .fields()
        .filter(|(field, _)| field.ty == svgw_core::AttrType::Number)
        .collect();
    assert!(!numeric.is_empty());
    for (field, value) in numeric {
        assert!(value.as_number().is_some(), "{} lost its number type", field.name);
    }
    assert_eq!(node.number("x"), Some(40.0));
    assert_eq!(node.number("width"), Some(80.0));
    assert_eq!(node.number("height"), Some(50.0));
}

// ─── Tree shape ─────────────────────────────────────────────────────────

#[test]
fn children_arrive_in_message_order() {
    let mut tree = ShapeTree::canvas();
    let root = tree.root_id();
    let classes = [
        "LineWidget",
        "TextWidget",
        "GroupWidget",
        "PathWidget",
        "EllipseWidget",
    ];
    let ids: Vec<NodeId> = classes
        .iter()
        .map(|class| create(&mut tree, root, class, serde_json::json!({})))
        .collect();

    let kinds: Vec<ShapeKind> = tree.children_of(root).iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ShapeKind::Line,
            ShapeKind::Text,
            ShapeKind::Group,
            ShapeKind::Path,
            ShapeKind::Ellipse
        ]
    );
    let child_ids: Vec<NodeId> = tree.children_of(root).iter().map(|n| n.id).collect();
    assert_eq!(child_ids, ids);
}

#[test]
fn nested_groups_render_in_order() {
    let mut tree = ShapeTree::canvas();
    let root = tree.root_id();
    let attrs = serde_json::json!({ "transform": "scale(2)" });
    let group = create(&mut tree, root, "GroupWidget", attrs);
    create(&mut tree, group, "CircleWidget", serde_json::json!({ "r": 5 }));
    create(&mut tree, root, "TextWidget", serde_json::json!({ "content": "a<b" }));

    let markup = emit_document(&tree);
    let g = markup.find("<g transform=\"scale(2)\">").unwrap();
    let circle = markup.find("<circle").unwrap();
    let text = markup.find("<text").unwrap();
    assert!(g < circle && circle < text);
    assert!(markup.contains(" r=\"5\""));
    assert!(markup.contains(">a&lt;b</text>"));
    assert!(!markup.contains("mode="));
}

// ─── Rejections ─────────────────────────────────────────────────────────

#[test]
fn rejected_messages_leave_the_tree_alone() {
    init_logger();
    let mut tree = ShapeTree::canvas();
    let root = tree.root_id();
    let rect = create(&mut tree, root, "RectWidget", serde_json::json!({}));
    let before = tree.len();

    let err = tree
        .handle_json(root, &new_message("StarWidget", serde_json::json!({})))
        .unwrap_err();
    assert!(matches!(err, DispatchError::Schema(SchemaError::UnknownKind(_))));

    let err = tree
        .handle_json(rect, &new_message("CircleWidget", serde_json::json!({})))
        .unwrap_err();
    assert!(matches!(err, DispatchError::Schema(SchemaError::NotFertile { .. })));

    let err = tree
        .handle_json(root, r#"{"message_type":"new","attributes":{}}"#)
        .unwrap_err();
    assert!(matches!(err, DispatchError::Message(_)));

    let err = tree
        .handle_json(NodeId::intern("gone_9"), r#"{"message_type":"html","html":""}"#)
        .unwrap_err();
    assert!(matches!(err, DispatchError::Schema(SchemaError::UnknownNode(_))));

    assert_eq!(tree.len(), before);
}

#[test]
fn unknown_message_types_are_ignored() {
    let mut tree = ShapeTree::canvas();
    let root = tree.root_id();
    let handled = tree
        .handle_json(root, r#"{"message_type":"resize","width":10}"#)
        .unwrap();
    assert_eq!(handled, Handled::Ignored);
    assert_eq!(tree.len(), 1);
}

// ─── Markup round trip ──────────────────────────────────────────────────

#[test]
fn markup_request_and_reply() {
    let mut tree = ShapeTree::canvas();
    let root = tree.root_id();
    let mut outbox = Outbox::new();

    tree.request_markup(root, &mut outbox).unwrap();
    tree.request_markup(root, &mut outbox).unwrap();
    assert_eq!(outbox.len(), 2);
    let sent = outbox.drain();
    assert!(sent.iter().all(|(target, _)| *target == root));
    assert!(outbox.is_empty());

    let reply = serde_json::json!({ "message_type": "html", "html": "<svg></svg>" }).to_string();
    assert_eq!(
        tree.handle_json(root, &reply).unwrap(),
        Handled::Markup("<svg></svg>".into())
    );
}

#[test]
fn every_registered_kind_can_be_created_under_the_canvas() {
    let mut tree = ShapeTree::canvas();
    let root = tree.root_id();
    let creatable: Vec<_> = registry()
        .iter()
        .filter(|s| s.kind != ShapeKind::Canvas)
        .map(|s| s.class_name())
        .collect();
    for class in &creatable {
        create(&mut tree, root, class, serde_json::json!({}));
    }
    assert_eq!(tree.children_of(root).len(), creatable.len());
}
