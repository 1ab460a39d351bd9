//! The capability shared by every widget model: an id, the name of the
//! frontend view that renders it, and a snapshot of its synchronized state.

use svgw_core::{NodeId, ShapeNode};

pub trait Widget {
    fn id(&self) -> NodeId;

    fn view_name(&self) -> &str;

    /// Synchronized fields as a JSON object, including `_view_name`.
    fn state(&self) -> serde_json::Value;
}

impl Widget for ShapeNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn view_name(&self) -> &str {
        &self.schema().view_name
    }

    fn state(&self) -> serde_json::Value {
        let mut state = serde_json::Map::new();
        state.insert("_view_name".into(), self.view_name().into());
        for (field, value) in self.fields() {
            state.insert(field.name.to_string(), value.to_json());
        }
        serde_json::Value::Object(state)
    }
}
