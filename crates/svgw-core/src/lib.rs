pub mod emitter;
pub mod error;
pub mod export;
pub mod id;
pub mod message;
pub mod model;
pub mod schema;
pub mod value;

pub use emitter::{emit_document, emit_markup};
pub use error::{CoerceError, DispatchError, FieldError, MessageError, SchemaError};
pub use export::{RENDER_MODULE, SchemaVersion, VERSION, export_schema, startup_script};
pub use id::NodeId;
pub use message::{Comm, Handled, InboundMessage, OutboundMessage, Outbox};
pub use model::{ChildReport, ShapeNode, ShapeTree};
pub use schema::{FieldRole, FieldSpec, Registry, ShapeKind, ShapeSchema, register_all, registry};
pub use value::{AttrType, AttrValue};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
