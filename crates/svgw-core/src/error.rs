//! Error types for schema lookup, value coercion, field writes and messages.

use crate::id::NodeId;
use crate::schema::ShapeKind;
use thiserror::Error;

/// A value could not be converted to a field's declared type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoerceError {
    #[error("expected a number, got {0:?}")]
    NotNumeric(String),

    /// JSON booleans, nulls, arrays and objects have no attribute form.
    #[error("unsupported attribute value: {0}")]
    UnsupportedValue(String),
}

/// A shape kind or node could not be resolved for a request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("unknown shape class: {0}")]
    UnknownKind(String),

    #[error("{kind} node {node} cannot contain children")]
    NotFertile { node: NodeId, kind: ShapeKind },

    #[error("no such node: {0}")]
    UnknownNode(NodeId),
}

/// A write to a single synchronized field was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("no such widget: {0}")]
    UnknownOwner(NodeId),

    #[error("{owner} has no field {field:?}")]
    UnknownField { owner: NodeId, field: String },

    #[error("{value:?} is not one of the options of {owner}")]
    NotAnOption { owner: NodeId, value: String },

    #[error("field {field:?} of {owner}: {source}")]
    Coerce {
        owner: NodeId,
        field: String,
        #[source]
        source: CoerceError,
    },
}

/// An inbound message could not be decoded.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can go wrong while handling one inbound message.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
