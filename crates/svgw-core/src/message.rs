//! Comm messages exchanged between shape nodes and the rendering side.
//!
//! Inbound messages carry a `message_type` tag:
//!
//! | `message_type` | Payload | Accepted by |
//! |---|---|---|
//! | `html` | `html: string` | every node |
//! | `new` | `class_name: string`, `attributes: {name: string or number}` | fertile nodes |
//!
//! Any other tag is ignored. The only outbound message is `get_html`, whose
//! reply arrives later as an unrelated `html` message.

use crate::error::{DispatchError, MessageError, SchemaError};
use crate::id::NodeId;
use crate::model::{ChildReport, ShapeTree};
use serde::{Deserialize, Serialize};

/// A message from the rendering side to one node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Rendered markup of the node, in reply to `get_html`.
    Html { html: String },
    /// Request to create a child shape.
    New {
        class_name: String,
        attributes: serde_json::Map<String, serde_json::Value>,
    },
    #[serde(other)]
    Other,
}

impl InboundMessage {
    pub fn from_json(json: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, MessageError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// A message from a node to the rendering side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Ask the view for the element's `outerHTML`.
    GetHtml,
}

/// Outbound transport. The host framework routes each message to the view
/// of `target`.
pub trait Comm {
    fn send(&mut self, target: NodeId, message: OutboundMessage);
}

/// A `Comm` that queues messages until the transport drains them.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: Vec<(NodeId, OutboundMessage)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> Vec<(NodeId, OutboundMessage)> {
        std::mem::take(&mut self.queue)
    }
}

impl Comm for Outbox {
    fn send(&mut self, target: NodeId, message: OutboundMessage) {
        self.queue.push((target, message));
    }
}

/// What handling an inbound message did.
#[derive(Debug, Clone, PartialEq)]
pub enum Handled {
    /// Markup reported by the view. Not stored on the node.
    Markup(String),
    ChildCreated(ChildReport),
    Ignored,
}

impl ShapeTree {
    /// Dispatch one decoded message addressed to `target`.
    pub fn handle_message(
        &mut self,
        target: NodeId,
        message: InboundMessage,
    ) -> Result<Handled, SchemaError> {
        if self.index_of(target).is_none() {
            return Err(SchemaError::UnknownNode(target));
        }
        match message {
            InboundMessage::Html { html } => {
                log::info!(target: "svgw::html", "{html}");
                Ok(Handled::Markup(html))
            }
            InboundMessage::New {
                class_name,
                attributes,
            } => self
                .apply_child(target, &class_name, &attributes)
                .map(Handled::ChildCreated),
            InboundMessage::Other => {
                log::debug!("{target}: ignoring message with unknown message_type");
                Ok(Handled::Ignored)
            }
        }
    }

    /// Decode and dispatch a raw JSON message. Failures are logged and
    /// returned; the tree is never left half-modified.
    pub fn handle_json(&mut self, target: NodeId, json: &str) -> Result<Handled, DispatchError> {
        let message = InboundMessage::from_json(json).inspect_err(|err| {
            log::warn!("{target}: dropping message: {err}");
        })?;
        self.handle_message(target, message).map_err(|err| {
            log::warn!("{target}: dropping message: {err}");
            DispatchError::from(err)
        })
    }

    /// Ask the view of `node` for its markup. Fire and forget.
    pub fn request_markup(&self, node: NodeId, comm: &mut impl Comm) -> Result<(), SchemaError> {
        if self.index_of(node).is_none() {
            return Err(SchemaError::UnknownNode(node));
        }
        comm.send(node, OutboundMessage::GetHtml);
        Ok(())
    }
}
