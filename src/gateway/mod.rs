//! Gateway boundary between the bot and its chat platform.
//!
//! The transport itself (websocket session, authentication, retries) is an
//! external collaborator; this module only specifies the seam the rest of
//! the bot talks through:
//!
//! - [`Gateway`]: the outbound trait (send, edit, delete, reply, reminders,
//!   user resolution), mockable in tests.
//! - [`GatewayEvent`]: the inbound event enum (messages, component
//!   interactions, modal submissions) the bot consumes from a channel.
//! - [`RenderedMessage`] and [`Control`]: the wire model interactive
//!   sessions render into.
//!
//! A minimal [`console`] transport is included for local development; it
//! prints outbound traffic and turns stdin lines into events.

mod client;
pub mod console;
mod types;

pub use crate::gateway::client::{Gateway, GatewayError, MockGateway};
pub use crate::gateway::types::{
    ComponentEvent, Control, ControlKind, GatewayEvent, IncomingMessage, ModalSpec,
    ModalSubmitEvent, RenderedMessage,
};
