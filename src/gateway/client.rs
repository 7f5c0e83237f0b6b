//! Outbound gateway operations.
//!
//! [`Gateway`] abstracts every call the bot makes toward the chat platform
//! so command handlers, sessions and the sweeper can be tested against a
//! mock instead of a live connection.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::gateway::types::{ModalSpec, RenderedMessage};

/// Failure of an outbound gateway operation.
///
/// The transport's own error detail is flattened to a string here; callers
/// only decide whether to propagate, retry-never, or swallow.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The target (message, channel or user) no longer exists.
    #[error("gateway target gone: {0}")]
    TargetGone(String),
    /// The recipient cannot be delivered to (blocking, closed DMs).
    #[error("recipient unreachable: {0}")]
    Unreachable(String),
    /// Any other transport failure.
    #[error("gateway send failed: {0}")]
    Send(String),
}

/// Outbound operations toward the chat platform.
///
/// This trait abstracts the transport for easier testing with mocks.
#[automock]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Posts a message and returns the id of the created message.
    async fn send_message(
        &self,
        channel_id: &str,
        message: &RenderedMessage,
    ) -> Result<String, GatewayError>;

    /// Replaces the body and controls of an existing message.
    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        message: &RenderedMessage,
    ) -> Result<(), GatewayError>;

    /// Deletes a message if it still exists.
    async fn delete_message(&self, channel_id: &str, message_id: &str)
    -> Result<(), GatewayError>;

    /// Posts a plain text reply to an existing message.
    async fn send_reply(
        &self,
        channel_id: &str,
        reply_to: &str,
        body: &str,
    ) -> Result<(), GatewayError>;

    /// Opens a modal in response to a just-received interaction.
    async fn open_modal(&self, channel_id: &str, modal: &ModalSpec) -> Result<(), GatewayError>;

    /// Delivers a reminder to a user. Where it lands (channel mention,
    /// direct message) is the transport's routing decision.
    async fn send_reminder(&self, user_id: i64, body: &str) -> Result<(), GatewayError>;

    /// Resolves a user id to a display name, or `None` when the user is
    /// unknown to the platform.
    async fn resolve_user(&self, user_id: i64) -> Option<String>;
}
