//! Inbound event and outbound message types crossing the gateway boundary.

use serde::{Deserialize, Serialize};

/// An event delivered by the gateway transport.
///
/// The bot consumes these from a channel, one spawned handler per event.
/// Channel and message ids are opaque strings owned by the transport; user
/// ids are numeric because they key the persistent stores.
#[derive(Clone, Debug)]
pub enum GatewayEvent {
    /// A plain text message posted in a channel.
    Message(IncomingMessage),
    /// A button press or select choice on a message the bot rendered.
    Component(ComponentEvent),
    /// A submitted modal previously opened for an interaction.
    ModalSubmit(ModalSubmitEvent),
}

/// A text message received from a channel.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Id of the message itself, used as the reply target.
    pub message_id: String,
    /// Numeric id of the author.
    pub user_id: i64,
    /// Display name of the author.
    pub user_name: String,
    /// Raw message text, prefix included.
    pub body: String,
}

/// A button press or select choice on a rendered message.
#[derive(Clone, Debug)]
pub struct ComponentEvent {
    /// Channel holding the message the control belongs to.
    pub channel_id: String,
    /// Message the control belongs to; keys the owning session.
    pub message_id: String,
    /// Numeric id of the interacting user.
    pub user_id: i64,
    /// Id of the pressed control, as rendered in [`Control::id`].
    pub control_id: String,
    /// Chosen value for selects; `None` for plain buttons.
    pub value: Option<String>,
}

/// A submitted modal.
#[derive(Clone, Debug)]
pub struct ModalSubmitEvent {
    /// Channel holding the message the modal was opened from.
    pub channel_id: String,
    /// Message the opening session is bound to.
    pub message_id: String,
    /// Numeric id of the submitting user.
    pub user_id: i64,
    /// Id of the modal, as given in [`ModalSpec::id`].
    pub modal_id: String,
    /// The single text input value.
    pub value: String,
}

/// A message body plus its interactive controls, ready for the transport.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedMessage {
    /// Markdown-ish message text.
    pub body: String,
    /// Interactive controls in render order. Empty for plain messages.
    pub controls: Vec<Control>,
}

impl RenderedMessage {
    /// A plain text message with no controls.
    pub fn text(body: impl Into<String>) -> Self {
        RenderedMessage {
            body: body.into(),
            controls: Vec::new(),
        }
    }
}

/// A single interactive control attached to a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Stable id echoed back in [`ComponentEvent::control_id`].
    pub id: String,
    /// Label or glyph shown on the control.
    pub label: String,
    /// Disabled controls are rendered but not pressable. Sessions use this
    /// to reflect unavailable navigation instead of silently ignoring it.
    pub disabled: bool,
    /// Button or select behavior.
    pub kind: ControlKind,
}

impl Control {
    /// A pressable button.
    pub fn button(id: impl Into<String>, label: impl Into<String>) -> Self {
        Control {
            id: id.into(),
            label: label.into(),
            disabled: false,
            kind: ControlKind::Button,
        }
    }

    /// A single-choice select with the given options.
    pub fn select(
        id: impl Into<String>,
        label: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Control {
            id: id.into(),
            label: label.into(),
            disabled: false,
            kind: ControlKind::Select { options },
        }
    }

    /// Same control with the disabled flag set.
    pub fn disable(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// The interactive behavior of a [`Control`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ControlKind {
    Button,
    Select { options: Vec<String> },
}

/// A modal with a single text input, opened in response to an interaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModalSpec {
    /// Stable id echoed back in [`ModalSubmitEvent::modal_id`].
    pub id: String,
    /// Modal window title.
    pub title: String,
    /// Label of the text input.
    pub label: String,
    /// Placeholder documenting the accepted formats.
    pub placeholder: String,
}
