//! The view abstraction rendered inside a session.

use crate::gateway::{ComponentEvent, ModalSpec, ModalSubmitEvent, RenderedMessage};
use crate::tasks::TaskDraft;

/// A pure per-message UI state machine.
///
/// Views never talk to the gateway; they mutate their own state and tell
/// the session what should happen next through a [`ViewAction`]. The
/// session manager executes the side effects.
pub trait View: Send {
    /// Renders the current state into a message body plus controls.
    fn render(&self) -> RenderedMessage;

    /// Reacts to a button press or select choice.
    fn handle(&mut self, event: &ComponentEvent) -> ViewAction;

    /// Reacts to a modal submission previously opened by this view.
    fn handle_modal(&mut self, _event: &ModalSubmitEvent) -> ViewAction {
        ViewAction::None
    }
}

/// What a view wants to happen after handling an event.
#[derive(Debug)]
pub enum ViewAction {
    /// Nothing: no state change and no re-render.
    None,
    /// State changed; re-render the bound message.
    Render,
    /// Open a modal for the interaction that caused this event.
    OpenModal(ModalSpec),
    /// The input was invalid; tell the user and keep the current state.
    Reject(String),
    /// Disable everything, render once more, and end the session.
    Stop,
    /// Terminal submission: hand the accumulated draft to the caller.
    Submit(TaskDraft),
}
