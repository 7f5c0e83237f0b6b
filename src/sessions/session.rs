//! Session lifecycle and effect production.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::BotError;
use crate::gateway::{ComponentEvent, ModalSpec, ModalSubmitEvent, RenderedMessage};
use crate::sessions::view::{View, ViewAction};
use crate::tasks::TaskDraft;

/// Default session timeout, matching the interactive views' attention
/// span: six minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(360);

/// Lifecycle states of a session.
///
/// `Stopped` and `Expired` are terminal: no event mutates a session once
/// it reached either. Event handling is serialized per session by the
/// manager, so there is no observable in-between state while a render is
/// being produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Built but not yet bound to a message.
    Created,
    /// Bound to a rendered message and consuming events.
    Active,
    /// Ended by the stop control or a terminal submission.
    Stopped,
    /// Ended by the timeout.
    Expired,
}

/// An event aimed at a session, component or modal.
#[derive(Clone, Copy, Debug)]
pub enum SessionEvent<'a> {
    Component(&'a ComponentEvent),
    Modal(&'a ModalSubmitEvent),
}

impl SessionEvent<'_> {
    /// The interacting user.
    pub fn user_id(&self) -> i64 {
        match self {
            SessionEvent::Component(event) => event.user_id,
            SessionEvent::Modal(event) => event.user_id,
        }
    }
}

/// Predicate deciding whether an event reaches the view at all.
pub type EventGate = Arc<dyn Fn(&SessionEvent<'_>) -> bool + Send + Sync>;

/// Per-session configuration.
#[derive(Clone)]
pub struct SessionOptions {
    /// How long the session stays alive without events.
    pub timeout: Duration,
    /// Whether the bound message is deleted when the timeout expires.
    pub delete_on_timeout: bool,
    /// Optional interaction gate; events it rejects are discarded with no
    /// state change and no render.
    pub allow_event: Option<EventGate>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            timeout: DEFAULT_TIMEOUT,
            delete_on_timeout: false,
            allow_event: None,
        }
    }
}

impl SessionOptions {
    /// Restricts interaction to the command's original invoker, the
    /// typical gate.
    pub fn invoker_only(mut self, user_id: i64) -> Self {
        self.allow_event = Some(Arc::new(move |event| event.user_id() == user_id));
        self
    }
}

/// A side effect the session asks its manager to execute.
#[derive(Debug)]
pub enum SessionEffect {
    /// Re-render the bound message.
    Edit(RenderedMessage),
    /// Open a modal for the triggering interaction.
    OpenModal(ModalSpec),
    /// Reply to the bound message with an error or notice.
    Reply(String),
    /// Delete the bound message.
    Delete,
    /// Hand the submitted draft to the caller for persistence.
    Submit(TaskDraft),
}

/// The lifecycle wrapper around a [`View`].
///
/// Pure: every method mutates local state and returns the effects to
/// execute, leaving gateway I/O to the manager.
pub struct Session {
    view: Box<dyn View>,
    options: SessionOptions,
    state: SessionState,
    channel_id: String,
    message_id: Option<String>,
    created_at: Instant,
}

impl Session {
    pub fn new(channel_id: impl Into<String>, view: Box<dyn View>, options: SessionOptions) -> Self {
        Session {
            view,
            options,
            state: SessionState::Created,
            channel_id: channel_id.into(),
            message_id: None,
            created_at: Instant::now(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// The bound message id, once started.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Renders the current view state.
    pub fn render(&self) -> RenderedMessage {
        self.view.render()
    }

    /// Binds the session to its rendered message and activates it.
    ///
    /// # Errors
    ///
    /// [`BotError::Internal`] when called twice; the binding is set once
    /// and immutable afterward.
    pub fn bind(&mut self, message_id: impl Into<String>) -> Result<(), BotError> {
        if self.message_id.is_some() {
            return Err(BotError::Internal(
                "session is already bound to a message".to_string(),
            ));
        }
        self.message_id = Some(message_id.into());
        self.state = SessionState::Active;
        Ok(())
    }

    /// Feeds an event through the gate and the view, returning the
    /// effects to execute.
    ///
    /// Terminal sessions and gated-out events produce no effects and no
    /// state change. A [`ViewAction::Stop`] re-renders once (the view has
    /// disabled its controls by then) and moves to `Stopped`; a
    /// submission stays `Active` so a failed persistence can be retried.
    ///
    /// # Errors
    ///
    /// [`BotError::Internal`] when the session was never bound; events
    /// cannot precede `bind` in correct operation.
    pub fn on_event(&mut self, event: &SessionEvent<'_>) -> Result<Vec<SessionEffect>, BotError> {
        if self.message_id.is_none() {
            return Err(BotError::Internal(
                "session received an event before being bound".to_string(),
            ));
        }
        if self.state != SessionState::Active {
            return Ok(Vec::new());
        }
        if let Some(gate) = &self.options.allow_event
            && !gate(event)
        {
            return Ok(Vec::new());
        }

        let action = match event {
            SessionEvent::Component(component) => self.view.handle(component),
            SessionEvent::Modal(modal) => self.view.handle_modal(modal),
        };

        Ok(match action {
            ViewAction::None => Vec::new(),
            ViewAction::Render => vec![SessionEffect::Edit(self.view.render())],
            ViewAction::OpenModal(spec) => vec![SessionEffect::OpenModal(spec)],
            ViewAction::Reject(message) => vec![SessionEffect::Reply(message)],
            ViewAction::Stop => {
                self.state = SessionState::Stopped;
                vec![SessionEffect::Edit(self.view.render())]
            }
            ViewAction::Submit(draft) => vec![SessionEffect::Submit(draft)],
        })
    }

    /// Expires the session after its timeout elapsed without events.
    pub fn on_timeout(&mut self) -> Vec<SessionEffect> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        self.state = SessionState::Expired;
        if self.options.delete_on_timeout {
            vec![SessionEffect::Delete]
        } else {
            Vec::new()
        }
    }

    /// Marks a submission as persisted: one final render and `Stopped`.
    pub fn finish(&mut self, final_message: RenderedMessage) -> Vec<SessionEffect> {
        self.state = SessionState::Stopped;
        vec![SessionEffect::Edit(final_message)]
    }
}
