//! Session registry and gateway-side effect execution.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;

use crate::error::BotError;
use crate::gateway::{ComponentEvent, Gateway, ModalSubmitEvent, RenderedMessage};
use crate::sessions::session::{Session, SessionEffect, SessionEvent, SessionOptions, SessionState};
use crate::sessions::view::View;
use crate::tasks::TaskDraft;

/// A submitted draft together with the session that produced it.
#[derive(Debug)]
pub struct Submission {
    pub draft: TaskDraft,
    pub channel_id: String,
    pub message_id: String,
    pub user_id: i64,
}

struct Slot {
    session: Arc<Mutex<Session>>,
    timeout: JoinHandle<()>,
}

type SlotMap = Arc<Mutex<HashMap<String, Slot>>>;

/// Owns every live session, keyed by bound message id.
///
/// Events for the same session are serialized through the session's own
/// lock; sessions do not block one another. The manager also arms one
/// timeout task per session, re-armed after every accepted event and
/// aborted when the session ends.
pub struct SessionManager {
    gateway: Arc<dyn Gateway>,
    slots: SlotMap,
}

impl SessionManager {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        SessionManager {
            gateway,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of sessions currently live.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    /// Renders a view, posts it, and starts the session bound to the
    /// created message. Returns the bound message id.
    pub async fn open(
        &self,
        channel_id: &str,
        view: Box<dyn View>,
        options: SessionOptions,
    ) -> Result<String, BotError> {
        let mut session = Session::new(channel_id, view, options);
        let message_id = self
            .gateway
            .send_message(channel_id, &session.render())
            .await
            .map_err(|e| BotError::Internal(format!("first render failed: {e}")))?;
        session.bind(&message_id)?;

        let timeout = self.arm_timeout(&message_id, session.options().timeout);
        self.slots.lock().await.insert(
            message_id.clone(),
            Slot {
                session: Arc::new(Mutex::new(session)),
                timeout,
            },
        );

        debug!("session opened on message {}", message_id);
        Ok(message_id)
    }

    /// Routes a component event to the session bound to its message.
    ///
    /// Returns a submission when the event completed the session's form.
    /// Events for unknown messages are ignored.
    pub async fn handle_component(
        &self,
        event: &ComponentEvent,
    ) -> Result<Option<Submission>, BotError> {
        self.handle_event(
            &event.message_id,
            SessionEvent::Component(event),
            &event.channel_id,
            event.user_id,
        )
        .await
    }

    /// Routes a modal submission to the session bound to its message.
    pub async fn handle_modal(
        &self,
        event: &ModalSubmitEvent,
    ) -> Result<Option<Submission>, BotError> {
        self.handle_event(
            &event.message_id,
            SessionEvent::Modal(event),
            &event.channel_id,
            event.user_id,
        )
        .await
    }

    /// Finishes a session whose submission was persisted: renders the
    /// confirmation and removes the session.
    pub async fn complete(&self, message_id: &str, final_message: RenderedMessage) {
        let slot = self.slots.lock().await.remove(message_id);
        let Some(slot) = slot else {
            return;
        };
        slot.timeout.abort();

        let mut session = slot.session.lock().await;
        let channel_id = session.channel_id().to_string();
        for effect in session.finish(final_message) {
            self.apply(&channel_id, message_id, effect).await;
        }
    }

    async fn handle_event(
        &self,
        message_id: &str,
        event: SessionEvent<'_>,
        channel_id: &str,
        user_id: i64,
    ) -> Result<Option<Submission>, BotError> {
        // Fetch the session handle under the map lock, process under the
        // session's own lock so independent sessions stay concurrent.
        let session = match self.slots.lock().await.get(message_id) {
            Some(slot) => Arc::clone(&slot.session),
            None => return Ok(None),
        };

        let (effects, state) = {
            let mut session = session.lock().await;
            let effects = session.on_event(&event)?;
            (effects, session.state())
        };

        let mut submission = None;
        for effect in effects {
            match effect {
                SessionEffect::Submit(draft) => {
                    submission = Some(Submission {
                        draft,
                        channel_id: channel_id.to_string(),
                        message_id: message_id.to_string(),
                        user_id,
                    });
                }
                other => self.apply(channel_id, message_id, other).await,
            }
        }

        if state == SessionState::Active {
            self.rearm_timeout(message_id).await;
        } else {
            self.remove(message_id).await;
        }

        Ok(submission)
    }

    async fn apply(&self, channel_id: &str, message_id: &str, effect: SessionEffect) {
        let result = match effect {
            SessionEffect::Edit(message) => {
                self.gateway
                    .edit_message(channel_id, message_id, &message)
                    .await
            }
            SessionEffect::OpenModal(spec) => self.gateway.open_modal(channel_id, &spec).await,
            SessionEffect::Reply(body) => {
                self.gateway.send_reply(channel_id, message_id, &body).await
            }
            SessionEffect::Delete => self.gateway.delete_message(channel_id, message_id).await,
            SessionEffect::Submit(_) => unreachable!("submissions are returned, not applied"),
        };
        if let Err(e) = result {
            warn!("session effect on message {} failed: {}", message_id, e);
        }
    }

    async fn remove(&self, message_id: &str) {
        if let Some(slot) = self.slots.lock().await.remove(message_id) {
            slot.timeout.abort();
            debug!("session on message {} closed", message_id);
        }
    }

    async fn rearm_timeout(&self, message_id: &str) {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.get_mut(message_id) {
            slot.timeout.abort();
            let timeout = {
                let session = Arc::clone(&slot.session);
                let duration = {
                    // The options never change after creation; a blocking
                    // read here would deadlock against handle_event, so
                    // use try_lock with the default as fallback.
                    match session.try_lock() {
                        Ok(session) => session.options().timeout,
                        Err(_) => SessionOptions::default().timeout,
                    }
                };
                self.spawn_timeout(message_id.to_string(), duration)
            };
            slot.timeout = timeout;
        }
    }

    fn arm_timeout(&self, message_id: &str, duration: std::time::Duration) -> JoinHandle<()> {
        self.spawn_timeout(message_id.to_string(), duration)
    }

    fn spawn_timeout(
        &self,
        message_id: String,
        duration: std::time::Duration,
    ) -> JoinHandle<()> {
        let slots = Arc::clone(&self.slots);
        let gateway = Arc::clone(&self.gateway);

        tokio::spawn(async move {
            time::sleep(duration).await;

            let slot = slots.lock().await.remove(&message_id);
            let Some(slot) = slot else {
                return;
            };

            let mut session = slot.session.lock().await;
            let channel_id = session.channel_id().to_string();
            for effect in session.on_timeout() {
                if let SessionEffect::Delete = effect {
                    if let Err(e) = gateway.delete_message(&channel_id, &message_id).await {
                        debug!("timeout cleanup of message {} failed: {}", message_id, e);
                    }
                }
            }
            debug!(
                "session on message {} expired after {:?}",
                message_id,
                session.created_at().elapsed()
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::sessions::paginator::Paginator;
    use crate::sessions::panel::TaskPanel;
    use std::time::Duration;

    fn create_test_paginator() -> Box<Paginator<usize>> {
        Box::new(Paginator::new(
            (0..12).collect(),
            5,
            Box::new(|_, items: &[usize]| format!("{items:?}")),
        ))
    }

    fn component(message_id: &str, user_id: i64, control_id: &str) -> ComponentEvent {
        ComponentEvent {
            channel_id: "chan".to_string(),
            message_id: message_id.to_string(),
            user_id,
            control_id: control_id.to_string(),
            value: None,
        }
    }

    #[tokio::test]
    async fn test_open_binds_and_tracks_session() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .times(1)
            .returning(|_, _| Ok("m1".to_string()));

        let manager = SessionManager::new(Arc::new(gateway));
        let message_id = manager
            .open("chan", create_test_paginator(), SessionOptions::default())
            .await
            .unwrap();

        assert_eq!(message_id, "m1");
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_component_event_rerenders() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .returning(|_, _| Ok("m1".to_string()));
        gateway
            .expect_edit_message()
            .withf(|_, message_id, message| message_id == "m1" && message.body.contains("5"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let manager = SessionManager::new(Arc::new(gateway));
        manager
            .open("chan", create_test_paginator(), SessionOptions::default())
            .await
            .unwrap();

        let submission = manager
            .handle_component(&component("m1", 1, "next"))
            .await
            .unwrap();
        assert!(submission.is_none());
    }

    #[tokio::test]
    async fn test_event_for_unknown_message_is_ignored() {
        let gateway = MockGateway::new();
        let manager = SessionManager::new(Arc::new(gateway));

        let submission = manager
            .handle_component(&component("nope", 1, "next"))
            .await
            .unwrap();
        assert!(submission.is_none());
    }

    #[tokio::test]
    async fn test_gated_event_causes_no_render() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .returning(|_, _| Ok("m1".to_string()));
        gateway.expect_edit_message().times(0);

        let manager = SessionManager::new(Arc::new(gateway));
        manager
            .open(
                "chan",
                create_test_paginator(),
                SessionOptions::default().invoker_only(1),
            )
            .await
            .unwrap();

        manager
            .handle_component(&component("m1", 99, "next"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stop_removes_session() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .returning(|_, _| Ok("m1".to_string()));
        gateway.expect_edit_message().returning(|_, _, _| Ok(()));

        let manager = SessionManager::new(Arc::new(gateway));
        manager
            .open("chan", create_test_paginator(), SessionOptions::default())
            .await
            .unwrap();

        manager
            .handle_component(&component("m1", 1, "stop"))
            .await
            .unwrap();
        assert!(manager.is_empty().await);

        // Events after the stop are ignored entirely.
        let submission = manager
            .handle_component(&component("m1", 1, "next"))
            .await
            .unwrap();
        assert!(submission.is_none());
    }

    #[tokio::test]
    async fn test_panel_submission_is_returned() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .returning(|_, _| Ok("m1".to_string()));

        let manager = SessionManager::new(Arc::new(gateway));
        manager
            .open(
                "chan",
                Box::new(TaskPanel::new("buy milk")),
                SessionOptions::default(),
            )
            .await
            .unwrap();

        let submission = manager
            .handle_component(&component("m1", 7, "finish"))
            .await
            .unwrap()
            .expect("finish should submit");
        assert_eq!(submission.draft.text, "buy milk");
        assert_eq!(submission.user_id, 7);
        // The session stays live until the caller completes it.
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_complete_renders_confirmation_and_closes() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .returning(|_, _| Ok("m1".to_string()));
        gateway
            .expect_edit_message()
            .withf(|_, _, message| message.body.contains("Task Created"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let manager = SessionManager::new(Arc::new(gateway));
        manager
            .open(
                "chan",
                Box::new(TaskPanel::new("buy milk")),
                SessionOptions::default(),
            )
            .await
            .unwrap();

        manager
            .complete("m1", RenderedMessage::text("\u{2705} Task Created"))
            .await;
        assert!(manager.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_expires_session() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .returning(|_, _| Ok("m1".to_string()));

        let manager = SessionManager::new(Arc::new(gateway));
        let options = SessionOptions {
            timeout: Duration::from_secs(10),
            ..SessionOptions::default()
        };
        manager
            .open("chan", create_test_paginator(), options)
            .await
            .unwrap();

        time::sleep(Duration::from_secs(11)).await;
        // Let the timeout task run to completion.
        tokio::task::yield_now().await;
        assert!(manager.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_deletes_message_when_configured() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_send_message()
            .returning(|_, _| Ok("m1".to_string()));
        gateway
            .expect_delete_message()
            .withf(|_, message_id| message_id == "m1")
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = SessionManager::new(Arc::new(gateway));
        let options = SessionOptions {
            timeout: Duration::from_secs(10),
            delete_on_timeout: true,
            ..SessionOptions::default()
        };
        manager
            .open("chan", create_test_paginator(), options)
            .await
            .unwrap();

        time::sleep(Duration::from_secs(11)).await;
        // Let the timeout task run to completion.
        tokio::task::yield_now().await;
        assert!(manager.is_empty().await);
    }
}
