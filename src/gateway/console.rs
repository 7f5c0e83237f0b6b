//! Console transport for local development.
//!
//! Prints outbound traffic to stdout and assigns synthetic message ids so
//! interactive sessions can be driven by hand. Inbound events are produced
//! by [`read_events`], which turns stdin lines into [`GatewayEvent`]s:
//!
//! ```text
//! waf help                      a plain message
//! press <message_id> <control>  a button press on a rendered message
//! pick <message_id> <control> <value>
//! modal <message_id> <modal_id> <text...>
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::gateway::{
    ComponentEvent, Gateway, GatewayError, GatewayEvent, IncomingMessage, ModalSpec,
    ModalSubmitEvent, RenderedMessage,
};

/// The single synthetic channel the console transport serves.
pub const CONSOLE_CHANNEL: &str = "console";
/// The synthetic user id attributed to stdin input.
pub const CONSOLE_USER_ID: i64 = 1;

/// Gateway implementation that writes to stdout.
#[derive(Default)]
pub struct ConsoleGateway {
    next_message_id: AtomicU64,
}

impl ConsoleGateway {
    pub fn new() -> Self {
        ConsoleGateway::default()
    }

    fn print(message: &RenderedMessage, message_id: &str) {
        println!("[{message_id}] {}", message.body);
        if !message.controls.is_empty() {
            let controls = message
                .controls
                .iter()
                .map(|c| {
                    if c.disabled {
                        format!("({})", c.id)
                    } else {
                        format!("[{}]", c.id)
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            println!("[{message_id}] controls: {controls}");
        }
    }
}

#[async_trait]
impl Gateway for ConsoleGateway {
    async fn send_message(
        &self,
        _channel_id: &str,
        message: &RenderedMessage,
    ) -> Result<String, GatewayError> {
        let id = format!("m{}", self.next_message_id.fetch_add(1, Ordering::Relaxed));
        Self::print(message, &id);
        Ok(id)
    }

    async fn edit_message(
        &self,
        _channel_id: &str,
        message_id: &str,
        message: &RenderedMessage,
    ) -> Result<(), GatewayError> {
        Self::print(message, message_id);
        Ok(())
    }

    async fn delete_message(
        &self,
        _channel_id: &str,
        message_id: &str,
    ) -> Result<(), GatewayError> {
        println!("[{message_id}] (deleted)");
        Ok(())
    }

    async fn send_reply(
        &self,
        _channel_id: &str,
        reply_to: &str,
        body: &str,
    ) -> Result<(), GatewayError> {
        println!("[reply to {reply_to}] {body}");
        Ok(())
    }

    async fn open_modal(&self, _channel_id: &str, modal: &ModalSpec) -> Result<(), GatewayError> {
        println!(
            "[modal {}] {} — {} ({})",
            modal.id, modal.title, modal.label, modal.placeholder
        );
        Ok(())
    }

    async fn send_reminder(&self, user_id: i64, body: &str) -> Result<(), GatewayError> {
        println!("[reminder for user {user_id}] {body}");
        Ok(())
    }

    async fn resolve_user(&self, user_id: i64) -> Option<String> {
        (user_id == CONSOLE_USER_ID).then(|| "console".to_string())
    }
}

/// Reads stdin lines and forwards them as gateway events until EOF.
pub async fn read_events(events: mpsc::Sender<GatewayEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut next_inbound = 0u64;

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let event = parse_line(&line, &mut next_inbound);
        if events.send(event).await.is_err() {
            return;
        }
    }
    info!("console input closed");
}

fn parse_line(line: &str, next_inbound: &mut u64) -> GatewayEvent {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("press") => {
            let message_id = parts.next().unwrap_or_default().to_string();
            let control_id = parts.next().unwrap_or_default().to_string();
            GatewayEvent::Component(ComponentEvent {
                channel_id: CONSOLE_CHANNEL.to_string(),
                message_id,
                user_id: CONSOLE_USER_ID,
                control_id,
                value: None,
            })
        }
        Some("pick") => {
            let message_id = parts.next().unwrap_or_default().to_string();
            let control_id = parts.next().unwrap_or_default().to_string();
            let value = parts.collect::<Vec<_>>().join(" ");
            GatewayEvent::Component(ComponentEvent {
                channel_id: CONSOLE_CHANNEL.to_string(),
                message_id,
                user_id: CONSOLE_USER_ID,
                control_id,
                value: Some(value),
            })
        }
        Some("modal") => {
            let message_id = parts.next().unwrap_or_default().to_string();
            let modal_id = parts.next().unwrap_or_default().to_string();
            let value = parts.collect::<Vec<_>>().join(" ");
            GatewayEvent::ModalSubmit(ModalSubmitEvent {
                channel_id: CONSOLE_CHANNEL.to_string(),
                message_id,
                user_id: CONSOLE_USER_ID,
                modal_id,
                value,
            })
        }
        _ => {
            *next_inbound += 1;
            GatewayEvent::Message(IncomingMessage {
                channel_id: CONSOLE_CHANNEL.to_string(),
                message_id: format!("in{next_inbound}"),
                user_id: CONSOLE_USER_ID,
                user_name: "console".to_string(),
                body: line.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_message() {
        let mut counter = 0;
        let event = parse_line("waf help", &mut counter);
        match event {
            GatewayEvent::Message(message) => {
                assert_eq!(message.body, "waf help");
                assert_eq!(message.user_id, CONSOLE_USER_ID);
            }
            _ => panic!("expected message event"),
        }
    }

    #[test]
    fn test_parse_line_press() {
        let mut counter = 0;
        let event = parse_line("press m1 next", &mut counter);
        match event {
            GatewayEvent::Component(component) => {
                assert_eq!(component.message_id, "m1");
                assert_eq!(component.control_id, "next");
                assert!(component.value.is_none());
            }
            _ => panic!("expected component event"),
        }
    }

    #[test]
    fn test_parse_line_modal_joins_value() {
        let mut counter = 0;
        let event = parse_line("modal m1 task_date next week", &mut counter);
        match event {
            GatewayEvent::ModalSubmit(modal) => {
                assert_eq!(modal.modal_id, "task_date");
                assert_eq!(modal.value, "next week");
            }
            _ => panic!("expected modal event"),
        }
    }
}
