//! Bot wiring and the inbound event loop.
//!
//! The [`Bot`] owns every component and spells out their collaboration:
//! the registry and dispatcher for commands, the session manager for
//! interactive messages, the stores for persistence, and the sweeper for
//! reminders. Inbound gateway events arrive on a channel; each one is
//! handled in its own spawned task so a slow database query never blocks
//! the loop, while events for the same session are still serialized by
//! the session manager.

use std::sync::Arc;

use log::{error, info};
use tokio::sync::mpsc;

use crate::claims::{ClaimStore, ClaimValidator};
use crate::commands::{CommandContext, CommandOutcome, Dispatcher, build_registry};
use crate::config::Config;
use crate::db::Database;
use crate::error::BotError;
use crate::gateway::{ComponentEvent, Gateway, GatewayEvent, IncomingMessage, ModalSubmitEvent,
    RenderedMessage};
use crate::registry::CommandRegistry;
use crate::sessions::{SessionManager, Submission};
use crate::tasks::{OverdueTaskSweeper, TaskStore};

/// Everything a spawned event handler needs, cloned per event.
struct EventContext {
    gateway: Arc<dyn Gateway>,
    registry: Arc<CommandRegistry>,
    dispatcher: Arc<Dispatcher>,
    sessions: Arc<SessionManager>,
    claim_store: ClaimStore,
    claims: ClaimValidator,
    tasks: TaskStore,
    prefix: String,
    session_timeout: std::time::Duration,
}

/// The assembled bot.
pub struct Bot {
    event_context: Arc<EventContext>,
    sweeper: Option<OverdueTaskSweeper>,
}

impl Bot {
    /// Builds every component from the configuration.
    ///
    /// Opens (and if needed creates) the database, declares the command
    /// registry, and prepares the sweeper; nothing runs until
    /// [`Bot::start`].
    pub async fn new(
        config: &Config,
        database_path: &str,
        gateway: Arc<dyn Gateway>,
    ) -> Result<Self, anyhow::Error> {
        let db = Database::connect(database_path).await?;
        let claim_store = ClaimStore::new(&db);
        let tasks = TaskStore::new(&db);

        let registry = Arc::new(build_registry()?);
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            config.commands.prefix.clone(),
            config.commands.max_name_depth,
        ));
        let sessions = Arc::new(SessionManager::new(Arc::clone(&gateway)));

        let sweeper = OverdueTaskSweeper::new(
            Arc::clone(&gateway),
            tasks.clone(),
            config.sweeper.interval_seconds,
            config.sweeper.overdue_threshold_seconds,
        );

        let event_context = Arc::new(EventContext {
            gateway: Arc::clone(&gateway),
            registry,
            dispatcher,
            sessions,
            claims: ClaimValidator::new(claim_store.clone(), (&config.claims).into()),
            claim_store,
            tasks,
            prefix: config.commands.prefix.clone(),
            session_timeout: std::time::Duration::from_secs(config.sessions.timeout_seconds),
        });

        Ok(Bot {
            event_context,
            sweeper: Some(sweeper),
        })
    }

    /// Starts the sweeper and consumes gateway events until the channel
    /// closes.
    pub async fn start(mut self, mut events: mpsc::Receiver<GatewayEvent>) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.spawn();
        }
        info!("bot ready, waiting for events");

        while let Some(event) = events.recv().await {
            let ctx = Arc::clone(&self.event_context);
            tokio::spawn(async move {
                match event {
                    GatewayEvent::Message(message) => Self::handle_message(ctx, message).await,
                    GatewayEvent::Component(component) => {
                        Self::handle_component(ctx, component).await
                    }
                    GatewayEvent::ModalSubmit(modal) => Self::handle_modal(ctx, modal).await,
                }
            });
        }
        info!("event channel closed, shutting down");
    }

    async fn handle_message(ctx: Arc<EventContext>, message: IncomingMessage) {
        let command_context = CommandContext {
            registry: Arc::clone(&ctx.registry),
            claims: ctx.claims.clone(),
            claim_store: ctx.claim_store.clone(),
            tasks: ctx.tasks.clone(),
            channel_id: message.channel_id.clone(),
            user_id: message.user_id,
            user_name: message.user_name.clone(),
            prefix: ctx.prefix.clone(),
        };

        let outcome = match ctx.dispatcher.dispatch(&message.body, &command_context).await {
            Ok(Some(outcome)) => outcome,
            // Not addressed to the bot: stay silent.
            Ok(None) => return,
            Err(e) => {
                Self::report_error(&ctx, &message.channel_id, &message.message_id, e).await;
                return;
            }
        };

        Self::deliver_outcome(&ctx, &message, outcome).await;
    }

    async fn deliver_outcome(
        ctx: &Arc<EventContext>,
        message: &IncomingMessage,
        outcome: CommandOutcome,
    ) {
        if let Some(response) = outcome.response
            && let Err(e) = ctx
                .gateway
                .send_reply(&message.channel_id, &message.message_id, &response)
                .await
        {
            error!("failed to send command reply: {}", e);
        }

        if let Some(mut plan) = outcome.session {
            plan.options.timeout = ctx.session_timeout;
            if let Err(e) = ctx
                .sessions
                .open(&message.channel_id, plan.view, plan.options)
                .await
            {
                error!("failed to open session: {}", e);
            }
        }
    }

    async fn handle_component(ctx: Arc<EventContext>, event: ComponentEvent) {
        let channel_id = event.channel_id.clone();
        let message_id = event.message_id.clone();
        match ctx.sessions.handle_component(&event).await {
            Ok(Some(submission)) => Self::persist_submission(&ctx, submission).await,
            Ok(None) => {}
            Err(e) => Self::report_error(&ctx, &channel_id, &message_id, e).await,
        }
    }

    async fn handle_modal(ctx: Arc<EventContext>, event: ModalSubmitEvent) {
        let channel_id = event.channel_id.clone();
        let message_id = event.message_id.clone();
        match ctx.sessions.handle_modal(&event).await {
            Ok(Some(submission)) => Self::persist_submission(&ctx, submission).await,
            Ok(None) => {}
            Err(e) => Self::report_error(&ctx, &channel_id, &message_id, e).await,
        }
    }

    /// Persists a finished task panel: inserts the task and turns the
    /// panel message into a confirmation. A duplicate task leaves the
    /// panel open so the user can cancel or adjust.
    async fn persist_submission(ctx: &Arc<EventContext>, submission: Submission) {
        let draft = &submission.draft;
        let inserted = ctx
            .tasks
            .insert(
                submission.user_id,
                &draft.text,
                draft.date,
                draft.time,
                draft.remind_type,
            )
            .await;

        match inserted {
            Ok(task) => {
                let mut body = format!("\u{2705} Task Created\n{}", task.task);
                if let Some(due) = task.due_description() {
                    body.push_str(&format!("\nDue: {due}"));
                }
                ctx.sessions
                    .complete(&submission.message_id, RenderedMessage::text(body))
                    .await;
            }
            Err(e) => {
                let error = match e {
                    crate::db::DbError::TaskExists(task) => BotError::DuplicateTask(task),
                    other => BotError::Db(other),
                };
                Self::report_error(ctx, &submission.channel_id, &submission.message_id, error)
                    .await;
            }
        }
    }

    async fn report_error(
        ctx: &Arc<EventContext>,
        channel_id: &str,
        reply_to: &str,
        error: BotError,
    ) {
        error!("command failed: {}", error);
        if let Some(message) = error.user_message()
            && let Err(e) = ctx.gateway.send_reply(channel_id, reply_to, &message).await
        {
            error!("failed to deliver error reply: {}", e);
        }
    }
}
