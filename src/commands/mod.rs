//! Command surface: registration, context, dispatch and handlers.
//!
//! The full command tree is declared in one place, [`build_registry`],
//! instead of being discovered from the filesystem; hot reload is the
//! registry's `unregister_subtree` plus a fresh registration.
//!
//! Execution follows a two-phase model: the [`Dispatcher`] resolves raw
//! text into a command, then routes it to a handler in [`actions`]. Every
//! handler receives an explicit [`CommandContext`] carrying the registry,
//! the stores and the invoking user; there is no global bot state.
//!
//! Handlers return a [`CommandOutcome`]: a reply, an interactive session
//! to open, or both.

pub mod actions;
mod dispatcher;

use std::sync::Arc;

use crate::claims::{ClaimStore, ClaimValidator};
use crate::error::BotError;
use crate::registry::{Cog, CommandRegistry, CommandSpec, Entry, GroupSpec, Route};
use crate::sessions::{SessionOptions, View};
use crate::tasks::TaskStore;

pub use crate::commands::dispatcher::Dispatcher;

/// Runtime context for command execution.
///
/// Passed explicitly into every handler call; handlers have no other way
/// to reach shared state.
pub struct CommandContext {
    /// The command tree, for help and resolution-adjacent rendering.
    pub registry: Arc<CommandRegistry>,
    /// Claim rules in front of the claim store.
    pub claims: ClaimValidator,
    /// Raw claim queries, for listings.
    pub claim_store: ClaimStore,
    /// Task queries.
    pub tasks: TaskStore,
    /// Channel the command was issued in.
    pub channel_id: String,
    /// Numeric id of the invoking user.
    pub user_id: i64,
    /// Display name of the invoking user.
    pub user_name: String,
    /// The bot's command prefix, for usage strings.
    pub prefix: String,
}

/// An interactive session a handler wants opened on its reply message.
pub struct SessionPlan {
    pub view: Box<dyn View>,
    pub options: SessionOptions,
}

/// Result of executing a command.
pub struct CommandOutcome {
    /// Reply text, sent as a reply to the invoking message.
    pub response: Option<String>,
    /// Session to open as a new message in the channel.
    pub session: Option<SessionPlan>,
}

impl std::fmt::Debug for CommandOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandOutcome")
            .field("response", &self.response)
            .field("session", &self.session.is_some())
            .finish()
    }
}

impl CommandOutcome {
    /// A plain text reply.
    pub fn text(response: impl Into<String>) -> Self {
        CommandOutcome {
            response: Some(response.into()),
            session: None,
        }
    }

    /// An interactive session with no accompanying reply.
    pub fn session(view: Box<dyn View>, options: SessionOptions) -> Self {
        CommandOutcome {
            response: None,
            session: Some(SessionPlan { view, options }),
        }
    }
}

/// Builds the complete startup registry.
///
/// # Errors
///
/// [`BotError::DuplicateName`] if the declared tree collides with
/// itself, which means the registration list is wrong.
pub fn build_registry() -> Result<CommandRegistry, BotError> {
    let mut registry = CommandRegistry::new();

    let claims = registry.register_cog(Cog::new("claims", "\u{1F5FA}"));
    registry.register(
        claims,
        Entry::Group(
            GroupSpec::new("claims", "Reserve spots in the world"),
            vec![
                Entry::Command(
                    CommandSpec::new("create", "Establish a claim", Route::ClaimsCreate)
                        .param("x", true, "X coordinate of the claim")
                        .param("y", true, "Y coordinate of the claim")
                        .param("dimension", false, "overworld, nether or end"),
                ),
                Entry::Command(
                    CommandSpec::new("remove", "Give up a claim", Route::ClaimsRemove)
                        .param("x", true, "X coordinate of the claim")
                        .param("y", true, "Y coordinate of the claim")
                        .param("dimension", false, "overworld, nether or end"),
                ),
                Entry::Command(CommandSpec::new(
                    "list",
                    "List your claims",
                    Route::ClaimsList,
                )),
            ],
        ),
    )?;

    let secretary = registry.register_cog(Cog::new("secretary", "\u{1F4BC}"));
    registry.register(
        secretary,
        Entry::Group(
            GroupSpec::new("todo", "Keep track of mundane tasks"),
            vec![
                Entry::Command(
                    CommandSpec::new("add", "Add a task to your todo list", Route::TodoAdd)
                        .alias("a")
                        .param("task", true, "The task text"),
                ),
                Entry::Command(
                    CommandSpec::new("list", "List your tasks", Route::TodoList)
                        .alias("l")
                        .param("overdue_only", false, "Only show overdue tasks"),
                ),
                Entry::Command(
                    CommandSpec::new("remove", "Delete a task", Route::TodoRemove)
                        .alias("rm")
                        .param("task_id", true, "Numeric id from the task list"),
                ),
            ],
        ),
    )?;

    let web = registry.register_cog(Cog::new("web", "\u{1F310}"));
    registry.register(
        web,
        Entry::Group(
            GroupSpec::new("web", "Look things up on the web").alias("w"),
            vec![Entry::Command(
                CommandSpec::new("search", "Build a search link", Route::WebSearch)
                    .alias("s")
                    .param("query", true, "What to search for"),
            )],
        ),
    )?;

    let help = registry.register_cog(Cog::new("help", "\u{1F4DA}").hidden());
    registry.register(
        help,
        Entry::Command(
            CommandSpec::new("help", "Show command help", Route::Help)
                .alias("h")
                .alias("whatis")
                .param("name", false, "A command, group or cog name"),
        ),
    )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry_succeeds() {
        let registry = build_registry().unwrap();
        for name in [
            "claims create",
            "claims remove",
            "claims list",
            "todo add",
            "todo list",
            "todo remove",
            "web search",
            "help",
        ] {
            assert!(registry.lookup(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn test_registry_aliases_resolve() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.lookup("a"), registry.lookup("todo add"));
        assert_eq!(registry.lookup("h"), registry.lookup("help"));
    }

    #[test]
    fn test_help_cog_is_hidden() {
        let registry = build_registry().unwrap();
        let id = registry.lookup("help").unwrap();
        assert!(registry.cog_of(id).unwrap().hidden);
    }
}
