//! Unified error taxonomy for the waf bot.
//!
//! Errors are split into two tiers, following the silent-vs-surfaced split
//! used throughout the command pipeline:
//!
//! - **Surfaced errors** produce a user-facing message through
//!   [`BotError::user_message`] and are sent back to the channel the
//!   command came from.
//! - **Silent errors** (internal invariant violations, database
//!   connectivity failures) return a generic apology at most; the real
//!   cause is logged and the current invocation is aborted without retry.

use thiserror::Error;

use crate::claims::Dimension;
use crate::db::DbError;

/// Errors produced by command resolution, validation and execution.
#[derive(Debug, Error)]
pub enum BotError {
    /// A command, group or cog was looked up by name and does not exist.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// A name candidate matched more than one registered command.
    ///
    /// Carries the qualified names of every matched command so the caller
    /// can show the full set; the resolver never picks one on its own.
    #[error("ambiguous command name `{candidate}` ({})", .matches.join(", "))]
    AmbiguousCommandName {
        candidate: String,
        matches: Vec<String>,
    },

    /// A command was registered under a qualified name already in use.
    #[error("duplicate command name: {0}")]
    DuplicateName(String),

    /// The (user, task text) pair already exists in the todo store.
    #[error("task already exists: {0}")]
    DuplicateTask(String),

    /// The user already holds the maximum number of claims in a dimension.
    #[error("claim limit reached in {dimension}: {limit} per user")]
    ClaimLimitExceeded { dimension: Dimension, limit: i64 },

    /// A new claim would fall within the exclusion radius of an existing one.
    #[error("claim at ({x}, {y}) in {dimension} intersects an existing claim")]
    ClaimIntersects {
        x: i64,
        y: i64,
        dimension: Dimension,
    },

    /// An attachment had an unsupported file extension.
    #[error("invalid media format: {0}")]
    InvalidMediaFormat(String),

    /// An attachment exceeded the accepted size.
    #[error("invalid media size: {0} bytes")]
    InvalidMediaSize(u64),

    /// Free-text date/time input matched none of the accepted formats.
    #[error("unrecognized date/time: {0}")]
    InvalidDateTime(String),

    /// An internal invariant was violated. Never caused by user input.
    #[error("internal error: {0}")]
    Internal(String),

    /// Database failure. Propagates up and aborts the current invocation.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl BotError {
    /// Returns the user-facing rendering of this error, or `None` when the
    /// error should not be echoed to the channel.
    ///
    /// Validation and resolution errors explain the violated rule.
    /// Internal and database errors surface generically; their detail only
    /// goes to the log.
    pub fn user_message(&self) -> Option<String> {
        match self {
            BotError::CommandNotFound(name) => Some(format!("Command `{name}` not found.")),
            BotError::AmbiguousCommandName { candidate, matches } => Some(format!(
                "`{candidate}` matches several commands: {}. Please be more specific.",
                matches
                    .iter()
                    .map(|m| format!("`{m}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            BotError::DuplicateName(name) => {
                Some(format!("A command named `{name}` already exists."))
            }
            BotError::DuplicateTask(task) => {
                Some(format!("You already have a task named \"{task}\"."))
            }
            BotError::ClaimLimitExceeded { dimension, limit } => Some(format!(
                "You already hold {limit} claim(s) in {dimension}; remove one first."
            )),
            BotError::ClaimIntersects { x, y, dimension } => Some(format!(
                "({x}, {y}) is too close to an existing claim in {dimension}."
            )),
            BotError::InvalidMediaFormat(ext) => Some(format!(
                "The attachment format `{ext}` is not accepted here."
            )),
            BotError::InvalidMediaSize(size) => {
                Some(format!("The attachment is too big ({size} bytes)."))
            }
            BotError::InvalidDateTime(input) => {
                Some(format!("I couldn't read \"{input}\" as a date or time."))
            }
            BotError::Internal(_) | BotError::Db(_) => {
                Some("Something went wrong on my side. Please try again.".to_string())
            }
        }
    }
}
