//! Command action handlers.
//!
//! One module per cog. Each handler receives the explicit
//! [`CommandContext`](crate::commands::CommandContext) plus the resolver's
//! [`Resolution`](crate::registry::Resolution) and returns a
//! [`CommandOutcome`](crate::commands::CommandOutcome).
//!
//! Argument mistakes (missing coordinate, bad number) are answered with a
//! usage message rather than an error; domain rule violations propagate
//! as [`BotError`](crate::error::BotError) so the dispatcher renders the
//! violated rule.

pub mod claims;
pub mod help;
pub mod todo;
pub mod web;
