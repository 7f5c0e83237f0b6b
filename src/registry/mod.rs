//! Command registry and name resolution.
//!
//! The registry holds every command the bot serves in a tree of groups,
//! with feature bundles (cogs) owning the top-level entries. It is built
//! once at startup from an explicit registration list and treated as
//! immutable behind an `Arc` afterward; hot reload swaps whole subtrees
//! with [`CommandRegistry::unregister_subtree`] followed by
//! re-registration.
//!
//! [`CommandResolver`] turns raw prefixed text into a command invocation.
//! Because a command name may span one or two tokens (`help` vs
//! `todo add`) with no delimiter, resolution tries candidates of
//! increasing length and reports ambiguity instead of guessing.

mod command;
mod registry;
mod resolver;

pub use crate::registry::command::{Cog, CommandSpec, Entry, GroupSpec, Parameter, Route};
pub use crate::registry::registry::{CogId, CommandRegistry, NodeId};
pub use crate::registry::resolver::{CommandResolver, Resolution, ResolveError};
