//! Command name resolution.
//!
//! Incoming text carries no delimiter between the command name and its
//! arguments, and a name may span one token (`help`) or two
//! (`todo add`). The resolver therefore tries name candidates of
//! increasing token depth and matches them loosely against the registry:
//!
//! - a command matches when its qualified name ends with the candidate at
//!   a token boundary (`add` matches `todo add`, never a hypothetical
//!   `madd`), or when its alias set contains the candidate exactly;
//! - a unique match at some depth resolves, and the remaining tokens are
//!   the arguments;
//! - several matches at the first depth that matches anything is an
//!   ambiguity carrying every matched command, reported rather than
//!   broken by any heuristic;
//! - no match at any depth means the text did not address the bot's
//!   command surface at all, which is not an error.
//!
//! Groups are containers, not invocation targets: `todo add x` must
//! resolve to `todo add`, so the bare `todo` token never consumes the
//! match at depth one.

use std::sync::Arc;

use log::debug;

use crate::error::BotError;
use crate::registry::registry::{CommandRegistry, NodeId};

/// A successfully resolved invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The matched leaf command.
    pub command: NodeId,
    /// Tokens following the matched name, in input order.
    pub args: Vec<String>,
}

impl Resolution {
    /// The argument tokens rejoined with single spaces.
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }
}

/// Resolution failure.
///
/// "No command found" is not a failure; [`CommandResolver::resolve`]
/// models it as `Ok(None)` so callers can silently ignore the message.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolveError {
    /// A candidate matched several commands at the same depth.
    Ambiguous {
        candidate: String,
        matches: Vec<NodeId>,
    },
}

impl ResolveError {
    /// Converts into the user-facing error, rendering matched ids as
    /// qualified names.
    pub fn into_bot_error(self, registry: &CommandRegistry) -> BotError {
        match self {
            ResolveError::Ambiguous { candidate, matches } => BotError::AmbiguousCommandName {
                candidate,
                matches: matches
                    .into_iter()
                    .map(|id| registry.qualified_name(id).to_string())
                    .collect(),
            },
        }
    }
}

/// Maps raw prefixed text to a registered command invocation.
pub struct CommandResolver {
    registry: Arc<CommandRegistry>,
    prefix: String,
    /// Longest candidate, in tokens, the resolver will try.
    max_depth: usize,
}

impl CommandResolver {
    pub fn new(registry: Arc<CommandRegistry>, prefix: impl Into<String>, max_depth: usize) -> Self {
        CommandResolver {
            registry,
            prefix: prefix.into(),
            max_depth: max_depth.max(1),
        }
    }

    /// Resolves `body` to a command and its argument remainder.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(resolution))` - a unique command matched.
    /// * `Ok(None)` - the text lacks the prefix or names no command;
    ///   the caller should ignore it silently.
    /// * `Err(ResolveError::Ambiguous)` - several commands matched at the
    ///   first depth that matched anything. The search stops there; a
    ///   longer candidate is never used to break the tie.
    pub fn resolve(&self, body: &str) -> Result<Option<Resolution>, ResolveError> {
        let Some(rest) = body.strip_prefix(&self.prefix) else {
            return Ok(None);
        };
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(None);
        }

        for depth in 1..=self.max_depth.min(tokens.len()) {
            let candidate = tokens[..depth].join(" ");
            let matches = self.matches_for(&candidate);

            match matches.len() {
                0 => continue,
                1 => {
                    debug!("resolved {:?} at depth {}", candidate, depth);
                    return Ok(Some(Resolution {
                        command: matches[0],
                        args: tokens[depth..].iter().map(|t| t.to_string()).collect(),
                    }));
                }
                _ => {
                    debug!(
                        "candidate {:?} is ambiguous across {} commands",
                        candidate,
                        matches.len()
                    );
                    return Err(ResolveError::Ambiguous { candidate, matches });
                }
            }
        }

        Ok(None)
    }

    /// Every leaf command matching `candidate` by qualified-name suffix
    /// or exact alias.
    fn matches_for(&self, candidate: &str) -> Vec<NodeId> {
        let suffix = format!(" {candidate}");
        self.registry
            .commands()
            .filter(|(id, spec)| {
                let qualified = self.registry.qualified_name(*id);
                qualified == candidate
                    || qualified.ends_with(&suffix)
                    || spec.aliases.iter().any(|alias| alias == candidate)
            })
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::command::{Cog, CommandSpec, Entry, GroupSpec, Route};

    fn create_test_registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        let secretary = registry.register_cog(Cog::new("secretary", "\u{1F4BC}"));
        let help = registry.register_cog(Cog::new("help", "\u{1F4DA}").hidden());

        registry
            .register(
                secretary,
                Entry::Group(
                    GroupSpec::new("todo", "Task management"),
                    vec![
                        Entry::Command(
                            CommandSpec::new("add", "Add a task", Route::TodoAdd).alias("a"),
                        ),
                        Entry::Command(
                            CommandSpec::new("list", "List tasks", Route::TodoList).alias("l"),
                        ),
                    ],
                ),
            )
            .unwrap();
        registry
            .register(
                help,
                Entry::Command(CommandSpec::new("help", "Show help", Route::Help).alias("h")),
            )
            .unwrap();
        registry
    }

    fn create_test_resolver() -> CommandResolver {
        CommandResolver::new(Arc::new(create_test_registry()), "hk ", 2)
    }

    #[test]
    fn test_resolve_group_subcommand_with_remainder() {
        let resolver = create_test_resolver();
        let resolution = resolver
            .resolve("hk todo add buy milk")
            .unwrap()
            .expect("should resolve");

        assert_eq!(
            resolver.registry.qualified_name(resolution.command),
            "todo add"
        );
        assert_eq!(resolution.rest(), "buy milk");
    }

    #[test]
    fn test_resolve_single_token_command() {
        let resolver = create_test_resolver();
        let resolution = resolver.resolve("hk help").unwrap().expect("should resolve");
        assert_eq!(resolver.registry.qualified_name(resolution.command), "help");
        assert!(resolution.args.is_empty());
    }

    #[test]
    fn test_resolve_by_suffix() {
        let resolver = create_test_resolver();
        // "add" is the unique suffix of "todo add".
        let resolution = resolver
            .resolve("hk add buy milk")
            .unwrap()
            .expect("should resolve");
        assert_eq!(
            resolver.registry.qualified_name(resolution.command),
            "todo add"
        );
        assert_eq!(resolution.rest(), "buy milk");
    }

    #[test]
    fn test_resolve_by_alias() {
        let resolver = create_test_resolver();
        let resolution = resolver
            .resolve("hk a buy milk")
            .unwrap()
            .expect("should resolve");
        assert_eq!(
            resolver.registry.qualified_name(resolution.command),
            "todo add"
        );
        assert_eq!(resolution.rest(), "buy milk");
    }

    #[test]
    fn test_suffix_does_not_match_inside_token() {
        let mut registry = create_test_registry();
        let cog = registry.register_cog(Cog::new("extra", "?"));
        registry
            .register(
                cog,
                Entry::Command(CommandSpec::new("madd", "Not add", Route::TodoAdd)),
            )
            .unwrap();
        let resolver = CommandResolver::new(Arc::new(registry), "hk ", 2);

        // "add" must not match "madd": one match only, no ambiguity.
        let resolution = resolver.resolve("hk add x").unwrap().expect("should resolve");
        assert_eq!(
            resolver.registry.qualified_name(resolution.command),
            "todo add"
        );
    }

    #[test]
    fn test_ambiguous_suffix_carries_all_matches() {
        let mut registry = create_test_registry();
        let cog = registry.register_cog(Cog::new("notes", "\u{1F4DD}"));
        registry
            .register(
                cog,
                Entry::Group(
                    GroupSpec::new("notes", "Note management"),
                    vec![Entry::Command(CommandSpec::new(
                        "add",
                        "Add a note",
                        Route::TodoAdd,
                    ))],
                ),
            )
            .unwrap();
        let resolver = CommandResolver::new(Arc::new(registry), "hk ", 2);

        let error = resolver.resolve("hk add something").unwrap_err();
        let ResolveError::Ambiguous { candidate, matches } = error;
        assert_eq!(candidate, "add");

        let mut names: Vec<&str> = matches
            .iter()
            .map(|id| resolver.registry.qualified_name(*id))
            .collect();
        names.sort();
        assert_eq!(names, vec!["notes add", "todo add"]);
    }

    #[test]
    fn test_ambiguity_stops_the_search() {
        // Both "todo add" and "notes add" match at depth 1; the resolver
        // must not continue to depth 2 even though "add something" would
        // match nothing there.
        let mut registry = create_test_registry();
        let cog = registry.register_cog(Cog::new("notes", "\u{1F4DD}"));
        registry
            .register(
                cog,
                Entry::Group(
                    GroupSpec::new("notes", "Note management"),
                    vec![Entry::Command(CommandSpec::new(
                        "add",
                        "Add a note",
                        Route::TodoAdd,
                    ))],
                ),
            )
            .unwrap();
        let resolver = CommandResolver::new(Arc::new(registry), "hk ", 2);

        assert!(resolver.resolve("hk add something").is_err());
    }

    #[test]
    fn test_exact_qualified_name_beats_nothing_at_deeper_depth() {
        let resolver = create_test_resolver();
        // Depth 1: "todo" matches nothing (groups are not invocable).
        // Depth 2: "todo list" matches exactly.
        let resolution = resolver.resolve("hk todo list").unwrap().expect("resolves");
        assert_eq!(
            resolver.registry.qualified_name(resolution.command),
            "todo list"
        );
    }

    #[test]
    fn test_bare_group_does_not_resolve() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve("hk todo").unwrap(), None);
    }

    #[test]
    fn test_missing_prefix_is_silent() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve("todo add buy milk").unwrap(), None);
        assert_eq!(resolver.resolve("hkadd x").unwrap(), None);
    }

    #[test]
    fn test_bare_prefix_is_silent() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve("hk ").unwrap(), None);
        assert_eq!(resolver.resolve("hk    ").unwrap(), None);
    }

    #[test]
    fn test_unknown_name_is_silent() {
        let resolver = create_test_resolver();
        assert_eq!(resolver.resolve("hk frobnicate now").unwrap(), None);
    }

    #[test]
    fn test_hidden_commands_stay_resolvable() {
        let mut registry = create_test_registry();
        let cog = registry.register_cog(Cog::new("dev", "\u{1F527}").hidden());
        registry
            .register(
                cog,
                Entry::Command(CommandSpec::new("debug", "", Route::Help).hidden()),
            )
            .unwrap();
        let resolver = CommandResolver::new(Arc::new(registry), "hk ", 2);

        assert!(resolver.resolve("hk debug").unwrap().is_some());
    }
}
