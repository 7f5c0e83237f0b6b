//! Handlers for the web cog.
//!
//! The bot only builds search links; it never fetches or scrapes pages
//! itself.

use crate::commands::{CommandContext, CommandOutcome};
use crate::error::BotError;
use crate::registry::Resolution;

/// `web search <query>`
pub fn search(ctx: &CommandContext, resolution: &Resolution) -> Result<CommandOutcome, BotError> {
    let query = resolution.rest();
    if query.is_empty() {
        return Ok(CommandOutcome::text(format!(
            "What should I search for?\nUsage: `{}web search <query>`",
            ctx.prefix
        )));
    }

    Ok(CommandOutcome::text(format!(
        "\u{1F50E} https://duckduckgo.com/?q={}",
        url_encode(&query)
    )))
}

/// Percent-encodes a query string, with `+` for spaces.
fn url_encode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push('+'),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{ClaimRules, ClaimStore, ClaimValidator};
    use crate::commands::build_registry;
    use crate::db::Database;
    use crate::tasks::TaskStore;
    use std::sync::Arc;

    async fn create_test_context() -> CommandContext {
        let db = Database::connect(":memory:").await.unwrap();
        let claim_store = ClaimStore::new(&db);
        CommandContext {
            registry: Arc::new(build_registry().unwrap()),
            claims: ClaimValidator::new(claim_store.clone(), ClaimRules::default()),
            claim_store,
            tasks: TaskStore::new(&db),
            channel_id: "chan".to_string(),
            user_id: 1,
            user_name: "alice".to_string(),
            prefix: "hk ".to_string(),
        }
    }

    fn create_resolution(rest: &str) -> Resolution {
        Resolution {
            command: 0,
            args: rest.split_whitespace().map(str::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn test_search_builds_link() {
        let ctx = create_test_context().await;
        let outcome = search(&ctx, &create_resolution("rust lifetimes")).unwrap();
        assert!(
            outcome
                .response
                .unwrap()
                .contains("duckduckgo.com/?q=rust+lifetimes")
        );
    }

    #[tokio::test]
    async fn test_search_without_query_shows_usage() {
        let ctx = create_test_context().await;
        let outcome = search(&ctx, &create_resolution("")).unwrap();
        assert!(outcome.response.unwrap().contains("Usage"));
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode("rust lifetimes"), "rust+lifetimes");
        assert_eq!(url_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(url_encode("safe-chars_.~"), "safe-chars_.~");
    }
}
