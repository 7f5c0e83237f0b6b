//! Command dispatch: resolve, route, execute.

use std::sync::Arc;

use log::debug;

use crate::commands::actions::{claims, help, todo, web};
use crate::commands::{CommandContext, CommandOutcome};
use crate::error::BotError;
use crate::registry::{CommandRegistry, CommandResolver, Route};

/// Routes resolved commands to their handlers.
///
/// The dispatcher is stateless and shared across event handlers; all
/// mutable state lives behind the context's store handles.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    resolver: CommandResolver,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>, prefix: impl Into<String>, max_depth: usize) -> Self {
        Dispatcher {
            resolver: CommandResolver::new(Arc::clone(&registry), prefix, max_depth),
            registry,
        }
    }

    /// Resolves `body` and executes the matched command.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(outcome))` - a command ran.
    /// * `Ok(None)` - the text addressed no command; ignore silently.
    /// * `Err(_)` - resolution or execution failed; the error's
    ///   `user_message` is the reply to send.
    pub async fn dispatch(
        &self,
        body: &str,
        ctx: &CommandContext,
    ) -> Result<Option<CommandOutcome>, BotError> {
        let resolution = match self.resolver.resolve(body) {
            Ok(Some(resolution)) => resolution,
            Ok(None) => return Ok(None),
            Err(e) => return Err(e.into_bot_error(&self.registry)),
        };

        let spec = self
            .registry
            .command(resolution.command)
            .ok_or_else(|| BotError::Internal("resolver produced a non-command node".to_string()))?;
        debug!(
            "dispatching {} for user {}",
            self.registry.qualified_name(resolution.command),
            ctx.user_id
        );

        let outcome = match spec.route {
            Route::ClaimsCreate => claims::create(ctx, &resolution).await?,
            Route::ClaimsRemove => claims::remove(ctx, &resolution).await?,
            Route::ClaimsList => claims::list(ctx).await?,
            Route::TodoAdd => todo::add(ctx, &resolution)?,
            Route::TodoList => todo::list(ctx, &resolution).await?,
            Route::TodoRemove => todo::remove(ctx, &resolution).await?,
            Route::Help => help::help(ctx, &resolution)?,
            Route::WebSearch => web::search(ctx, &resolution)?,
        };
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{ClaimRules, ClaimStore, ClaimValidator};
    use crate::commands::build_registry;
    use crate::db::Database;
    use crate::tasks::TaskStore;

    async fn create_test_context() -> (Dispatcher, CommandContext) {
        let registry = Arc::new(build_registry().unwrap());
        let db = Database::connect(":memory:").await.unwrap();
        let claim_store = ClaimStore::new(&db);
        let ctx = CommandContext {
            registry: Arc::clone(&registry),
            claims: ClaimValidator::new(claim_store.clone(), ClaimRules::default()),
            claim_store,
            tasks: TaskStore::new(&db),
            channel_id: "chan".to_string(),
            user_id: 1,
            user_name: "alice".to_string(),
            prefix: "hk ".to_string(),
        };
        (Dispatcher::new(registry, "hk ", 2), ctx)
    }

    #[tokio::test]
    async fn test_dispatch_ignores_unprefixed_text() {
        let (dispatcher, ctx) = create_test_context().await;
        let outcome = dispatcher.dispatch("just chatting", &ctx).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_ignores_unknown_command() {
        let (dispatcher, ctx) = create_test_context().await;
        let outcome = dispatcher.dispatch("hk frobnicate", &ctx).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_claims_create() {
        let (dispatcher, ctx) = create_test_context().await;
        let outcome = dispatcher
            .dispatch("hk claims create 10 20", &ctx)
            .await
            .unwrap()
            .expect("should run");
        assert!(outcome.response.unwrap().contains("(10, 20)"));
    }

    #[tokio::test]
    async fn test_dispatch_surfaces_claim_errors() {
        let (dispatcher, ctx) = create_test_context().await;
        dispatcher
            .dispatch("hk claims create 0 0", &ctx)
            .await
            .unwrap();

        let error = dispatcher
            .dispatch("hk claims create 5000 5000", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(error, BotError::ClaimLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_todo_add_opens_session() {
        let (dispatcher, ctx) = create_test_context().await;
        let outcome = dispatcher
            .dispatch("hk todo add buy milk", &ctx)
            .await
            .unwrap()
            .expect("should run");
        assert!(outcome.session.is_some());
        assert!(outcome.response.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_by_suffix_and_alias() {
        let (dispatcher, ctx) = create_test_context().await;
        // "search" is the unique suffix of "web search"; "s" its alias.
        for body in ["hk search cats", "hk s cats"] {
            let outcome = dispatcher
                .dispatch(body, &ctx)
                .await
                .unwrap()
                .expect("should run");
            assert!(outcome.response.unwrap().contains("cats"));
        }
    }

    #[tokio::test]
    async fn test_dispatch_help() {
        let (dispatcher, ctx) = create_test_context().await;
        let outcome = dispatcher
            .dispatch("hk help", &ctx)
            .await
            .unwrap()
            .expect("should run");
        let response = outcome.response.unwrap();
        assert!(response.contains("todo"));
        assert!(response.contains("claims"));
    }
}
