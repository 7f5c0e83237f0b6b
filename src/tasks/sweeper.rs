//! Periodic overdue-task sweep.
//!
//! The sweeper runs as its own background task on a fixed interval,
//! independent of command handling. Each tick it queries tasks past their
//! due instant and notifies their owners, best effort: delivery failures
//! are swallowed at the send site and a failed tick never stops the loop.
//!
//! The sweep never deletes a task it reminded about; deletion is always an
//! explicit user action. A task with a reminder therefore keeps firing
//! once per tick until its owner removes it.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time;

use crate::error::BotError;
use crate::gateway::Gateway;
use crate::tasks::store::TaskStore;
use crate::tasks::task::{RemindType, Task};

/// Periodic scanner for overdue tasks.
pub struct OverdueTaskSweeper {
    gateway: Arc<dyn Gateway>,
    store: TaskStore,
    /// Seconds between ticks.
    interval_secs: u64,
    /// How far past its due instant a task must be to count as overdue.
    threshold_secs: i64,
}

impl OverdueTaskSweeper {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        store: TaskStore,
        interval_secs: u64,
        threshold_secs: i64,
    ) -> Self {
        OverdueTaskSweeper {
            gateway,
            store,
            interval_secs,
            threshold_secs,
        }
    }

    /// Starts the sweep loop in the background and returns its handle.
    ///
    /// A tick that fails (database unavailable, for instance) is logged
    /// and the loop carries on with the next interval.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("sweeping overdue tasks every {} seconds", self.interval_secs);
            let mut interval = time::interval(Duration::from_secs(self.interval_secs));

            loop {
                interval.tick().await;
                if let Err(e) = self.tick().await {
                    warn!("overdue task sweep failed: {}", e);
                }
            }
        })
    }

    /// Runs one sweep.
    ///
    /// For each overdue task: an owner the gateway cannot resolve has all
    /// their tasks removed (cascade cleanup); otherwise a channel-mention
    /// reminder is sent, with delivery failures dropped on the floor.
    pub async fn tick(&self) -> Result<(), BotError> {
        let tasks = self.store.overdue_tasks(self.threshold_secs).await?;

        for task in tasks {
            if self.gateway.resolve_user(task.user_id).await.is_none() {
                info!("user {} is gone, removing their tasks", task.user_id);
                self.store.delete_user(task.user_id).await?;
                continue;
            }

            if task.remind_type == RemindType::ChannelMention {
                let body = Self::format_reminder(&task);
                if let Err(e) = self.gateway.send_reminder(task.user_id, &body).await {
                    debug!("dropped reminder for task {}: {}", task.task_id, e);
                }
            }
        }

        Ok(())
    }

    fn format_reminder(task: &Task) -> String {
        match task.due_description() {
            Some(due) => format!(
                "\u{23F0} Task Reminder - Overdue!\n{}\nDue: {}",
                task.task, due
            ),
            None => format!("\u{23F0} Task Reminder - Overdue!\n{}", task.task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::gateway::{GatewayError, MockGateway};
    use chrono::{Duration as ChronoDuration, Local};

    async fn create_test_store() -> TaskStore {
        let db = Database::connect(":memory:").await.unwrap();
        TaskStore::new(&db)
    }

    async fn insert_overdue(store: &TaskStore, user_id: i64, text: &str, remind: RemindType) {
        let past = Local::now().naive_local() - ChronoDuration::seconds(60);
        store
            .insert(user_id, text, Some(past.date()), Some(past.time()), remind)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_tick_sends_channel_mention_reminder() {
        let store = create_test_store().await;
        insert_overdue(&store, 1, "buy milk", RemindType::ChannelMention).await;

        let mut gateway = MockGateway::new();
        gateway
            .expect_resolve_user()
            .returning(|_| Some("alice".to_string()));
        gateway
            .expect_send_reminder()
            .withf(|user_id, body| *user_id == 1 && body.contains("buy milk"))
            .times(1)
            .returning(|_, _| Ok(()));

        let sweeper = OverdueTaskSweeper::new(Arc::new(gateway), store.clone(), 5, 5);
        sweeper.tick().await.unwrap();

        // The reminded task is never deleted by the sweep.
        assert_eq!(store.tasks_for_user(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tick_skips_tasks_without_reminder() {
        let store = create_test_store().await;
        insert_overdue(&store, 1, "quiet task", RemindType::None).await;
        insert_overdue(&store, 1, "dm task", RemindType::DirectMessage).await;

        let mut gateway = MockGateway::new();
        gateway
            .expect_resolve_user()
            .returning(|_| Some("alice".to_string()));
        gateway.expect_send_reminder().times(0);

        let sweeper = OverdueTaskSweeper::new(Arc::new(gateway), store, 5, 5);
        sweeper.tick().await.unwrap();
    }

    #[tokio::test]
    async fn test_tick_cascades_unresolvable_user() {
        let store = create_test_store().await;
        insert_overdue(&store, 1, "orphaned", RemindType::ChannelMention).await;
        store
            .insert(1, "also orphaned", None, None, RemindType::None)
            .await
            .unwrap();

        let mut gateway = MockGateway::new();
        gateway.expect_resolve_user().returning(|_| None);
        gateway.expect_send_reminder().times(0);

        let sweeper = OverdueTaskSweeper::new(Arc::new(gateway), store.clone(), 5, 5);
        sweeper.tick().await.unwrap();

        // Every task of the vanished user is gone, not just the overdue one.
        assert!(store.tasks_for_user(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tick_swallows_delivery_failures() {
        let store = create_test_store().await;
        insert_overdue(&store, 1, "unreachable", RemindType::ChannelMention).await;

        let mut gateway = MockGateway::new();
        gateway
            .expect_resolve_user()
            .returning(|_| Some("alice".to_string()));
        gateway
            .expect_send_reminder()
            .returning(|_, _| Err(GatewayError::Unreachable("blocked".to_string())));

        let sweeper = OverdueTaskSweeper::new(Arc::new(gateway), store.clone(), 5, 5);
        // The failed send must not fail the tick.
        sweeper.tick().await.unwrap();
        assert_eq!(store.tasks_for_user(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tick_ignores_tasks_not_yet_due() {
        let store = create_test_store().await;
        let soon = Local::now().naive_local() + ChronoDuration::minutes(10);
        store
            .insert(
                1,
                "later",
                Some(soon.date()),
                Some(soon.time()),
                RemindType::ChannelMention,
            )
            .await
            .unwrap();

        let mut gateway = MockGateway::new();
        gateway.expect_resolve_user().times(0);
        gateway.expect_send_reminder().times(0);

        let sweeper = OverdueTaskSweeper::new(Arc::new(gateway), store, 5, 5);
        sweeper.tick().await.unwrap();
    }
}
