//! Query wrappers for the users and todo tables.
//!
//! Users exist only so the todo foreign key has something to cascade
//! from; [`TaskStore::ensure_user`] upserts the row before every task
//! insert. Overdue selection narrows in SQL to rows carrying a date or a
//! time and applies the threshold against the wall clock in the store, so
//! the NULL-combination rules live in one place ([`Task::due_instant`]).

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::SqlitePool;

use crate::db::{Database, DbError};
use crate::tasks::task::{RemindType, Task};

type TaskRow = (
    i64,
    i64,
    String,
    Option<NaiveDate>,
    Option<NaiveTime>,
    i64,
    NaiveDateTime,
);

const TASK_COLUMNS: &str = "task_id, user_id, task, date, time, remind_type, datetime_created";

/// Repository for task queries.
#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    pub fn new(db: &Database) -> Self {
        TaskStore {
            pool: db.pool().clone(),
        }
    }

    /// Inserts the user row if absent.
    pub async fn ensure_user(&self, user_id: i64) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id)
            VALUES (?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a task and returns the stored row.
    ///
    /// # Errors
    ///
    /// [`DbError::TaskExists`] when the user already has a task with the
    /// same text.
    pub async fn insert(
        &self,
        user_id: i64,
        task: &str,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        remind_type: RemindType,
    ) -> Result<Task, DbError> {
        self.ensure_user(user_id).await?;

        let sql = format!(
            "INSERT INTO todo (user_id, task, date, time, remind_type) \
             VALUES (?, ?, ?, ?, ?) RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .bind(task)
            .bind(date)
            .bind(time)
            .bind(remind_type.as_i64())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DbError::TaskExists(task.to_string())
                }
                _ => DbError::Sqlx(e),
            })?;
        Ok(from_row(row))
    }

    /// Fetches a task by id.
    pub async fn get_by_id(&self, task_id: i64) -> Result<Option<Task>, DbError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM todo WHERE task_id = ?");
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(from_row))
    }

    /// All tasks owned by `user_id`, in creation order.
    pub async fn tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>, DbError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM todo WHERE user_id = ? ORDER BY task_id");
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    /// Tasks whose due instant passed at least `threshold_secs` ago.
    ///
    /// Tasks without a date and without a time are never overdue.
    pub async fn overdue_tasks(&self, threshold_secs: i64) -> Result<Vec<Task>, DbError> {
        let sql =
            format!("SELECT {TASK_COLUMNS} FROM todo WHERE date IS NOT NULL OR time IS NOT NULL");
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let now = Local::now().naive_local();
        let cutoff = now - Duration::seconds(threshold_secs);
        let today = now.date();
        Ok(rows
            .into_iter()
            .map(from_row)
            .filter(|task| {
                task.due_instant(today)
                    .is_some_and(|due| due <= cutoff)
            })
            .collect())
    }

    /// Tasks of `user_id` whose due date lies strictly in the past.
    pub async fn overdue_tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>, DbError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM todo WHERE user_id = ? AND date IS NOT NULL AND date < ?"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .bind(Local::now().date_naive())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    /// Deletes and returns every task whose due date lies more than
    /// `min_overdue` in the past. Age-based trimming, explicit only.
    pub async fn trim_older_than(&self, min_overdue: Duration) -> Result<Vec<Task>, DbError> {
        let cutoff = (Local::now() - min_overdue).date_naive();
        let sql = format!(
            "DELETE FROM todo WHERE date IS NOT NULL AND date < ? RETURNING {TASK_COLUMNS}"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    /// Deletes a task by id. Returns whether it existed.
    pub async fn delete(&self, task_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM todo WHERE task_id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes every task owned by `user_id`.
    pub async fn delete_user_tasks(&self, user_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM todo WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deletes the user row itself; the todo foreign key cascades, so all
    /// of the user's tasks go with it.
    pub async fn delete_user(&self, user_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn from_row(
    (task_id, user_id, task, date, time, remind_type, datetime_created): TaskRow,
) -> Task {
    Task {
        task_id,
        user_id,
        task,
        date,
        time,
        remind_type: RemindType::from_i64(remind_type).unwrap_or_default(),
        datetime_created,
    }
}
