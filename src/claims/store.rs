//! Query wrappers for the claims table.
//!
//! The store does not check domain validity of the data passed to it; the
//! checks live in [`crate::claims::ClaimValidator`], which runs them and
//! the insert inside one transaction. To support that, the query bodies
//! are associated functions over any SQLite executor, with pool-level
//! convenience methods in front.

use chrono::NaiveDateTime;
use sqlx::{Sqlite, SqlitePool};

use crate::claims::claim::{Claim, ClaimFilter, Dimension};
use crate::db::{Database, DbError};

type ClaimRow = (i64, i64, i64, i64, NaiveDateTime);

const CLAIM_COLUMNS: &str = "user_id, claim_x, claim_y, dimension, claim_time";

/// Repository for claim queries.
#[derive(Clone)]
pub struct ClaimStore {
    pool: SqlitePool,
}

impl ClaimStore {
    pub fn new(db: &Database) -> Self {
        ClaimStore {
            pool: db.pool().clone(),
        }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts a claim and returns the stored row.
    pub async fn insert(
        &self,
        user_id: i64,
        claim_x: i64,
        claim_y: i64,
        dimension: Dimension,
    ) -> Result<Claim, DbError> {
        Self::insert_with(&self.pool, user_id, claim_x, claim_y, dimension).await
    }

    /// Returns the claims matching `filter`, omitted fields unfiltered.
    pub async fn claims(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, DbError> {
        let mut sql = format!("SELECT {CLAIM_COLUMNS} FROM claims");
        let mut conditions = Vec::new();
        if filter.user_id.is_some() {
            conditions.push("user_id = ?");
        }
        if filter.claim_x.is_some() {
            conditions.push("claim_x = ?");
        }
        if filter.claim_y.is_some() {
            conditions.push("claim_y = ?");
        }
        if filter.dimension.is_some() {
            conditions.push("dimension = ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        let mut query = sqlx::query_as::<_, ClaimRow>(&sql);
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id);
        }
        if let Some(claim_x) = filter.claim_x {
            query = query.bind(claim_x);
        }
        if let Some(claim_y) = filter.claim_y {
            query = query.bind(claim_y);
        }
        if let Some(dimension) = filter.dimension {
            query = query.bind(dimension.as_i64());
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    /// Deletes the claim at exactly `(claim_x, claim_y)` in `dimension`.
    ///
    /// Returns whether a claim existed there. Removing a non-existent
    /// claim is a no-op, not an error.
    pub async fn remove(
        &self,
        claim_x: i64,
        claim_y: i64,
        dimension: Dimension,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            DELETE FROM claims
            WHERE claim_x = ? AND claim_y = ? AND dimension = ?
            "#,
        )
        .bind(claim_x)
        .bind(claim_y)
        .bind(dimension.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns every claim in `dimension` whose Euclidean distance to
    /// `(claim_x, claim_y)` is strictly less than `radius`.
    pub async fn intersecting(
        &self,
        claim_x: i64,
        claim_y: i64,
        dimension: Dimension,
        radius: i64,
    ) -> Result<Vec<Claim>, DbError> {
        Self::intersecting_with(&self.pool, claim_x, claim_y, dimension, radius).await
    }

    /// Number of claims `user_id` holds in `dimension`.
    pub async fn count_for_user(
        &self,
        user_id: i64,
        dimension: Dimension,
    ) -> Result<i64, DbError> {
        Self::count_for_user_with(&self.pool, user_id, dimension).await
    }

    pub(crate) async fn insert_with<'e, E>(
        executor: E,
        user_id: i64,
        claim_x: i64,
        claim_y: i64,
        dimension: Dimension,
    ) -> Result<Claim, DbError>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "INSERT INTO claims (user_id, claim_x, claim_y, dimension) \
             VALUES (?, ?, ?, ?) RETURNING {CLAIM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(user_id)
            .bind(claim_x)
            .bind(claim_y)
            .bind(dimension.as_i64())
            .fetch_one(executor)
            .await?;
        Ok(from_row(row))
    }

    // Distance comparison is done on squared integers so no SQL math
    // extension is needed: dx*dx + dy*dy < radius*radius.
    pub(crate) async fn intersecting_with<'e, E>(
        executor: E,
        claim_x: i64,
        claim_y: i64,
        dimension: Dimension,
        radius: i64,
    ) -> Result<Vec<Claim>, DbError>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {CLAIM_COLUMNS} FROM claims \
             WHERE dimension = ? \
             AND (claim_x - ?) * (claim_x - ?) + (claim_y - ?) * (claim_y - ?) < ? * ?"
        );
        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(dimension.as_i64())
            .bind(claim_x)
            .bind(claim_x)
            .bind(claim_y)
            .bind(claim_y)
            .bind(radius)
            .bind(radius)
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    pub(crate) async fn count_for_user_with<'e, E>(
        executor: E,
        user_id: i64,
        dimension: Dimension,
    ) -> Result<i64, DbError>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM claims
            WHERE user_id = ? AND dimension = ?
            "#,
        )
        .bind(user_id)
        .bind(dimension.as_i64())
        .fetch_one(executor)
        .await?;
        Ok(count)
    }
}

fn from_row((user_id, claim_x, claim_y, dimension, claim_time): ClaimRow) -> Claim {
    Claim {
        user_id,
        claim_x,
        claim_y,
        dimension: Dimension::from_i64(dimension).unwrap_or_default(),
        claim_time,
    }
}
