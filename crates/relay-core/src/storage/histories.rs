//! Repository for history record database operations.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{HistoryRecord, NewHistory},
};

/// Repository for history record database operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Inserts a history record and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    pub async fn create(&self, history: &NewHistory) -> Result<HistoryRecord> {
        let record = sqlx::query_as::<_, HistoryRecord>(
            r"
            INSERT INTO histories (name, message, uid)
            VALUES ($1, $2, $3)
            RETURNING id, name, message, uid, created_at
            ",
        )
        .bind(&history.name)
        .bind(&history.message)
        .bind(&history.uid)
        .fetch_one(&*self.pool)
        .await?;

        Ok(record)
    }

    /// Finds every record with the given display name, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn find_all_by_name(&self, name: &str) -> Result<Vec<HistoryRecord>> {
        let records = sqlx::query_as::<_, HistoryRecord>(
            r"
            SELECT id, name, message, uid, created_at
            FROM histories
            WHERE name = $1
            ORDER BY id ASC
            ",
        )
        .bind(name)
        .fetch_all(&*self.pool)
        .await?;

        Ok(records)
    }

    /// Finds the most recent record with the given display name.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn find_latest_by_name(&self, name: &str) -> Result<Option<HistoryRecord>> {
        let record = sqlx::query_as::<_, HistoryRecord>(
            r"
            SELECT id, name, message, uid, created_at
            FROM histories
            WHERE name = $1
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repository_can_be_created() {
        let pool = sqlx::PgPool::connect_lazy("postgresql://test").unwrap();
        let repo = Repository::new(Arc::new(pool));
        assert_eq!(Arc::strong_count(&repo.pool()), 2);
    }
}
