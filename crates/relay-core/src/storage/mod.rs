//! Record store for message history.
//!
//! The HTTP layer only ever sees the `HistoryStore` trait. `Storage` is the
//! PostgreSQL implementation backed by the repository in [`histories`];
//! [`mock::MockHistoryStore`] keeps records in memory for tests.
//!
//! The store is append-only from the relay's point of view: there is no
//! update or delete operation on the trait.

use std::{future::Future, pin::Pin, sync::Arc};

use sqlx::PgPool;

pub mod histories;
pub mod mock;

use crate::{
    error::Result,
    models::{HistoryRecord, NewHistory},
};

/// Boxed future returned by every `HistoryStore` operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage operations required by the relay handlers.
pub trait HistoryStore: Send + Sync + 'static {
    /// Persists a new record and returns it with its assigned id.
    fn create(&self, history: NewHistory) -> StoreFuture<'_, HistoryRecord>;

    /// Returns every record with exactly this display name, oldest first.
    fn find_all_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Vec<HistoryRecord>>;

    /// Returns the most recent record with this display name, if any.
    fn find_one_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<HistoryRecord>>;

    /// Verifies the backing store is reachable.
    fn health_check(&self) -> StoreFuture<'_, ()>;
}

/// PostgreSQL-backed storage.
#[derive(Clone)]
pub struct Storage {
    /// Repository for history records.
    pub histories: Arc<histories::Repository>,
}

impl Storage {
    /// Creates a new storage instance over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        let pool = Arc::new(pool);
        Self { histories: Arc::new(histories::Repository::new(pool)) }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Migration` if any migration fails to apply.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&*self.histories.pool()).await?;
        Ok(())
    }
}

impl HistoryStore for Storage {
    fn create(&self, history: NewHistory) -> StoreFuture<'_, HistoryRecord> {
        Box::pin(async move { self.histories.create(&history).await })
    }

    fn find_all_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Vec<HistoryRecord>> {
        Box::pin(async move { self.histories.find_all_by_name(name).await })
    }

    fn find_one_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<HistoryRecord>> {
        Box::pin(async move { self.histories.find_latest_by_name(name).await })
    }

    fn health_check(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.histories.pool()).await?;
            Ok(())
        })
    }
}
