//! In-memory history store for testing.
//!
//! Assigns sequential ids starting at 1 and keeps records in insertion
//! order. Failures can be injected per operation; each injected error is
//! consumed by the next matching call.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::{HistoryStore, StoreFuture};
use crate::{
    error::CoreError,
    models::{HistoryId, HistoryRecord, NewHistory},
};

#[derive(Default)]
struct InjectedErrors {
    create: Option<String>,
    find: Option<String>,
    health: Option<String>,
}

/// Mock history store without a database.
#[derive(Clone, Default)]
pub struct MockHistoryStore {
    records: Arc<RwLock<Vec<HistoryRecord>>>,
    errors: Arc<RwLock<InjectedErrors>>,
}

impl MockHistoryStore {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record directly, bypassing error injection.
    pub async fn seed(&self, history: NewHistory) -> HistoryRecord {
        let mut records = self.records.write().await;
        let record = history.into_record(next_id(&records), Utc::now());
        records.push(record.clone());
        record
    }

    /// Returns every stored record in insertion order.
    pub async fn records(&self) -> Vec<HistoryRecord> {
        self.records.read().await.clone()
    }

    /// Fails the next `create` call with the given message.
    pub async fn inject_create_error(&self, message: impl Into<String>) {
        self.errors.write().await.create = Some(message.into());
    }

    /// Fails the next `find_all_by_name` or `find_one_by_name` call.
    pub async fn inject_find_error(&self, message: impl Into<String>) {
        self.errors.write().await.find = Some(message.into());
    }

    /// Fails the next `health_check` call.
    pub async fn inject_health_error(&self, message: impl Into<String>) {
        self.errors.write().await.health = Some(message.into());
    }
}

fn next_id(records: &[HistoryRecord]) -> HistoryId {
    HistoryId(records.last().map_or(1, |r| r.id.0 + 1))
}

impl HistoryStore for MockHistoryStore {
    fn create(&self, history: NewHistory) -> StoreFuture<'_, HistoryRecord> {
        Box::pin(async move {
            if let Some(error) = self.errors.write().await.create.take() {
                return Err(CoreError::Database(error));
            }

            let mut records = self.records.write().await;
            let record = history.into_record(next_id(&records), Utc::now());
            records.push(record.clone());
            Ok(record)
        })
    }

    fn find_all_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Vec<HistoryRecord>> {
        Box::pin(async move {
            if let Some(error) = self.errors.write().await.find.take() {
                return Err(CoreError::Database(error));
            }

            Ok(self.records.read().await.iter().filter(|r| r.name == name).cloned().collect())
        })
    }

    fn find_one_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<HistoryRecord>> {
        Box::pin(async move {
            if let Some(error) = self.errors.write().await.find.take() {
                return Err(CoreError::Database(error));
            }

            Ok(self.records.read().await.iter().rev().find(|r| r.name == name).cloned())
        })
    }

    fn health_check(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            match self.errors.write().await.health.take() {
                Some(error) => Err(CoreError::Database(error)),
                None => Ok(()),
            }
        })
    }
}
