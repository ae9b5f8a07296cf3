//! Core domain models and storage for the LINE relay.
//!
//! Defines the message history record, the error taxonomy for storage
//! failures, and the `HistoryStore` seam the HTTP layer depends on. The
//! PostgreSQL implementation and an in-memory mock both live here so every
//! other crate can swap one for the other.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;

pub use error::{CoreError, Result};
pub use models::{HistoryId, HistoryRecord, NewHistory};
pub use storage::{HistoryStore, Storage};
