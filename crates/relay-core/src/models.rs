//! Message history records and their identifiers.
//!
//! A history record is written once per inbound LINE text message and never
//! updated or deleted afterwards. The store assigns both the identifier and
//! the creation timestamp.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned history record identifier.
///
/// Identifiers increase monotonically with insertion order, so the highest
/// id for a given name is the most recent message from that name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct HistoryId(pub i64);

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for HistoryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A persisted inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryRecord {
    /// Identifier assigned by the store.
    pub id: HistoryId,

    /// Sender display name as resolved when the message arrived.
    ///
    /// Not unique: two LINE users can share a display name, and a user can
    /// rename themselves between messages.
    pub name: String,

    /// Original text of the inbound message.
    pub message: String,

    /// LINE user id of the sender.
    pub uid: String,

    /// When the store accepted the record.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistory {
    /// Sender display name.
    pub name: String,
    /// Message text.
    pub message: String,
    /// LINE user id of the sender.
    pub uid: String,
}

impl NewHistory {
    /// Creates an insert payload.
    pub fn new(name: impl Into<String>, message: impl Into<String>, uid: impl Into<String>) -> Self {
        Self { name: name.into(), message: message.into(), uid: uid.into() }
    }

    /// Materializes the record the store will hold once it has assigned an
    /// id and timestamp.
    pub fn into_record(self, id: HistoryId, created_at: DateTime<Utc>) -> HistoryRecord {
        HistoryRecord { id, name: self.name, message: self.message, uid: self.uid, created_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_id_serializes_as_bare_number() {
        let json = serde_json::to_string(&HistoryId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn into_record_keeps_fields() {
        let now = Utc::now();
        let record = NewHistory::new("Alice", "hi", "U123").into_record(HistoryId(7), now);

        assert_eq!(record.id, HistoryId(7));
        assert_eq!(record.name, "Alice");
        assert_eq!(record.message, "hi");
        assert_eq!(record.uid, "U123");
        assert_eq!(record.created_at, now);
    }
}
