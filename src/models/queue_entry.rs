use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Mutation kind of a queue entry. Retained for context; status derivation
/// does not branch on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueueOperation {
    Create,
    Update,
    Delete,
}

impl QueueOperation {
    pub fn as_str(&self) -> &str {
        match self {
            QueueOperation::Create => "create",
            QueueOperation::Update => "update",
            QueueOperation::Delete => "delete",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "create" => QueueOperation::Create,
            "delete" => QueueOperation::Delete,
            _ => QueueOperation::Update,
        }
    }
}

/// Lifecycle state of one queue entry. Successfully synced entries are
/// removed from the table, so there is no "done" variant; `Other` covers
/// values written by newer app versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Pending,
    Syncing,
    Failed,
    Other,
}

impl QueueState {
    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => QueueState::Pending,
            "syncing" => QueueState::Syncing,
            "failed" => QueueState::Failed,
            _ => QueueState::Other,
        }
    }
}

/// One pending (or failed) mutation in the sync outbox
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    /// ULID assigned by the queue store on insert
    pub id: String,
    pub target_table: String,
    pub operation: QueueOperation,
    /// Full entity snapshot; the entity id lives at `$.id`
    pub payload: serde_json::Value,
    pub state: QueueState,
    /// Milliseconds since epoch; ordering key for status derivation
    pub queued_at: i64,
    pub retry_count: i64,
    pub last_error: Option<String>,
}

impl QueueEntry {
    /// Entity id embedded in the payload, if present
    pub fn entity_id(&self) -> Option<&str> {
        self.payload.get("id").and_then(|v| v.as_str())
    }

    /// Maps a row selected with the column order of `queue_service::QUEUE_COLUMNS`
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let operation: String = row.get(2)?;
        let payload_text: String = row.get(3)?;
        let state: String = row.get(4)?;

        let payload = serde_json::from_str(&payload_text).unwrap_or(serde_json::Value::Null);

        Ok(Self {
            id: row.get(0)?,
            target_table: row.get(1)?,
            operation: QueueOperation::from_str(&operation),
            payload,
            state: QueueState::from_str(&state),
            queued_at: row.get(5)?,
            retry_count: row.get(6)?,
            last_error: row.get(7)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_reads_payload() {
        let entry = QueueEntry {
            id: "01J0000000000000000000000".to_string(),
            target_table: "songs".to_string(),
            operation: QueueOperation::Create,
            payload: json!({"id": "abc-123", "title": "Horizon"}),
            state: QueueState::Pending,
            queued_at: 1,
            retry_count: 0,
            last_error: None,
        };
        assert_eq!(entry.entity_id(), Some("abc-123"));
    }

    #[test]
    fn test_unknown_state_maps_to_other() {
        assert_eq!(QueueState::from_str("pending"), QueueState::Pending);
        assert_eq!(QueueState::from_str("done"), QueueState::Other);
        assert_eq!(QueueState::from_str(""), QueueState::Other);
    }
}
