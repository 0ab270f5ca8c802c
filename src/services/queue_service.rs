/// Queue Store: the outbox of pending mutations that the status subsystem
/// reads and the push engine drains.
use crate::error::AppError;
use crate::models::{QueueEntry, QueueOperation, QueueState};
use rusqlite::Connection;

pub const QUEUE_COLUMNS: &str =
    "id, target_table, operation, payload, state, queued_at, retry_count, last_error";

/// Captures one local mutation into the outbox. Returns the new entry id.
///
/// The payload must carry the entity id at `$.id`; everything downstream
/// (status lookups, the push engine) relies on it.
pub fn enqueue(
    conn: &Connection,
    target_table: &str,
    operation: QueueOperation,
    payload: &serde_json::Value,
) -> Result<String, AppError> {
    if payload.get("id").and_then(|v| v.as_str()).is_none() {
        return Err(AppError::Validation(
            "queue payload is missing the entity id".to_string(),
        ));
    }

    let id = ulid::Ulid::new().to_string();
    let queued_at = chrono::Utc::now().timestamp_millis();
    let payload_text = serde_json::to_string(payload)?;

    conn.execute(
        "INSERT INTO sync_queue (id, target_table, operation, payload, state, queued_at)
         VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
        (&id, target_table, operation.as_str(), &payload_text, queued_at),
    )?;

    Ok(id)
}

/// All queue entries, in insertion order
pub async fn query_all(conn: &Connection) -> Result<Vec<QueueEntry>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sync_queue ORDER BY rowid",
        QUEUE_COLUMNS
    ))?;
    let rows = stmt.query_map([], QueueEntry::from_row)?;
    collect_entries(rows)
}

/// Queue entries targeting one table, in insertion order
pub async fn query_by_table(
    conn: &Connection,
    target_table: &str,
) -> Result<Vec<QueueEntry>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sync_queue WHERE target_table = ?1 ORDER BY rowid",
        QUEUE_COLUMNS
    ))?;
    let rows = stmt.query_map([target_table], QueueEntry::from_row)?;
    collect_entries(rows)
}

/// Queue entries for one entity, in insertion order
pub async fn query_by_table_and_entity(
    conn: &Connection,
    target_table: &str,
    entity_id: &str,
) -> Result<Vec<QueueEntry>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sync_queue
         WHERE target_table = ?1 AND json_extract(payload, '$.id') = ?2
         ORDER BY rowid",
        QUEUE_COLUMNS
    ))?;
    let rows = stmt.query_map([target_table, entity_id], QueueEntry::from_row)?;
    collect_entries(rows)
}

fn collect_entries(
    rows: impl Iterator<Item = rusqlite::Result<QueueEntry>>,
) -> Result<Vec<QueueEntry>, AppError> {
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

/// Entries the push engine should attempt next: pending first, oldest first
pub fn due_entries(conn: &Connection) -> Result<Vec<QueueEntry>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sync_queue WHERE state = 'pending' ORDER BY queued_at, rowid",
        QUEUE_COLUMNS
    ))?;
    let rows = stmt.query_map([], QueueEntry::from_row)?;
    collect_entries(rows)
}

/// Returns in-flight entries to the due set. Rows stuck in 'syncing' exist
/// only when a previous run died between marking and resolving a push;
/// reclaiming them at cycle start makes those mutations visible again
/// instead of rendering "syncing" forever.
pub fn reclaim_in_flight(conn: &Connection) -> Result<usize, AppError> {
    let reclaimed = conn.execute(
        "UPDATE sync_queue SET state = 'pending' WHERE state = 'syncing'",
        [],
    )?;
    Ok(reclaimed)
}

pub fn mark_syncing(conn: &Connection, entry_id: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE sync_queue SET state = 'syncing' WHERE id = ?1",
        [entry_id],
    )?;
    Ok(())
}

/// Records a recoverable attempt failure: back to pending with the error kept
pub fn mark_retry(conn: &Connection, entry_id: &str, error: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE sync_queue
         SET state = 'pending', retry_count = retry_count + 1, last_error = ?2
         WHERE id = ?1",
        (entry_id, error),
    )?;
    Ok(())
}

/// Marks an entry terminally failed
pub fn mark_failed(conn: &Connection, entry_id: &str, error: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE sync_queue
         SET state = 'failed', retry_count = retry_count + 1, last_error = ?2
         WHERE id = ?1",
        (entry_id, error),
    )?;
    Ok(())
}

/// Removes a successfully synced entry. Absence of rows is the "synced"
/// terminal state for status derivation.
pub fn remove(conn: &Connection, entry_id: &str) -> Result<(), AppError> {
    conn.execute("DELETE FROM sync_queue WHERE id = ?1", [entry_id])?;
    Ok(())
}

/// Number of entries still waiting to reach the backend
pub fn pending_count(conn: &Connection) -> Result<usize, AppError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sync_queue WHERE state != 'failed'",
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Number of terminally failed entries
pub fn failed_count(conn: &Connection) -> Result<usize, AppError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sync_queue WHERE state = 'failed'",
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use serde_json::json;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_enqueue_requires_entity_id() {
        let conn = test_conn();
        let err = enqueue(&conn, "songs", QueueOperation::Create, &json!({"title": "x"}));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_query_by_table_and_entity_filters_on_payload_id() {
        let conn = test_conn();
        enqueue(&conn, "songs", QueueOperation::Create, &json!({"id": "s1"})).unwrap();
        enqueue(&conn, "songs", QueueOperation::Update, &json!({"id": "s2"})).unwrap();
        enqueue(&conn, "shows", QueueOperation::Create, &json!({"id": "s1"})).unwrap();

        let entries = query_by_table_and_entity(&conn, "songs", "s1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_id(), Some("s1"));
        assert_eq!(entries[0].state, QueueState::Pending);

        let all = query_all(&conn).await.unwrap();
        assert_eq!(all.len(), 3);

        let songs = query_by_table(&conn, "songs").await.unwrap();
        assert_eq!(songs.len(), 2);
    }

    #[tokio::test]
    async fn test_state_transitions_and_removal() {
        let conn = test_conn();
        let id = enqueue(&conn, "songs", QueueOperation::Update, &json!({"id": "s1"})).unwrap();

        mark_syncing(&conn, &id).unwrap();
        let entries = query_by_table_and_entity(&conn, "songs", "s1").await.unwrap();
        assert_eq!(entries[0].state, QueueState::Syncing);

        mark_retry(&conn, &id, "connection refused").unwrap();
        let entries = query_by_table_and_entity(&conn, "songs", "s1").await.unwrap();
        assert_eq!(entries[0].state, QueueState::Pending);
        assert_eq!(entries[0].retry_count, 1);
        assert_eq!(entries[0].last_error.as_deref(), Some("connection refused"));

        mark_failed(&conn, &id, "409 Conflict").unwrap();
        let entries = query_by_table_and_entity(&conn, "songs", "s1").await.unwrap();
        assert_eq!(entries[0].state, QueueState::Failed);
        assert_eq!(failed_count(&conn).unwrap(), 1);

        remove(&conn, &id).unwrap();
        let entries = query_by_table_and_entity(&conn, "songs", "s1").await.unwrap();
        assert!(entries.is_empty());
        assert_eq!(pending_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_reclaim_returns_stuck_syncing_entries_to_due() {
        let conn = test_conn();
        let id = enqueue(&conn, "songs", QueueOperation::Update, &json!({"id": "s1"})).unwrap();
        mark_syncing(&conn, &id).unwrap();

        // A crash between mark_syncing and the push outcome leaves the entry
        // invisible to the scheduler
        assert!(due_entries(&conn).unwrap().is_empty());

        assert_eq!(reclaim_in_flight(&conn).unwrap(), 1);
        let due = due_entries(&conn).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, id);
        assert_eq!(due[0].state, QueueState::Pending);

        // Failed entries stay parked
        mark_failed(&conn, &id, "rejected").unwrap();
        assert_eq!(reclaim_in_flight(&conn).unwrap(), 0);
        assert!(due_entries(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_due_entries_skips_failed_and_orders_oldest_first() {
        let conn = test_conn();
        let first = enqueue(&conn, "songs", QueueOperation::Create, &json!({"id": "a"})).unwrap();
        let second = enqueue(&conn, "songs", QueueOperation::Update, &json!({"id": "b"})).unwrap();
        mark_failed(&conn, &second, "rejected").unwrap();
        let third = enqueue(&conn, "songs", QueueOperation::Update, &json!({"id": "c"})).unwrap();

        let due = due_entries(&conn).unwrap();
        let ids: Vec<&str> = due.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec![first.as_str(), third.as_str()]);
    }
}
