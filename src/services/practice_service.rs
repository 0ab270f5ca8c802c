use crate::error::AppError;
use crate::models::{PracticeSession, QueueOperation};
use crate::services::queue_service;
use rusqlite::Connection;

pub const PRACTICE_COLUMNS: &str =
    "id, uuid, session_date, duration_minutes, setlist_id, notes";

/// Practice sessions, newest first
pub fn list_sessions(conn: &Connection) -> Result<Vec<PracticeSession>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM practice_sessions WHERE deleted = 0 ORDER BY session_date DESC, id DESC",
        PRACTICE_COLUMNS
    ))?;
    let rows = stmt.query_map([], PracticeSession::from_row)?;

    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row?);
    }
    Ok(sessions)
}

/// Total practice minutes since a given date (home dashboard)
pub fn minutes_since(conn: &Connection, since_date: &str) -> Result<i64, AppError> {
    let minutes: i64 = conn.query_row(
        "SELECT COALESCE(SUM(duration_minutes), 0) FROM practice_sessions
         WHERE deleted = 0 AND session_date >= ?1",
        [since_date],
        |row| row.get(0),
    )?;
    Ok(minutes)
}

pub fn create_session(conn: &Connection, session: &PracticeSession) -> Result<(), AppError> {
    validate(session)?;

    conn.execute(
        "INSERT INTO practice_sessions (uuid, session_date, duration_minutes, setlist_id, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &session.uuid,
            &session.session_date,
            session.duration_minutes,
            &session.setlist_id,
            &session.notes,
        ),
    )?;

    queue_service::enqueue(
        conn,
        "practice_sessions",
        QueueOperation::Create,
        &session.to_payload(),
    )?;
    Ok(())
}

pub fn delete_session(conn: &Connection, uuid: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE practice_sessions SET deleted = 1 WHERE uuid = ?1",
        [uuid],
    )?;

    queue_service::enqueue(
        conn,
        "practice_sessions",
        QueueOperation::Delete,
        &serde_json::json!({ "id": uuid }),
    )?;
    Ok(())
}

fn validate(session: &PracticeSession) -> Result<(), AppError> {
    chrono::NaiveDate::parse_from_str(&session.session_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".to_string()))?;
    if session.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "Duration must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Applies a remote change (pull phase)
pub fn apply_remote(
    conn: &Connection,
    uuid: &str,
    data: &serde_json::Value,
    deleted: bool,
) -> Result<(), AppError> {
    if deleted {
        conn.execute(
            "UPDATE practice_sessions SET deleted = 1 WHERE uuid = ?1",
            [uuid],
        )?;
        return Ok(());
    }

    let session_date = data
        .get("session_date")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Validation("remote session without date".to_string()))?;

    conn.execute(
        "INSERT INTO practice_sessions (uuid, session_date, duration_minutes, setlist_id, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(uuid) DO UPDATE SET
            session_date = excluded.session_date,
            duration_minutes = excluded.duration_minutes,
            setlist_id = excluded.setlist_id,
            notes = excluded.notes,
            deleted = 0",
        (
            uuid,
            session_date,
            data.get("duration_minutes").and_then(|v| v.as_i64()).unwrap_or(0),
            data.get("setlist_id").and_then(|v| v.as_str()),
            data.get("notes").and_then(|v| v.as_str()),
        ),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_list_and_minutes() {
        let conn = test_conn();
        create_session(
            &conn,
            &PracticeSession::new("2026-08-20".to_string(), 90),
        )
        .unwrap();
        create_session(
            &conn,
            &PracticeSession::new("2026-08-24".to_string(), 60),
        )
        .unwrap();

        let sessions = list_sessions(&conn).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_date, "2026-08-24");

        assert_eq!(minutes_since(&conn, "2026-08-22").unwrap(), 60);
        assert_eq!(minutes_since(&conn, "2026-08-01").unwrap(), 150);
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let conn = test_conn();
        let session = PracticeSession::new("2026-08-20".to_string(), 0);
        assert!(matches!(
            create_session(&conn, &session),
            Err(AppError::Validation(_))
        ));
    }
}
