use crate::error::AppError;
use crate::models::{QueueOperation, Show};
use crate::services::queue_service;
use rusqlite::Connection;

pub const SHOW_COLUMNS: &str =
    "id, uuid, venue, city, show_date, start_time, setlist_id, notes";

/// Lists shows, upcoming first or past only
pub fn list_shows(conn: &Connection, upcoming: bool, today: &str) -> Result<Vec<Show>, AppError> {
    let sql = if upcoming {
        format!(
            "SELECT {} FROM shows WHERE deleted = 0 AND show_date >= ?1 ORDER BY show_date",
            SHOW_COLUMNS
        )
    } else {
        format!(
            "SELECT {} FROM shows WHERE deleted = 0 AND show_date < ?1 ORDER BY show_date DESC",
            SHOW_COLUMNS
        )
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([today], Show::from_row)?;

    let mut shows = Vec::new();
    for row in rows {
        shows.push(row?);
    }
    Ok(shows)
}

/// The next upcoming show, if any (home dashboard)
pub fn next_show(conn: &Connection, today: &str) -> Result<Option<Show>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM shows WHERE deleted = 0 AND show_date >= ?1 ORDER BY show_date LIMIT 1",
        SHOW_COLUMNS
    ))?;

    match stmt.query_row([today], Show::from_row) {
        Ok(show) => Ok(Some(show)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

pub fn get_show(conn: &Connection, uuid: &str) -> Result<Show, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM shows WHERE uuid = ?1 AND deleted = 0",
        SHOW_COLUMNS
    ))?;
    stmt.query_row([uuid], Show::from_row).map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Show".to_string()),
        other => AppError::Database(other),
    })
}

pub fn create_show(conn: &Connection, show: &Show) -> Result<(), AppError> {
    validate(show)?;

    conn.execute(
        "INSERT INTO shows (uuid, venue, city, show_date, start_time, setlist_id, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &show.uuid,
            &show.venue,
            &show.city,
            &show.show_date,
            &show.start_time,
            &show.setlist_id,
            &show.notes,
        ),
    )?;

    queue_service::enqueue(conn, "shows", QueueOperation::Create, &show.to_payload())?;
    Ok(())
}

pub fn update_show(conn: &Connection, show: &Show) -> Result<(), AppError> {
    validate(show)?;

    let changed = conn.execute(
        "UPDATE shows
         SET venue = ?2, city = ?3, show_date = ?4, start_time = ?5, setlist_id = ?6, notes = ?7
         WHERE uuid = ?1 AND deleted = 0",
        (
            &show.uuid,
            &show.venue,
            &show.city,
            &show.show_date,
            &show.start_time,
            &show.setlist_id,
            &show.notes,
        ),
    )?;
    if changed == 0 {
        return Err(AppError::NotFound("Show".to_string()));
    }

    queue_service::enqueue(conn, "shows", QueueOperation::Update, &show.to_payload())?;
    Ok(())
}

pub fn delete_show(conn: &Connection, uuid: &str) -> Result<(), AppError> {
    conn.execute("UPDATE shows SET deleted = 1 WHERE uuid = ?1", [uuid])?;

    queue_service::enqueue(
        conn,
        "shows",
        QueueOperation::Delete,
        &serde_json::json!({ "id": uuid }),
    )?;
    Ok(())
}

fn validate(show: &Show) -> Result<(), AppError> {
    if show.venue.trim().is_empty() {
        return Err(AppError::Validation("Venue must not be empty".to_string()));
    }
    chrono::NaiveDate::parse_from_str(&show.show_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".to_string()))?;
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
        conn.execute("UPDATE shows SET deleted = 1 WHERE uuid = ?1", [uuid])?;
        return Ok(());
    }

    let venue = data
        .get("venue")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Validation("remote show without venue".to_string()))?;
    let show_date = data
        .get("show_date")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Validation("remote show without date".to_string()))?;

    conn.execute(
        "INSERT INTO shows (uuid, venue, city, show_date, start_time, setlist_id, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(uuid) DO UPDATE SET
            venue = excluded.venue,
            city = excluded.city,
            show_date = excluded.show_date,
            start_time = excluded.start_time,
            setlist_id = excluded.setlist_id,
            notes = excluded.notes,
            deleted = 0",
        (
            uuid,
            venue,
            data.get("city").and_then(|v| v.as_str()),
            show_date,
            data.get("start_time").and_then(|v| v.as_str()),
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
    fn test_upcoming_and_past_split() {
        let conn = test_conn();
        create_show(&conn, &Show::new("Kulturhaus".to_string(), "2026-09-12".to_string()))
            .unwrap();
        create_show(&conn, &Show::new("Jazzkeller".to_string(), "2026-07-01".to_string()))
            .unwrap();

        let upcoming = list_shows(&conn, true, "2026-08-25").unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].venue, "Kulturhaus");

        let past = list_shows(&conn, false, "2026-08-25").unwrap();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].venue, "Jazzkeller");

        let next = next_show(&conn, "2026-08-25").unwrap().unwrap();
        assert_eq!(next.venue, "Kulturhaus");
    }

    #[test]
    fn test_validate_rejects_bad_date() {
        let conn = test_conn();
        let show = Show::new("Somewhere".to_string(), "12.09.2026".to_string());
        assert!(matches!(
            create_show(&conn, &show),
            Err(AppError::Validation(_))
        ));
    }
}
