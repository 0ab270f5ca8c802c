use crate::error::AppError;
use crate::models::{QueueOperation, Song};
use crate::services::queue_service;
use rusqlite::Connection;

pub const SONG_COLUMNS: &str =
    "id, uuid, title, artist, song_key, tempo_bpm, duration_seconds, notes";

/// Lists songs, optionally filtered by a title/artist substring
pub fn list_songs(conn: &Connection, filter: Option<&str>) -> Result<Vec<Song>, AppError> {
    let mut songs = Vec::new();

    if let Some(filter) = filter {
        let pattern = format!("%{}%", filter);
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM songs
             WHERE deleted = 0 AND (title LIKE ?1 OR artist LIKE ?1)
             ORDER BY title COLLATE NOCASE",
            SONG_COLUMNS
        ))?;
        let rows = stmt.query_map([&pattern], Song::from_row)?;
        for row in rows {
            songs.push(row?);
        }
    } else {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM songs WHERE deleted = 0 ORDER BY title COLLATE NOCASE",
            SONG_COLUMNS
        ))?;
        let rows = stmt.query_map([], Song::from_row)?;
        for row in rows {
            songs.push(row?);
        }
    }

    Ok(songs)
}

pub fn get_song(conn: &Connection, uuid: &str) -> Result<Song, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM songs WHERE uuid = ?1 AND deleted = 0",
        SONG_COLUMNS
    ))?;
    stmt.query_row([uuid], Song::from_row).map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Song".to_string()),
        other => AppError::Database(other),
    })
}

/// Inserts a song and captures the mutation into the sync outbox
pub fn create_song(conn: &Connection, song: &Song) -> Result<(), AppError> {
    if song.title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }

    conn.execute(
        "INSERT INTO songs (uuid, title, artist, song_key, tempo_bpm, duration_seconds, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &song.uuid,
            &song.title,
            &song.artist,
            &song.song_key,
            song.tempo_bpm,
            song.duration_seconds,
            &song.notes,
        ),
    )?;

    queue_service::enqueue(conn, "songs", QueueOperation::Create, &song.to_payload())?;
    Ok(())
}

/// Updates a song and captures the mutation into the sync outbox
pub fn update_song(conn: &Connection, song: &Song) -> Result<(), AppError> {
    if song.title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }

    let changed = conn.execute(
        "UPDATE songs
         SET title = ?2, artist = ?3, song_key = ?4, tempo_bpm = ?5, duration_seconds = ?6, notes = ?7
         WHERE uuid = ?1 AND deleted = 0",
        (
            &song.uuid,
            &song.title,
            &song.artist,
            &song.song_key,
            song.tempo_bpm,
            song.duration_seconds,
            &song.notes,
        ),
    )?;
    if changed == 0 {
        return Err(AppError::NotFound("Song".to_string()));
    }

    queue_service::enqueue(conn, "songs", QueueOperation::Update, &song.to_payload())?;
    Ok(())
}

/// Soft-deletes a song and captures the deletion into the sync outbox
pub fn delete_song(conn: &Connection, uuid: &str) -> Result<(), AppError> {
    conn.execute("UPDATE songs SET deleted = 1 WHERE uuid = ?1", [uuid])?;

    queue_service::enqueue(
        conn,
        "songs",
        QueueOperation::Delete,
        &serde_json::json!({ "id": uuid }),
    )?;
    Ok(())
}

/// Applies a remote change (pull phase): last-write-wins upsert or soft delete
pub fn apply_remote(
    conn: &Connection,
    uuid: &str,
    data: &serde_json::Value,
    deleted: bool,
) -> Result<(), AppError> {
    if deleted {
        conn.execute("UPDATE songs SET deleted = 1 WHERE uuid = ?1", [uuid])?;
        return Ok(());
    }

    let title = data
        .get("title")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Validation("remote song without title".to_string()))?;

    conn.execute(
        "INSERT INTO songs (uuid, title, artist, song_key, tempo_bpm, duration_seconds, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(uuid) DO UPDATE SET
            title = excluded.title,
            artist = excluded.artist,
            song_key = excluded.song_key,
            tempo_bpm = excluded.tempo_bpm,
            duration_seconds = excluded.duration_seconds,
            notes = excluded.notes,
            deleted = 0",
        (
            uuid,
            title,
            data.get("artist").and_then(|v| v.as_str()),
            data.get("song_key").and_then(|v| v.as_str()),
            data.get("tempo_bpm").and_then(|v| v.as_i64()),
            data.get("duration_seconds").and_then(|v| v.as_i64()),
            data.get("notes").and_then(|v| v.as_str()),
        ),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::models::QueueState;
    use crate::services::status_service::{self, SyncStatus};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let conn = test_conn();
        let song = Song::new("   ".to_string());
        assert!(matches!(
            create_song(&conn, &song),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_crud_captures_outbox_entries() {
        let conn = test_conn();
        let mut song = Song::new("Cold Static".to_string());
        song.artist = Some("The Midnight Owls".to_string());
        create_song(&conn, &song).unwrap();

        // Local row exists and the mutation is queued
        assert_eq!(get_song(&conn, &song.uuid).unwrap().title, "Cold Static");
        let entries = queue_service::query_by_table_and_entity(&conn, "songs", &song.uuid)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].state, QueueState::Pending);
        assert_eq!(
            status_service::fetch_status(&conn, "songs", &song.uuid).await,
            SyncStatus::Pending
        );

        song.song_key = Some("Em".to_string());
        update_song(&conn, &song).unwrap();
        delete_song(&conn, &song.uuid).unwrap();

        let entries = queue_service::query_by_table_and_entity(&conn, "songs", &song.uuid)
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert!(get_song(&conn, &song.uuid).is_err());
    }

    #[test]
    fn test_list_filters_title_and_artist() {
        let conn = test_conn();
        let mut a = Song::new("Driftwood".to_string());
        a.artist = Some("The Owls".to_string());
        let b = Song::new("Horizon".to_string());
        create_song(&conn, &a).unwrap();
        create_song(&conn, &b).unwrap();

        assert_eq!(list_songs(&conn, None).unwrap().len(), 2);
        assert_eq!(list_songs(&conn, Some("owls")).unwrap().len(), 1);
        assert_eq!(list_songs(&conn, Some("hori")).unwrap().len(), 1);
        assert_eq!(list_songs(&conn, Some("xyz")).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_apply_remote_does_not_touch_outbox() {
        let conn = test_conn();
        apply_remote(
            &conn,
            "r1",
            &serde_json::json!({"id": "r1", "title": "Remote Song"}),
            false,
        )
        .unwrap();

        assert_eq!(get_song(&conn, "r1").unwrap().title, "Remote Song");
        // Remote applies must not loop back into the queue
        let entries = queue_service::query_all(&conn).await.unwrap();
        assert!(entries.is_empty());
    }
}
