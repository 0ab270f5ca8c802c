use crate::error::AppError;
use crate::models::{QueueOperation, Setlist, SetlistSong, Song};
use crate::services::{queue_service, song_service};
use rusqlite::Connection;

pub const SETLIST_COLUMNS: &str = "id, uuid, name, notes";

pub fn list_setlists(conn: &Connection) -> Result<Vec<Setlist>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM setlists WHERE deleted = 0 ORDER BY name COLLATE NOCASE",
        SETLIST_COLUMNS
    ))?;
    let rows = stmt.query_map([], Setlist::from_row)?;

    let mut setlists = Vec::new();
    for row in rows {
        setlists.push(row?);
    }
    Ok(setlists)
}

pub fn get_setlist(conn: &Connection, uuid: &str) -> Result<Setlist, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM setlists WHERE uuid = ?1 AND deleted = 0",
        SETLIST_COLUMNS
    ))?;
    stmt.query_row([uuid], Setlist::from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Setlist".to_string()),
            other => AppError::Database(other),
        })
}

/// Songs of a setlist in playing order
pub fn songs_in_setlist(conn: &Connection, setlist_id: &str) -> Result<Vec<SetlistSong>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, ss.position FROM setlist_songs ss
         JOIN songs s ON s.uuid = ss.song_id
         WHERE ss.setlist_id = ?1 AND s.deleted = 0
         ORDER BY ss.position",
        song_service::SONG_COLUMNS
            .split(", ")
            .map(|c| format!("s.{}", c))
            .collect::<Vec<_>>()
            .join(", ")
    ))?;

    let rows = stmt.query_map([setlist_id], |row| {
        Ok(SetlistSong {
            song: Song::from_row(row)?,
            position: row.get(8)?,
        })
    })?;

    let mut songs = Vec::new();
    for row in rows {
        songs.push(row?);
    }
    Ok(songs)
}

fn ordered_song_ids(conn: &Connection, setlist_id: &str) -> Result<Vec<String>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT song_id FROM setlist_songs WHERE setlist_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map([setlist_id], |row| row.get::<_, String>(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}

/// Captures the current state of a setlist (including song order) into the outbox
fn capture_update(conn: &Connection, setlist: &Setlist) -> Result<(), AppError> {
    let song_ids = ordered_song_ids(conn, &setlist.uuid)?;
    queue_service::enqueue(
        conn,
        "setlists",
        QueueOperation::Update,
        &setlist.to_payload(&song_ids),
    )?;
    Ok(())
}

pub fn create_setlist(conn: &Connection, setlist: &Setlist) -> Result<(), AppError> {
    if setlist.name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".to_string()));
    }

    conn.execute(
        "INSERT INTO setlists (uuid, name, notes) VALUES (?1, ?2, ?3)",
        (&setlist.uuid, &setlist.name, &setlist.notes),
    )?;

    queue_service::enqueue(
        conn,
        "setlists",
        QueueOperation::Create,
        &setlist.to_payload(&[]),
    )?;
    Ok(())
}

pub fn update_setlist(conn: &Connection, setlist: &Setlist) -> Result<(), AppError> {
    if setlist.name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".to_string()));
    }

    let changed = conn.execute(
        "UPDATE setlists SET name = ?2, notes = ?3 WHERE uuid = ?1 AND deleted = 0",
        (&setlist.uuid, &setlist.name, &setlist.notes),
    )?;
    if changed == 0 {
        return Err(AppError::NotFound("Setlist".to_string()));
    }

    capture_update(conn, setlist)
}

pub fn delete_setlist(conn: &Connection, uuid: &str) -> Result<(), AppError> {
    conn.execute("UPDATE setlists SET deleted = 1 WHERE uuid = ?1", [uuid])?;
    conn.execute("DELETE FROM setlist_songs WHERE setlist_id = ?1", [uuid])?;

    queue_service::enqueue(
        conn,
        "setlists",
        QueueOperation::Delete,
        &serde_json::json!({ "id": uuid }),
    )?;
    Ok(())
}

/// Appends a song at the end of the setlist
pub fn add_song(conn: &Connection, setlist_id: &str, song_id: &str) -> Result<(), AppError> {
    let next_position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM setlist_songs WHERE setlist_id = ?1",
        [setlist_id],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO setlist_songs (setlist_id, song_id, position) VALUES (?1, ?2, ?3)",
        (setlist_id, song_id, next_position),
    )?;

    let setlist = get_setlist(conn, setlist_id)?;
    capture_update(conn, &setlist)
}

pub fn remove_song(conn: &Connection, setlist_id: &str, song_id: &str) -> Result<(), AppError> {
    conn.execute(
        "DELETE FROM setlist_songs WHERE setlist_id = ?1 AND song_id = ?2",
        (setlist_id, song_id),
    )?;
    renumber_positions(conn, setlist_id)?;

    let setlist = get_setlist(conn, setlist_id)?;
    capture_update(conn, &setlist)
}

/// Moves the song at `from` before the song currently at `to` (drag-and-drop
/// reorder) and rewrites all positions contiguously.
pub fn move_song(
    conn: &Connection,
    setlist_id: &str,
    from: usize,
    to: usize,
) -> Result<(), AppError> {
    let mut ids = ordered_song_ids(conn, setlist_id)?;
    if from >= ids.len() || to >= ids.len() {
        return Err(AppError::Validation("Invalid setlist position".to_string()));
    }
    if from == to {
        return Ok(());
    }

    let id = ids.remove(from);
    ids.insert(to, id);
    write_positions(conn, setlist_id, &ids)?;

    let setlist = get_setlist(conn, setlist_id)?;
    capture_update(conn, &setlist)
}

fn write_positions(conn: &Connection, setlist_id: &str, ids: &[String]) -> Result<(), AppError> {
    for (position, song_id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE setlist_songs SET position = ?3 WHERE setlist_id = ?1 AND song_id = ?2",
            (setlist_id, song_id, position as i64),
        )?;
    }
    Ok(())
}

fn renumber_positions(conn: &Connection, setlist_id: &str) -> Result<(), AppError> {
    let ids = ordered_song_ids(conn, setlist_id)?;
    write_positions(conn, setlist_id, &ids)
}

/// Applies a remote change (pull phase), replacing membership and order
pub fn apply_remote(
    conn: &Connection,
    uuid: &str,
    data: &serde_json::Value,
    deleted: bool,
) -> Result<(), AppError> {
    if deleted {
        conn.execute("UPDATE setlists SET deleted = 1 WHERE uuid = ?1", [uuid])?;
        conn.execute("DELETE FROM setlist_songs WHERE setlist_id = ?1", [uuid])?;
        return Ok(());
    }

    let name = data
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Validation("remote setlist without name".to_string()))?;

    conn.execute(
        "INSERT INTO setlists (uuid, name, notes) VALUES (?1, ?2, ?3)
         ON CONFLICT(uuid) DO UPDATE SET
            name = excluded.name,
            notes = excluded.notes,
            deleted = 0",
        (uuid, name, data.get("notes").and_then(|v| v.as_str())),
    )?;

    if let Some(song_ids) = data.get("song_ids").and_then(|v| v.as_array()) {
        conn.execute("DELETE FROM setlist_songs WHERE setlist_id = ?1", [uuid])?;
        for (position, song_id) in song_ids.iter().filter_map(|v| v.as_str()).enumerate() {
            // Songs unknown locally are skipped; the next pull carries them
            let result = conn.execute(
                "INSERT INTO setlist_songs (setlist_id, song_id, position) VALUES (?1, ?2, ?3)",
                (uuid, song_id, position as i64),
            );
            if let Err(e) = result {
                log::warn!("skipping setlist member {}: {}", song_id, e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::models::Song;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        conn
    }

    fn seeded(conn: &Connection) -> (Setlist, Vec<Song>) {
        let setlist = Setlist::new("Friday Club Set".to_string());
        create_setlist(conn, &setlist).unwrap();

        let songs: Vec<Song> = ["Opener", "Slow One", "Closer"]
            .iter()
            .map(|t| Song::new(t.to_string()))
            .collect();
        for song in &songs {
            song_service::create_song(conn, song).unwrap();
            add_song(conn, &setlist.uuid, &song.uuid).unwrap();
        }
        (setlist, songs)
    }

    #[test]
    fn test_add_song_appends_in_order() {
        let conn = test_conn();
        let (setlist, songs) = seeded(&conn);

        let listed = songs_in_setlist(&conn, &setlist.uuid).unwrap();
        let titles: Vec<&str> = listed.iter().map(|s| s.song.title.as_str()).collect();
        assert_eq!(titles, vec!["Opener", "Slow One", "Closer"]);
        assert_eq!(listed[0].position, 0);
        assert_eq!(listed[2].position, 2);
        assert_eq!(songs.len(), 3);
    }

    #[test]
    fn test_move_song_rewrites_positions_contiguously() {
        let conn = test_conn();
        let (setlist, _) = seeded(&conn);

        // Drag the closer to the top
        move_song(&conn, &setlist.uuid, 2, 0).unwrap();
        let titles: Vec<String> = songs_in_setlist(&conn, &setlist.uuid)
            .unwrap()
            .into_iter()
            .map(|s| s.song.title)
            .collect();
        assert_eq!(titles, vec!["Closer", "Opener", "Slow One"]);

        let positions: Vec<i64> = songs_in_setlist(&conn, &setlist.uuid)
            .unwrap()
            .into_iter()
            .map(|s| s.position)
            .collect();
        assert_eq!(positions, vec![0, 1, 2]);

        assert!(move_song(&conn, &setlist.uuid, 0, 9).is_err());
    }

    #[test]
    fn test_remove_song_renumbers() {
        let conn = test_conn();
        let (setlist, songs) = seeded(&conn);

        remove_song(&conn, &setlist.uuid, &songs[1].uuid).unwrap();
        let listed = songs_in_setlist(&conn, &setlist.uuid).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].position, 1);
    }

    #[tokio::test]
    async fn test_reorder_captures_song_order_in_payload() {
        let conn = test_conn();
        let (setlist, songs) = seeded(&conn);
        move_song(&conn, &setlist.uuid, 0, 2).unwrap();

        let entries = queue_service::query_by_table_and_entity(&conn, "setlists", &setlist.uuid)
            .await
            .unwrap();
        let last = entries.last().unwrap();
        let ids: Vec<&str> = last.payload["song_ids"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                songs[1].uuid.as_str(),
                songs[2].uuid.as_str(),
                songs[0].uuid.as_str()
            ]
        );
    }
}
