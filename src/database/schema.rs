use rusqlite::{Connection, Result};

/// Initialize complete database schema for gigbook
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Enable foreign keys
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Schema version table for future migrations
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Check if schema already exists
    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_schema(conn)?;
        conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Create the complete schema (version 1)
fn create_schema(conn: &Connection) -> Result<()> {
    // Table: songs
    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            artist TEXT,
            song_key TEXT,
            tempo_bpm INTEGER,
            duration_seconds INTEGER,
            notes TEXT,
            deleted INTEGER NOT NULL DEFAULT 0 CHECK(deleted IN (0,1)),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_songs_title ON songs(title)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_songs_uuid ON songs(uuid)",
        [],
    )?;

    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS update_songs_timestamp
         AFTER UPDATE ON songs
         BEGIN
            UPDATE songs SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
         END",
        [],
    )?;

    // Table: setlists
    conn.execute(
        "CREATE TABLE IF NOT EXISTS setlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            notes TEXT,
            deleted INTEGER NOT NULL DEFAULT 0 CHECK(deleted IN (0,1)),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_setlists_uuid ON setlists(uuid)",
        [],
    )?;

    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS update_setlists_timestamp
         AFTER UPDATE ON setlists
         BEGIN
            UPDATE setlists SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
         END",
        [],
    )?;

    // Table: setlist_songs (ordered membership, positions contiguous from 0)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS setlist_songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            setlist_id TEXT NOT NULL,
            song_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            UNIQUE(setlist_id, song_id),
            FOREIGN KEY (setlist_id) REFERENCES setlists(uuid) ON DELETE CASCADE,
            FOREIGN KEY (song_id) REFERENCES songs(uuid) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_setlist_songs_setlist ON setlist_songs(setlist_id, position)",
        [],
    )?;

    // Table: shows
    conn.execute(
        "CREATE TABLE IF NOT EXISTS shows (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            venue TEXT NOT NULL,
            city TEXT,
            show_date TEXT NOT NULL,
            start_time TEXT,
            setlist_id TEXT,
            notes TEXT,
            deleted INTEGER NOT NULL DEFAULT 0 CHECK(deleted IN (0,1)),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_shows_date ON shows(show_date DESC)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_shows_uuid ON shows(uuid)",
        [],
    )?;

    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS update_shows_timestamp
         AFTER UPDATE ON shows
         BEGIN
            UPDATE shows SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
         END",
        [],
    )?;

    // Table: practice_sessions
    conn.execute(
        "CREATE TABLE IF NOT EXISTS practice_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            session_date TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL DEFAULT 0,
            setlist_id TEXT,
            notes TEXT,
            deleted INTEGER NOT NULL DEFAULT 0 CHECK(deleted IN (0,1)),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_practice_sessions_date ON practice_sessions(session_date DESC)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_practice_sessions_uuid ON practice_sessions(uuid)",
        [],
    )?;

    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS update_practice_sessions_timestamp
         AFTER UPDATE ON practice_sessions
         BEGIN
            UPDATE practice_sessions SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
         END",
        [],
    )?;

    // Table: sync_queue (outbox of pending mutations)
    //
    // The entity id lives inside the JSON payload at $.id, not in its own
    // column. `state` has no CHECK constraint: the status resolver must
    // tolerate values it does not recognize.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sync_queue (
            id TEXT PRIMARY KEY,
            target_table TEXT NOT NULL,
            operation TEXT CHECK(operation IN ('create', 'update', 'delete')) NOT NULL,
            payload TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'pending',
            queued_at INTEGER NOT NULL,
            retry_count INTEGER NOT NULL DEFAULT 0,
            last_error TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sync_queue_table ON sync_queue(target_table)",
        [],
    )?;
    // Expression index so per-entity status lookups stay cheap
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sync_queue_entity
         ON sync_queue(target_table, json_extract(payload, '$.id'))",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sync_queue_state ON sync_queue(state, queued_at)",
        [],
    )?;

    // Table: sync_settings
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sync_settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            server_url TEXT NOT NULL,
            username TEXT NOT NULL,
            app_password TEXT NOT NULL,
            band_id TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 0 CHECK(enabled IN (0,1)),
            last_sync TEXT,
            device_id TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS update_sync_settings_timestamp
         AFTER UPDATE ON sync_settings
         BEGIN
            UPDATE sync_settings SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
         END",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initializes_in_memory() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('songs','setlists','setlist_songs','shows','practice_sessions','sync_queue','sync_settings')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 7);
    }

    #[test]
    fn test_schema_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let version: i32 = conn
            .query_row(
                "SELECT MAX(version) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, 1);
    }
}
