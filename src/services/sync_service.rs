use crate::error::AppError;
use crate::models::SyncSettings;
use rusqlite::{Connection, Result};

/// Loads the synchronization settings from the database
pub fn load_sync_settings(conn: &Connection) -> Result<Option<SyncSettings>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, server_url, username, app_password, band_id, enabled, last_sync, device_id, created_at, updated_at
         FROM sync_settings
         ORDER BY id DESC
         LIMIT 1",
    )?;

    let result = stmt.query_row([], |row| {
        Ok(SyncSettings {
            id: row.get(0)?,
            server_url: row.get(1)?,
            username: row.get(2)?,
            app_password: row.get(3)?,
            band_id: row.get(4)?,
            enabled: row.get(5)?,
            last_sync: row.get(6)?,
            device_id: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    });

    match result {
        Ok(settings) => Ok(Some(settings)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Saves or updates the synchronization settings
pub fn save_sync_settings(conn: &Connection, settings: &SyncSettings) -> Result<i64, AppError> {
    let existing = load_sync_settings(conn)?;

    if let Some(existing) = existing {
        conn.execute(
            "UPDATE sync_settings
             SET server_url = ?1, username = ?2, app_password = ?3, band_id = ?4, enabled = ?5, device_id = ?6
             WHERE id = ?7",
            (
                &settings.server_url,
                &settings.username,
                &settings.app_password,
                &settings.band_id,
                settings.enabled,
                &settings.device_id,
                existing.id,
            ),
        )?;
        Ok(existing.id)
    } else {
        conn.execute(
            "INSERT INTO sync_settings (server_url, username, app_password, band_id, enabled, device_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                &settings.server_url,
                &settings.username,
                &settings.app_password,
                &settings.band_id,
                settings.enabled,
                &settings.device_id,
            ),
        )?;
        Ok(conn.last_insert_rowid())
    }
}

/// Updates the timestamp of the last synchronization
pub fn update_last_sync(conn: &Connection) -> Result<(), AppError> {
    conn.execute(
        "UPDATE sync_settings SET last_sync = CURRENT_TIMESTAMP WHERE id = (SELECT MAX(id) FROM sync_settings)",
        [],
    )?;
    Ok(())
}

/// Enables or disables synchronization
pub fn set_sync_enabled(conn: &Connection, enabled: bool) -> Result<(), AppError> {
    conn.execute(
        "UPDATE sync_settings SET enabled = ?1 WHERE id = (SELECT MAX(id) FROM sync_settings)",
        [enabled],
    )?;
    Ok(())
}

/// Deletes all synchronization settings
pub fn delete_sync_settings(conn: &Connection) -> Result<(), AppError> {
    conn.execute("DELETE FROM sync_settings", [])?;
    Ok(())
}

/// Returns the stable device id, creating and persisting one if missing
pub fn get_device_id(conn: &Connection) -> Result<String, AppError> {
    if let Some(mut settings) = load_sync_settings(conn)? {
        if let Some(id) = &settings.device_id {
            return Ok(id.clone());
        }
        let new_id = uuid::Uuid::new_v4().to_string();
        settings.device_id = Some(new_id.clone());
        save_sync_settings(conn, &settings)?;
        Ok(new_id)
    } else {
        // Fallback: ephemeral id (settings not configured yet)
        Ok(uuid::Uuid::new_v4().to_string())
    }
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
    fn test_save_and_load_roundtrip() {
        let conn = test_conn();
        assert!(load_sync_settings(&conn).unwrap().is_none());

        let settings = SyncSettings::new(
            "https://sync.example.org".to_string(),
            "lena".to_string(),
            "app-pass".to_string(),
            "the-midnight-owls".to_string(),
        );
        save_sync_settings(&conn, &settings).unwrap();

        let loaded = load_sync_settings(&conn).unwrap().unwrap();
        assert_eq!(loaded.band_id, "the-midnight-owls");
        assert!(!loaded.enabled);

        set_sync_enabled(&conn, true).unwrap();
        assert!(load_sync_settings(&conn).unwrap().unwrap().enabled);
    }

    #[test]
    fn test_device_id_is_stable_once_configured() {
        let conn = test_conn();
        let settings = SyncSettings::new(
            "https://sync.example.org".to_string(),
            "lena".to_string(),
            "app-pass".to_string(),
            "band".to_string(),
        );
        save_sync_settings(&conn, &settings).unwrap();

        let first = get_device_id(&conn).unwrap();
        let second = get_device_id(&conn).unwrap();
        assert_eq!(first, second);
    }
}
