/// Pull half of the network sync engine: fetches remote changes and applies
/// them to the local tables.
use crate::error::AppError;
use crate::services::{
    practice_service, setlist_service, show_service, song_service, sync_service,
};
use rusqlite::Connection;
use serde::Deserialize;

/// One remotely changed entity as delivered by the backend
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RemoteChange {
    pub table: String,
    pub id: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub deleted: bool,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
struct ChangesResponse {
    changes: Vec<RemoteChange>,
}

/// Fetches everything that changed on the backend since the last sync and
/// applies it locally (last-write-wins upsert, soft delete for removals).
///
/// Returns the applied changes so the caller can flag entities as unread.
pub async fn pull_changes(conn: &Connection) -> Result<Vec<RemoteChange>, AppError> {
    let settings = sync_service::load_sync_settings(conn)?
        .ok_or_else(|| AppError::NotFound("Sync not configured".to_string()))?;

    if !settings.enabled {
        return Err(AppError::Validation("Sync disabled".to_string()));
    }

    let device_id = sync_service::get_device_id(conn)?;
    let since = settings.last_sync.clone().unwrap_or_default();
    let url = format!(
        "{}/changes?since={}&device_id={}",
        settings.band_api_url(),
        since,
        device_id
    );

    let client = reqwest::Client::new();
    let response = client
        .get(&url)
        .basic_auth(&settings.username, Some(&settings.app_password))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::Sync(format!(
            "changes request returned {}",
            response.status()
        )));
    }

    let body: ChangesResponse = response.json().await?;

    let mut applied = Vec::new();
    for change in body.changes {
        match apply_change(conn, &change) {
            Ok(()) => applied.push(change),
            Err(e) => {
                // One malformed change must not stall the whole feed
                log::error!(
                    "failed to apply remote change {}/{}: {}",
                    change.table,
                    change.id,
                    e
                );
            }
        }
    }

    sync_service::update_last_sync(conn)?;

    if !applied.is_empty() {
        log::info!("applied {} remote changes", applied.len());
    }

    Ok(applied)
}

fn apply_change(conn: &Connection, change: &RemoteChange) -> Result<(), AppError> {
    match change.table.as_str() {
        "songs" => song_service::apply_remote(conn, &change.id, &change.data, change.deleted),
        "setlists" => {
            setlist_service::apply_remote(conn, &change.id, &change.data, change.deleted)
        }
        "shows" => show_service::apply_remote(conn, &change.id, &change.data, change.deleted),
        "practice_sessions" => {
            practice_service::apply_remote(conn, &change.id, &change.data, change.deleted)
        }
        other => Err(AppError::Validation(format!(
            "unknown change table '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use serde_json::json;

    #[test]
    fn test_apply_change_dispatches_by_table() {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();

        let change = RemoteChange {
            table: "songs".to_string(),
            id: "s1".to_string(),
            data: json!({"id": "s1", "title": "Driftwood", "artist": "The Owls"}),
            deleted: false,
            updated_at: "2026-08-01T10:00:00Z".to_string(),
        };
        apply_change(&conn, &change).unwrap();

        let title: String = conn
            .query_row("SELECT title FROM songs WHERE uuid = 's1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(title, "Driftwood");

        let bogus = RemoteChange {
            table: "members".to_string(),
            id: "m1".to_string(),
            data: json!({}),
            deleted: false,
            updated_at: String::new(),
        };
        assert!(apply_change(&conn, &bogus).is_err());
    }

    #[test]
    fn test_apply_change_soft_deletes() {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();

        let change = RemoteChange {
            table: "songs".to_string(),
            id: "s1".to_string(),
            data: json!({"id": "s1", "title": "Driftwood"}),
            deleted: false,
            updated_at: String::new(),
        };
        apply_change(&conn, &change).unwrap();

        let deletion = RemoteChange {
            deleted: true,
            ..change
        };
        apply_change(&conn, &deletion).unwrap();

        let deleted: i64 = conn
            .query_row("SELECT deleted FROM songs WHERE uuid = 's1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(deleted, 1);
    }
}
