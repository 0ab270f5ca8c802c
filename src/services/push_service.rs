/// Push half of the network sync engine: drains the outbox to the backend.
use crate::error::AppError;
use crate::models::{QueueEntry, SyncSettings};
use crate::services::{queue_service, sync_service};
use rusqlite::Connection;
use serde_json::json;

/// Retries per entry before it is parked as failed
const MAX_RETRIES: i64 = 5;

/// Attempts to push every due outbox entry, oldest first.
///
/// Per entry: mark syncing, POST, delete on acceptance. A rejection by the
/// server (4xx) parks the entry as failed with its error text; a transport
/// error or server fault schedules a retry and aborts the cycle so a dead
/// server does not burn every entry's retry budget in one pass.
///
/// Returns the number of entries accepted by the backend.
pub async fn push_pending(conn: &Connection) -> Result<usize, AppError> {
    let settings = sync_service::load_sync_settings(conn)?
        .ok_or_else(|| AppError::NotFound("Sync not configured".to_string()))?;

    if !settings.enabled {
        return Err(AppError::Validation("Sync disabled".to_string()));
    }

    let device_id = sync_service::get_device_id(conn)?;

    // Entries a crashed run left in 'syncing' become due again
    let reclaimed = queue_service::reclaim_in_flight(conn)?;
    if reclaimed > 0 {
        log::warn!("reclaimed {} in-flight entries from a previous run", reclaimed);
    }

    let client = reqwest::Client::new();
    let entries = queue_service::due_entries(conn)?;

    let mut pushed = 0;
    for entry in entries {
        queue_service::mark_syncing(conn, &entry.id)?;

        match push_entry(&client, &settings, &device_id, &entry).await {
            Ok(()) => {
                queue_service::remove(conn, &entry.id)?;
                pushed += 1;
            }
            Err(PushError::Rejected(msg)) => {
                log::warn!(
                    "entry {} ({}/{}) rejected by server: {}",
                    entry.id,
                    entry.target_table,
                    entry.entity_id().unwrap_or("?"),
                    msg
                );
                queue_service::mark_failed(conn, &entry.id, &msg)?;
            }
            Err(PushError::Transport(msg)) => {
                log::warn!("push of entry {} failed: {}", entry.id, msg);
                if entry.retry_count + 1 >= MAX_RETRIES {
                    queue_service::mark_failed(conn, &entry.id, &msg)?;
                } else {
                    queue_service::mark_retry(conn, &entry.id, &msg)?;
                }
                return Err(AppError::Sync(msg));
            }
        }
    }

    if pushed > 0 {
        log::info!("pushed {} queued mutations", pushed);
    }

    Ok(pushed)
}

enum PushError {
    /// The server understood and refused; retrying will not help
    Rejected(String),
    /// Network fault or server-side error; worth retrying later
    Transport(String),
}

async fn push_entry(
    client: &reqwest::Client,
    settings: &SyncSettings,
    device_id: &str,
    entry: &QueueEntry,
) -> Result<(), PushError> {
    let url = format!("{}/{}", settings.band_api_url(), entry.target_table);

    let body = json!({
        "operation": entry.operation.as_str(),
        "data": entry.payload,
        "queued_at": entry.queued_at,
        "device_id": device_id,
    });

    let response = client
        .post(&url)
        .basic_auth(&settings.username, Some(&settings.app_password))
        .json(&body)
        .send()
        .await
        .map_err(|e| PushError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else if status.is_client_error() {
        let text = response.text().await.unwrap_or_default();
        Err(PushError::Rejected(format!("{}: {}", status, text)))
    } else {
        Err(PushError::Transport(format!("server returned {}", status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::models::QueueOperation;

    #[tokio::test]
    async fn test_push_requires_configured_sync() {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        queue_service::enqueue(
            &conn,
            "songs",
            QueueOperation::Create,
            &serde_json::json!({"id": "s1"}),
        )
        .unwrap();

        let err = push_pending(&conn).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }
}
