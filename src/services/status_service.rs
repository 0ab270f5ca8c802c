/// Per-item sync-status tracking: reduces the outbox to one displayed status
/// per entity and holds the shared override/refresh state UI hooks bind to.
use crate::models::{QueueEntry, QueueState};
use crate::services::queue_service;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

/// Displayed synchronization state of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No outbox entry exists; the entity matches the backend as far as we know
    Synced,
    /// The latest mutation is queued but not yet dispatched
    Pending,
    /// The latest mutation is in flight
    Syncing,
    /// The latest mutation failed
    Error,
    /// Synced, but carries remote changes the user has not looked at yet.
    /// Only ever set through the manual override path, never derived.
    Unread,
}

impl SyncStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Error => "error",
            SyncStatus::Unread => "unread",
        }
    }
}

/// Reduces all queue entries of one entity to its displayed status.
///
/// Later mutations supersede earlier ones, so the entry with the greatest
/// `queued_at` wins. Entries queued in the same millisecond tie; the one the
/// store yielded last (insertion order) wins, which is accepted
/// nondeterminism for same-millisecond races. States the resolver does not
/// recognize count as synced rather than erroring: they can only come from a
/// store that marks success differently or from a newer schema.
///
/// Pure over the snapshot; performs no I/O.
pub fn resolve_status(entries: &[QueueEntry]) -> SyncStatus {
    let mut latest: Option<&QueueEntry> = None;
    for entry in entries {
        match latest {
            Some(best) if entry.queued_at < best.queued_at => {}
            _ => latest = Some(entry),
        }
    }

    match latest {
        None => SyncStatus::Synced,
        Some(entry) => match entry.state {
            QueueState::Pending => SyncStatus::Pending,
            QueueState::Syncing => SyncStatus::Syncing,
            QueueState::Failed => SyncStatus::Error,
            QueueState::Other => SyncStatus::Synced,
        },
    }
}

/// Queries the queue store for one entity and resolves its status.
///
/// Fails open: a read failure logs and resolves to synced. A wrong
/// "everything is fine" is less harmful than a false error icon caused by an
/// infrastructure hiccup.
pub async fn fetch_status(conn: &Connection, table: &str, entity_id: &str) -> SyncStatus {
    match queue_service::query_by_table_and_entity(conn, table, entity_id).await {
        Ok(entries) => resolve_status(&entries),
        Err(e) => {
            log::warn!(
                "sync queue read failed for {}/{}, assuming synced: {}",
                table,
                entity_id,
                e
            );
            SyncStatus::Synced
        }
    }
}

/// Shared store for manually asserted statuses plus the refresh counter that
/// drives re-evaluation of every mounted status hook.
///
/// Overrides are authoritative until cleared; the background resolver never
/// writes here. All mutators also bump the refresh counter so subscribed
/// consumers re-evaluate. `clear_all` must run on band switch and provider
/// teardown so no stale statuses leak across workspaces.
#[derive(Debug)]
pub struct StatusStore {
    overrides: Mutex<HashMap<String, SyncStatus>>,
    refresh: watch::Sender<u64>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    pub fn new() -> Self {
        let (refresh, _rx) = watch::channel(0);
        Self {
            overrides: Mutex::new(HashMap::new()),
            refresh,
        }
    }

    /// Manually asserted status for an entity, if any
    pub fn get_status(&self, entity_id: &str) -> Option<SyncStatus> {
        self.overrides
            .lock()
            .ok()
            .and_then(|map| map.get(entity_id).copied())
    }

    /// Upserts a manual override and wakes all subscribed hooks
    pub fn set_status(&self, entity_id: &str, status: SyncStatus) {
        if let Ok(mut map) = self.overrides.lock() {
            map.insert(entity_id.to_string(), status);
        }
        self.refresh_all();
    }

    /// Drops the override for one entity; reads fall back to the resolver
    pub fn clear_status(&self, entity_id: &str) {
        if let Ok(mut map) = self.overrides.lock() {
            map.remove(entity_id);
        }
        self.refresh_all();
    }

    /// Drops every override (logout / band switch)
    pub fn clear_all(&self) {
        if let Ok(mut map) = self.overrides.lock() {
            map.clear();
        }
        self.refresh_all();
    }

    /// Increments the shared refresh counter by exactly 1, forcing every
    /// subscribed hook to re-query the queue store.
    pub fn refresh_all(&self) {
        self.refresh.send_modify(|n| *n += 1);
    }

    /// Subscribes to refresh signals. A receiver created after an increment
    /// still observes the latest counter value, so no refresh is missed.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }
}

/// Discards stale query results when re-evaluations overlap.
///
/// Each issued query draws a sequence number from `begin`; `commit` accepts a
/// result only while no higher-sequence result has been applied, so the value
/// shown is always from the newest query that has completed, independent of
/// the order results arrive in.
#[derive(Debug, Default)]
pub struct QueryGuard {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl QueryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number for a query that is about to start
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True if the result of query `seq` should be applied
    pub fn commit(&self, seq: u64) -> bool {
        self.applied.fetch_max(seq, Ordering::SeqCst) < seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::models::{QueueOperation, QueueState};
    use serde_json::json;

    fn entry(id: &str, entity_id: &str, state: QueueState, queued_at: i64) -> QueueEntry {
        QueueEntry {
            id: id.to_string(),
            target_table: "songs".to_string(),
            operation: QueueOperation::Update,
            payload: json!({ "id": entity_id }),
            state,
            queued_at,
            retry_count: 0,
            last_error: None,
        }
    }

    #[test]
    fn test_empty_queue_resolves_synced() {
        assert_eq!(resolve_status(&[]), SyncStatus::Synced);
    }

    #[test]
    fn test_single_entry_maps_directly() {
        let cases = [
            (QueueState::Pending, SyncStatus::Pending),
            (QueueState::Syncing, SyncStatus::Syncing),
            (QueueState::Failed, SyncStatus::Error),
        ];
        for (state, expected) in cases {
            assert_eq!(resolve_status(&[entry("q1", "x", state, 100)]), expected);
        }
    }

    #[test]
    fn test_unrecognized_state_counts_as_synced() {
        assert_eq!(
            resolve_status(&[entry("q1", "x", QueueState::Other, 100)]),
            SyncStatus::Synced
        );
    }

    #[test]
    fn test_most_recent_entry_wins() {
        let older = entry("q1", "x", QueueState::Pending, 100);
        let newer = entry("q2", "x", QueueState::Failed, 200);

        assert_eq!(
            resolve_status(&[older.clone(), newer.clone()]),
            SyncStatus::Error
        );
        // Order in the slice must not matter when timestamps differ
        assert_eq!(resolve_status(&[newer, older]), SyncStatus::Error);

        let older = entry("q1", "x", QueueState::Failed, 100);
        let newer = entry("q2", "x", QueueState::Pending, 200);
        assert_eq!(resolve_status(&[older, newer]), SyncStatus::Pending);
    }

    #[test]
    fn test_timestamp_tie_takes_last_in_iteration_order() {
        let first = entry("q1", "x", QueueState::Pending, 100);
        let second = entry("q2", "x", QueueState::Syncing, 100);
        assert_eq!(resolve_status(&[first, second]), SyncStatus::Syncing);
    }

    #[tokio::test]
    async fn test_fetch_status_fails_open_on_read_error() {
        // No schema: the sync_queue table is missing and the query errors
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(fetch_status(&conn, "songs", "x").await, SyncStatus::Synced);
    }

    #[tokio::test]
    async fn test_fetch_status_over_real_queue() {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();

        assert_eq!(fetch_status(&conn, "songs", "s1").await, SyncStatus::Synced);

        let id = queue_service::enqueue(
            &conn,
            "songs",
            QueueOperation::Update,
            &json!({"id": "s1"}),
        )
        .unwrap();
        assert_eq!(fetch_status(&conn, "songs", "s1").await, SyncStatus::Pending);

        queue_service::mark_syncing(&conn, &id).unwrap();
        assert_eq!(fetch_status(&conn, "songs", "s1").await, SyncStatus::Syncing);

        // A later mutation supersedes the in-flight one
        queue_service::enqueue(&conn, "songs", QueueOperation::Update, &json!({"id": "s1"}))
            .unwrap();
        conn.execute(
            "UPDATE sync_queue SET queued_at = queued_at + 1000 WHERE id != ?1",
            [&id],
        )
        .unwrap();
        assert_eq!(fetch_status(&conn, "songs", "s1").await, SyncStatus::Pending);

        queue_service::mark_failed(&conn, &id, "boom").unwrap();
        // Failed entry is older, newest still pending
        assert_eq!(fetch_status(&conn, "songs", "s1").await, SyncStatus::Pending);
    }

    #[test]
    fn test_override_set_get_clear() {
        let store = StatusStore::new();
        assert_eq!(store.get_status("x"), None);

        store.set_status("x", SyncStatus::Unread);
        assert_eq!(store.get_status("x"), Some(SyncStatus::Unread));

        store.clear_status("x");
        assert_eq!(store.get_status("x"), None);
    }

    #[test]
    fn test_overrides_track_entities_independently() {
        let store = StatusStore::new();
        store.set_status("item-1", SyncStatus::Pending);
        store.set_status("item-2", SyncStatus::Error);
        store.set_status("item-3", SyncStatus::Unread);

        assert_eq!(store.get_status("item-1"), Some(SyncStatus::Pending));
        assert_eq!(store.get_status("item-2"), Some(SyncStatus::Error));
        assert_eq!(store.get_status("item-3"), Some(SyncStatus::Unread));

        store.clear_status("item-1");
        assert_eq!(store.get_status("item-1"), None);
        assert_eq!(store.get_status("item-2"), Some(SyncStatus::Error));
        assert_eq!(store.get_status("item-3"), Some(SyncStatus::Unread));
    }

    #[test]
    fn test_clear_all_wipes_every_override() {
        let store = StatusStore::new();
        store.set_status("a", SyncStatus::Pending);
        store.set_status("b", SyncStatus::Syncing);
        store.clear_all();
        assert_eq!(store.get_status("a"), None);
        assert_eq!(store.get_status("b"), None);
    }

    #[test]
    fn test_refresh_all_increments_by_one() {
        let store = StatusStore::new();
        let rx = store.subscribe();
        let before = *rx.borrow();
        store.refresh_all();
        assert_eq!(*rx.borrow(), before + 1);
        store.refresh_all();
        assert_eq!(*rx.borrow(), before + 2);
    }

    #[tokio::test]
    async fn test_subscribers_observe_refresh_and_override_writes() {
        let store = StatusStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.refresh_all();
        assert!(rx.has_changed().unwrap());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);

        // set_status must also wake consumers
        store.set_status("x", SyncStatus::Unread);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_late_subscriber_sees_current_counter() {
        let store = StatusStore::new();
        store.refresh_all();
        store.refresh_all();
        // Subscribing after the increments still exposes the latest value
        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), 2);
    }

    #[test]
    fn test_stale_results_are_discarded_by_completion_order() {
        let guard = QueryGuard::new();
        let a = guard.begin();
        let b = guard.begin();

        // B resolves first: applied. A arrives later in wall-clock order
        // but was triggered earlier: discarded.
        assert!(guard.commit(b));
        assert!(!guard.commit(a));

        // A following query still applies normally
        let c = guard.begin();
        assert!(guard.commit(c));
    }

    #[test]
    fn test_in_order_results_all_apply() {
        let guard = QueryGuard::new();
        for _ in 0..3 {
            let seq = guard.begin();
            assert!(guard.commit(seq));
        }
    }
}
