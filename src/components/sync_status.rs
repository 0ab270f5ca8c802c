/// UI binding of the per-item sync-status subsystem: the provider context,
/// the live status hook, and the status icon rendered next to entity rows.
use crate::database;
use crate::services::background_sync;
use crate::services::status_service::{self, QueryGuard, StatusStore, SyncStatus};
use dioxus::prelude::*;
use std::sync::Arc;

/// App-wide context handle around the shared [`StatusStore`]
#[derive(Clone)]
pub struct StatusContext {
    store: Arc<StatusStore>,
}

/// Creates the status provider. Call exactly once, at the top of the app;
/// everything below that component may use [`use_status_store`] and
/// [`use_item_status`]. Overrides are wiped on provider teardown.
pub fn use_status_provider() -> Arc<StatusStore> {
    let store = use_context_provider(|| StatusContext {
        store: Arc::new(StatusStore::new()),
    })
    .store;

    use_drop({
        let store = store.clone();
        move || store.clear_all()
    });

    store
}

/// Shared status store from context.
///
/// Panics when no provider is mounted above the caller: that is a wiring bug
/// that must surface in development, not be masked by a silent default.
pub fn use_status_store() -> Arc<StatusStore> {
    use_hook(|| {
        try_consume_context::<StatusContext>()
            .map(|ctx| ctx.store)
            .unwrap_or_else(|| {
                panic!(
                    "status store not provided: use_item_status/use_status_store was called \
                     outside the status provider; call use_status_provider() in the app root"
                )
            })
    })
}

/// Live sync status of one entity.
///
/// Re-queries the sync queue on mount and on every refresh signal (manual
/// `refresh_all`, override writes, completed sync cycles via the bridge).
/// While a re-query runs, the previously resolved value keeps rendering; the
/// first mount shows `Synced` until the first resolution lands. A manual
/// override always wins over the resolver. Results of superseded queries are
/// dropped by the [`QueryGuard`], and unmounting drops the scope-owned task,
/// so no update can land after unmount.
///
/// List rows are diffed positionally, so a re-rendered parent can hand a
/// mounted hook a different entity; the reactive deps restart the task bound
/// to the new identity instead of leaving it on the first one.
pub fn use_item_status(table: String, entity_id: String) -> SyncStatus {
    let store = use_status_store();
    let mut status = use_signal(|| SyncStatus::Synced);
    let guard = use_hook(|| Arc::new(QueryGuard::new()));

    use_resource(use_reactive!(|(table, entity_id)| {
        let store = store.clone();
        let guard = guard.clone();
        async move {
            status.set(SyncStatus::Synced);
            let mut refresh = store.subscribe();
            loop {
                let seq = guard.begin();
                let resolved = match database::init_database() {
                    Ok(conn) => status_service::fetch_status(&conn, &table, &entity_id).await,
                    Err(e) => {
                        log::warn!("status query skipped, database unavailable: {}", e);
                        SyncStatus::Synced
                    }
                };
                let value = store.get_status(&entity_id).unwrap_or(resolved);
                if guard.commit(seq) {
                    status.set(value);
                }
                if refresh.changed().await.is_err() {
                    break;
                }
            }
        }
    }));

    status()
}

/// Bridges sync-engine notifications into the status subsystem. Mount once
/// next to the provider: each completed cycle marks remotely changed entities
/// as unread and forces all mounted hooks to re-derive. The listener is a
/// scope-owned task, dropped with the provider.
pub fn use_sync_event_bridge() {
    let store = use_status_store();

    use_future(move || {
        let store = store.clone();
        async move {
            let mut events = background_sync::subscribe_sync_events();
            // Only react to cycles completed after mount
            events.borrow_and_update();
            loop {
                if events.changed().await.is_err() {
                    break;
                }
                let changes = events.borrow_and_update().remote_changes.clone();
                for change in &changes {
                    store.set_status(&change.id, SyncStatus::Unread);
                }
                store.refresh_all();
            }
        }
    });
}

/// Small status glyph rendered next to entity rows
#[component]
pub fn SyncStatusIcon(table: String, entity_id: String) -> Element {
    let status = use_item_status(table, entity_id);

    let (symbol, color, label) = match status {
        SyncStatus::Synced => ("✓", "#2e9e4f", "Synced"),
        SyncStatus::Pending => ("⏳", "#c98a00", "Waiting to sync"),
        SyncStatus::Syncing => ("⟳", "#0066cc", "Syncing…"),
        SyncStatus::Error => ("⚠", "#c00", "Sync failed"),
        SyncStatus::Unread => ("●", "#0066cc", "Updated by another member"),
    };

    rsx! {
        span {
            class: "sync-status sync-status-{status.as_str()}",
            style: "color: {color}; font-size: 14px; margin-left: 6px;",
            title: "{label}",
            "{symbol}"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueueOperation;
    use crate::services::queue_service;
    use dioxus::dioxus_core::NoOpMutations;
    use serde_json::json;
    use std::time::Duration;

    static ROW_ID: GlobalSignal<String> = Signal::global(|| "status-row-a".to_string());
    static SEEN: GlobalSignal<Option<SyncStatus>> = Signal::global(|| None);

    #[component]
    fn RowStatus() -> Element {
        let status = use_item_status("songs".to_string(), ROW_ID());
        if *SEEN.peek() != Some(status) {
            *SEEN.write() = Some(status);
        }
        rsx! {
            span { "{status.as_str()}" }
        }
    }

    fn StatusRoot() -> Element {
        use_status_provider();
        rsx! {
            RowStatus {}
        }
    }

    fn OrphanReader() -> Element {
        let _store = use_status_store();
        rsx! {
            div {}
        }
    }

    async fn pump_until(dom: &mut VirtualDom, expected: SyncStatus) {
        for _ in 0..100 {
            if dom.in_runtime(|| *SEEN.peek()) == Some(expected) {
                return;
            }
            let _ = tokio::time::timeout(Duration::from_millis(20), dom.wait_for_work()).await;
            dom.render_immediate(&mut NoOpMutations);
        }
        panic!("status hook never settled on {:?}", expected);
    }

    #[tokio::test]
    async fn test_hook_requeries_when_row_identity_changes() {
        let conn = database::init_database().unwrap();
        // Leftovers from an earlier run must not skew the derivation
        conn.execute(
            "DELETE FROM sync_queue
             WHERE json_extract(payload, '$.id') IN ('status-row-a', 'status-row-b')",
            [],
        )
        .unwrap();
        let qid = queue_service::enqueue(
            &conn,
            "songs",
            QueueOperation::Update,
            &json!({"id": "status-row-b"}),
        )
        .unwrap();
        queue_service::mark_failed(&conn, &qid, "rejected").unwrap();

        let mut dom = VirtualDom::new(StatusRoot);
        dom.rebuild_in_place();
        pump_until(&mut dom, SyncStatus::Synced).await;

        // Diffing reuses the row component; the hook must re-bind to the
        // entity it is now rendering for instead of the one it mounted with
        dom.in_runtime(|| *ROW_ID.write() = "status-row-b".to_string());
        pump_until(&mut dom, SyncStatus::Error).await;

        queue_service::remove(&conn, &qid).unwrap();
    }

    #[test]
    fn test_store_access_without_provider_panics_with_message() {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut dom = VirtualDom::new(OrphanReader);
            dom.rebuild_in_place();
        }));

        let payload = result.unwrap_err();
        let message = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_default();
        assert!(message.contains("status store not provided"));
    }

    #[test]
    fn test_store_access_under_provider_succeeds() {
        let mut dom = VirtualDom::new(StatusRoot);
        dom.rebuild_in_place();
    }
}
