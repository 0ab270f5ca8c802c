use crate::components::sync_status::{use_status_store, SyncStatusIcon};
use crate::database;
use crate::models::{Setlist, SetlistSong, Song};
use crate::services::{setlist_service, song_service};
use crate::Screen;
use dioxus::prelude::*;

/// Setlist editor with drag-and-drop song ordering
#[component]
pub fn SetlistEditScreen(uuid: String, on_navigate: EventHandler<Screen>) -> Element {
    let store = use_status_store();

    // Held in a signal so every handler below stays a Copy closure
    let sid = use_signal(|| uuid.clone());

    let mut setlist = use_signal(|| None::<Setlist>);
    let mut name = use_signal(String::new);
    let mut entries = use_signal(Vec::<SetlistSong>::new);
    let mut all_songs = use_signal(Vec::<Song>::new);
    let mut selected_song = use_signal(String::new);
    let mut drag_from = use_signal(|| None::<usize>);
    let mut error_message = use_signal(|| None::<String>);

    let mut load = move || match database::init_database() {
        Ok(conn) => {
            let setlist_id = sid.peek().clone();
            match setlist_service::get_setlist(&conn, &setlist_id) {
                Ok(loaded) => {
                    name.set(loaded.name.clone());
                    setlist.set(Some(loaded));
                }
                Err(e) => error_message.set(Some(format!("Failed to load: {}", e))),
            }
            match setlist_service::songs_in_setlist(&conn, &setlist_id) {
                Ok(list) => entries.set(list),
                Err(e) => error_message.set(Some(format!("Failed to load songs: {}", e))),
            }
            match song_service::list_songs(&conn, None) {
                Ok(list) => all_songs.set(list),
                Err(e) => log::error!("Failed to load song catalog: {}", e),
            }
        }
        Err(e) => error_message.set(Some(format!("Database error: {}", e))),
    };

    // Load on mount; opening the editor consumes an unread marker
    use_effect({
        let store = store.clone();
        move || {
            store.clear_status(&sid.peek());
            load();
        }
    });

    let on_rename = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            spawn(async move {
                if let (Ok(conn), Some(mut current)) = (database::init_database(), setlist()) {
                    current.name = name().trim().to_string();
                    match setlist_service::update_setlist(&conn, &current) {
                        Ok(()) => {
                            setlist.set(Some(current));
                            store.refresh_all();
                        }
                        Err(e) => error_message.set(Some(e.user_message())),
                    }
                }
            });
        }
    };

    let on_add_song = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            spawn(async move {
                let song_id = selected_song();
                if song_id.is_empty() {
                    return;
                }
                if let Ok(conn) = database::init_database() {
                    match setlist_service::add_song(&conn, &sid.peek(), &song_id) {
                        Ok(()) => {
                            selected_song.set(String::new());
                            store.refresh_all();
                            load();
                        }
                        Err(e) => error_message.set(Some(e.user_message())),
                    }
                }
            });
        }
    };

    let on_delete = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            spawn(async move {
                if let Ok(conn) = database::init_database() {
                    match setlist_service::delete_setlist(&conn, &sid.peek()) {
                        Ok(()) => {
                            store.refresh_all();
                            on_navigate.call(Screen::Setlists);
                        }
                        Err(e) => error_message.set(Some(e.user_message())),
                    }
                }
            });
        }
    };

    let total_seconds: i64 = entries()
        .iter()
        .filter_map(|e| e.song.duration_seconds)
        .sum();

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            div { style: "display: flex; align-items: center; gap: 8px; padding-top: 8px; margin-bottom: 12px;",
                button {
                    style: "padding: 8px 12px; border: none; background: transparent; font-size: 18px; cursor: pointer;",
                    onclick: move |_| on_navigate.call(Screen::Setlists),
                    "←"
                }
                h1 { style: "color: #0066cc; margin: 0; font-size: 24px; font-weight: 700; flex: 1;",
                    "Edit setlist"
                }
                SyncStatusIcon { table: "setlists".to_string(), entity_id: sid() }
            }

            if let Some(error) = error_message() {
                div { style: "background-color: #fee; color: #c00; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{error}"
                }
            }

            // Name
            div { style: "display: flex; gap: 8px; margin-bottom: 16px;",
                input {
                    style: "flex: 1; padding: 12px; font-size: 16px; border: 2px solid #e0e0e0; border-radius: 10px; background: white;",
                    r#type: "text",
                    value: "{name}",
                    oninput: move |e| name.set(e.value()),
                }
                button {
                    class: "btn-primary",
                    style: "padding: 12px 16px;",
                    onclick: on_rename,
                    "Rename"
                }
            }

            // Ordered songs, draggable
            div { class: "card", style: "margin-bottom: 16px;",
                h2 { style: "margin: 0 0 4px 0; font-size: 18px; color: #333;",
                    "Songs ({entries().len()})"
                }
                p { style: "font-size: 12px; color: #999; margin: 0 0 12px 0;",
                    "≈ {total_seconds / 60} min · drag to reorder"
                }

                if entries().is_empty() {
                    p { style: "color: #999; font-size: 14px;", "Empty set. Add songs below." }
                } else {
                    div { style: "display: flex; flex-direction: column; gap: 6px;",
                        for (i , entry) in entries().into_iter().enumerate() {
                            div {
                                key: "{entry.song.uuid}",
                                draggable: "true",
                                style: "display: flex; align-items: center; gap: 10px; padding: 10px 12px; background: #fafafa; border: 1px solid #eee; border-radius: 8px; cursor: grab;",
                                ondragstart: move |_| drag_from.set(Some(i)),
                                ondragover: move |e| e.prevent_default(),
                                ondrop: {
                                    let store = store.clone();
                                    move |e: Event<DragData>| {
                                        e.prevent_default();
                                        let Some(from) = drag_from() else { return };
                                        drag_from.set(None);
                                        if from == i {
                                            return;
                                        }
                                        let store = store.clone();
                                        spawn(async move {
                                            if let Ok(conn) = database::init_database() {
                                                match setlist_service::move_song(&conn, &sid.peek(), from, i) {
                                                    Ok(()) => {
                                                        store.refresh_all();
                                                        load();
                                                    }
                                                    Err(e) => error_message.set(Some(e.user_message())),
                                                }
                                            }
                                        });
                                    }
                                },

                                span { style: "color: #bbb; font-size: 14px; width: 22px;", "{i + 1}." }
                                div { style: "flex: 1;",
                                    p { style: "font-size: 15px; font-weight: 600; margin: 0;",
                                        "{entry.song.title}"
                                    }
                                    if let Some(key) = entry.song.song_key.clone() {
                                        p { style: "font-size: 12px; color: #666; margin: 0;", "{key}" }
                                    }
                                }
                                span { style: "font-size: 12px; color: #999;",
                                    "{entry.song.duration_display()}"
                                }
                                button {
                                    style: "border: none; background: transparent; color: #c00; font-size: 16px; cursor: pointer;",
                                    onclick: {
                                        let store = store.clone();
                                        let song_id = entry.song.uuid.clone();
                                        move |_| {
                                            let store = store.clone();
                                            let song_id = song_id.clone();
                                            spawn(async move {
                                                if let Ok(conn) = database::init_database() {
                                                    match setlist_service::remove_song(&conn, &sid.peek(), &song_id) {
                                                        Ok(()) => {
                                                            store.refresh_all();
                                                            load();
                                                        }
                                                        Err(e) => error_message.set(Some(e.user_message())),
                                                    }
                                                }
                                            });
                                        }
                                    },
                                    "✕"
                                }
                            }
                        }
                    }
                }
            }

            // Add song
            div { class: "card", style: "margin-bottom: 16px;",
                h2 { style: "margin: 0 0 12px 0; font-size: 18px; color: #333;", "Add song" }
                div { style: "display: flex; gap: 8px;",
                    select {
                        style: "flex: 1; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        value: "{selected_song}",
                        onchange: move |e| selected_song.set(e.value()),

                        option { value: "", "Choose a song…" }
                        for song in all_songs() {
                            option { value: "{song.uuid}", "{song.title}" }
                        }
                    }
                    button {
                        class: "btn-success",
                        style: "padding: 10px 16px;",
                        onclick: on_add_song,
                        "Add"
                    }
                }
            }

            button {
                style: "width: 100%; padding: 14px; font-size: 15px; background: #fee; color: #c00; border: 1px solid #f5b5b5; border-radius: 8px; cursor: pointer; margin-bottom: 128px;",
                onclick: on_delete,
                "Delete setlist"
            }
        }
    }
}
