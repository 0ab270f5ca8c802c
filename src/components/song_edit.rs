use crate::components::sync_status::use_status_store;
use crate::database;
use crate::models::Song;
use crate::services::song_service;
use crate::Screen;
use dioxus::prelude::*;

/// Create (uuid = None) or edit (uuid = Some) a song
#[component]
pub fn SongEditScreen(uuid: Option<String>, on_navigate: EventHandler<Screen>) -> Element {
    let store = use_status_store();

    let mut song = use_signal(|| Song::new(String::new()));
    let mut title = use_signal(String::new);
    let mut artist = use_signal(String::new);
    let mut song_key = use_signal(String::new);
    let mut tempo = use_signal(String::new);
    let mut duration = use_signal(String::new);
    let mut notes = use_signal(String::new);
    let mut error_message = use_signal(|| None::<String>);

    let is_edit = uuid.is_some();

    // Load the existing song once; opening the editor also consumes a
    // possible unread marker for it.
    use_effect({
        let uuid = uuid.clone();
        let store = store.clone();
        move || {
            if let Some(uuid) = uuid.clone() {
                store.clear_status(&uuid);
                match database::init_database() {
                    Ok(conn) => match song_service::get_song(&conn, &uuid) {
                        Ok(loaded) => {
                            title.set(loaded.title.clone());
                            artist.set(loaded.artist.clone().unwrap_or_default());
                            song_key.set(loaded.song_key.clone().unwrap_or_default());
                            tempo.set(
                                loaded.tempo_bpm.map(|t| t.to_string()).unwrap_or_default(),
                            );
                            duration.set(
                                loaded
                                    .duration_seconds
                                    .map(|d| d.to_string())
                                    .unwrap_or_default(),
                            );
                            notes.set(loaded.notes.clone().unwrap_or_default());
                            song.set(loaded);
                        }
                        Err(e) => error_message.set(Some(format!("Failed to load: {}", e))),
                    },
                    Err(e) => error_message.set(Some(format!("Database error: {}", e))),
                }
            }
        }
    });

    let on_save = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            spawn(async move {
                match database::init_database() {
                    Ok(conn) => {
                        let mut current = song();
                        current.title = title().trim().to_string();
                        current.artist = non_empty(artist());
                        current.song_key = non_empty(song_key());
                        current.tempo_bpm = tempo().trim().parse().ok();
                        current.duration_seconds = duration().trim().parse().ok();
                        current.notes = non_empty(notes());

                        let result = if is_edit {
                            song_service::update_song(&conn, &current)
                        } else {
                            song_service::create_song(&conn, &current)
                        };

                        match result {
                            Ok(()) => {
                                // The new outbox entry changes this song's status
                                store.refresh_all();
                                on_navigate.call(Screen::Songs);
                            }
                            Err(e) => error_message.set(Some(e.user_message())),
                        }
                    }
                    Err(e) => error_message.set(Some(format!("Database error: {}", e))),
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
                    match song_service::delete_song(&conn, &song().uuid) {
                        Ok(()) => {
                            store.refresh_all();
                            on_navigate.call(Screen::Songs);
                        }
                        Err(e) => error_message.set(Some(e.user_message())),
                    }
                }
            });
        }
    };

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            h1 { style: "color: #0066cc; font-size: 24px; font-weight: 700; padding-top: 8px;",
                if is_edit { "Edit song" } else { "New song" }
            }

            if let Some(error) = error_message() {
                div { style: "background-color: #fee; color: #c00; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{error}"
                }
            }

            div { class: "form-group", style: "margin-bottom: 16px;",
                label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Title *" }
                input {
                    style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                    r#type: "text",
                    value: "{title}",
                    oninput: move |e| title.set(e.value()),
                }
            }

            div { class: "form-group", style: "margin-bottom: 16px;",
                label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Artist" }
                input {
                    style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                    r#type: "text",
                    value: "{artist}",
                    oninput: move |e| artist.set(e.value()),
                }
            }

            div { style: "display: flex; gap: 12px; margin-bottom: 16px;",
                div { class: "form-group", style: "flex: 1;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Key" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "text",
                        placeholder: "Am",
                        value: "{song_key}",
                        oninput: move |e| song_key.set(e.value()),
                    }
                }
                div { class: "form-group", style: "flex: 1;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Tempo (bpm)" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "number",
                        value: "{tempo}",
                        oninput: move |e| tempo.set(e.value()),
                    }
                }
                div { class: "form-group", style: "flex: 1;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Length (s)" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "number",
                        value: "{duration}",
                        oninput: move |e| duration.set(e.value()),
                    }
                }
            }

            div { class: "form-group", style: "margin-bottom: 24px;",
                label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Notes" }
                textarea {
                    style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px; min-height: 80px;",
                    value: "{notes}",
                    oninput: move |e| notes.set(e.value()),
                }
            }

            div { style: "display: flex; gap: 12px; margin-bottom: 128px;",
                button {
                    class: "btn-primary",
                    style: "flex: 1; padding: 14px; font-size: 16px;",
                    onclick: on_save,
                    "Save"
                }
                if is_edit {
                    button {
                        style: "padding: 14px 20px; font-size: 16px; background: #fee; color: #c00; border: 1px solid #f5b5b5; border-radius: 8px; cursor: pointer;",
                        onclick: on_delete,
                        "Delete"
                    }
                }
                button {
                    style: "padding: 14px 20px; font-size: 16px; background: #f0f0f0; color: #666; border: 1px solid #ddd; border-radius: 8px; cursor: pointer;",
                    onclick: move |_| on_navigate.call(Screen::Songs),
                    "Cancel"
                }
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
