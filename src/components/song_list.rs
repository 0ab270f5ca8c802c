use crate::components::sync_status::SyncStatusIcon;
use crate::database;
use crate::models::Song;
use crate::services::song_service;
use crate::Screen;
use dioxus::prelude::*;

#[component]
pub fn SongListScreen(on_navigate: EventHandler<Screen>) -> Element {
    let mut songs = use_signal(Vec::<Song>::new);
    let mut search_filter = use_signal(String::new);

    let mut load_songs = move || match database::init_database() {
        Ok(conn) => {
            let search_value = search_filter();
            let filter = if search_value.is_empty() {
                None
            } else {
                Some(search_value.as_str())
            };

            match song_service::list_songs(&conn, filter) {
                Ok(list) => songs.set(list),
                Err(e) => log::error!("Failed to load songs: {}", e),
            }
        }
        Err(e) => log::error!("Database error: {}", e),
    };

    // Load on mount
    use_effect(move || {
        load_songs();
    });

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            // Header
            div { style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px; padding-top: 8px;",
                h1 { style: "color: #0066cc; margin: 0; font-size: 24px; font-weight: 700;",
                    "🎵 Songs"
                }
                button {
                    class: "btn-success",
                    style: "padding: 10px 16px; font-size: 16px; font-weight: 500;",
                    onclick: move |_| on_navigate.call(Screen::SongEdit(None)),
                    "+ New"
                }
            }

            // Search
            div { style: "margin: 12px 0 16px;",
                input {
                    style: "width: 100%; padding: 14px 16px; font-size: 16px; border: 2px solid #e0e0e0; border-radius: 10px; background: white;",
                    r#type: "text",
                    placeholder: "🔍 Search title or artist",
                    value: "{search_filter}",
                    oninput: move |e| {
                        search_filter.set(e.value());
                        load_songs();
                    },
                }
            }

            if songs().is_empty() {
                div { style: "text-align: center; padding: 40px; color: #999;",
                    "No songs yet."
                }
            } else {
                div { style: "display: flex; flex-direction: column; gap: 8px; margin-bottom: 128px;",
                    for song in songs() {
                        SongRow {
                            key: "{song.uuid}",
                            song: song.clone(),
                            on_click: {
                                let uuid = song.uuid.clone();
                                move |_| on_navigate.call(Screen::SongEdit(Some(uuid.clone())))
                            },
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn SongRow(song: Song, on_click: EventHandler<()>) -> Element {
    let subtitle = match (&song.artist, &song.song_key) {
        (Some(artist), Some(key)) => format!("{} · {}", artist, key),
        (Some(artist), None) => artist.clone(),
        (None, Some(key)) => format!("Key: {}", key),
        (None, None) => String::new(),
    };

    rsx! {
        div {
            class: "card",
            style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; cursor: pointer;",
            onclick: move |_| on_click.call(()),

            div {
                p { style: "font-size: 16px; font-weight: 600; margin: 0;",
                    "{song.title}"
                    SyncStatusIcon { table: "songs".to_string(), entity_id: song.uuid.clone() }
                }
                if !subtitle.is_empty() {
                    p { style: "font-size: 13px; color: #666; margin: 2px 0 0 0;", "{subtitle}" }
                }
            }
            span { style: "font-size: 13px; color: #999;", "{song.duration_display()}" }
        }
    }
}
