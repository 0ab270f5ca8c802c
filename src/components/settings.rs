use crate::components::sync_status::use_status_store;
use crate::database;
use crate::models::SyncSettings;
use crate::services::{background_sync, sync_service};
use crate::Screen;
use dioxus::prelude::*;

#[component]
pub fn SettingsScreen(on_navigate: EventHandler<Screen>) -> Element {
    let store = use_status_store();

    let mut server_url = use_signal(String::new);
    let mut username = use_signal(String::new);
    let mut app_password = use_signal(String::new);
    let mut band_id = use_signal(String::new);
    // Band the current overrides belong to; switching bands clears them
    let mut saved_band = use_signal(String::new);
    let mut enabled = use_signal(|| false);
    let mut last_sync = use_signal(|| None::<String>);
    let mut status_message = use_signal(|| None::<String>);
    let mut error_message = use_signal(|| None::<String>);
    let mut sync_log = use_signal(Vec::new);

    use_effect(move || match database::init_database() {
        Ok(conn) => match sync_service::load_sync_settings(&conn) {
            Ok(Some(settings)) => {
                server_url.set(settings.server_url.clone());
                username.set(settings.username.clone());
                app_password.set(settings.app_password.clone());
                band_id.set(settings.band_id.clone());
                saved_band.set(settings.band_id);
                enabled.set(settings.enabled);
                last_sync.set(settings.last_sync);
                sync_log.set(background_sync::get_sync_log());
            }
            Ok(None) => {}
            Err(e) => error_message.set(Some(format!("Failed to load settings: {}", e))),
        },
        Err(e) => error_message.set(Some(format!("Database error: {}", e))),
    });

    let on_save = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            spawn(async move {
                match database::init_database() {
                    Ok(conn) => {
                        let mut settings = SyncSettings::new(
                            server_url().trim().to_string(),
                            username().trim().to_string(),
                            app_password().trim().to_string(),
                            band_id().trim().to_string(),
                        );
                        settings.enabled = enabled();

                        match sync_service::save_sync_settings(&conn, &settings) {
                            Ok(_) => {
                                // Overrides from another band are meaningless here
                                if saved_band() != settings.band_id {
                                    store.clear_all();
                                    saved_band.set(settings.band_id.clone());
                                }
                                if settings.enabled {
                                    background_sync::start_background_sync();
                                } else {
                                    background_sync::stop_background_sync();
                                }
                                store.refresh_all();
                                status_message.set(Some("Settings saved.".to_string()));
                                error_message.set(None);
                            }
                            Err(e) => error_message.set(Some(e.user_message())),
                        }
                    }
                    Err(e) => error_message.set(Some(format!("Database error: {}", e))),
                }
            });
        }
    };

    let on_sync_now = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            status_message.set(Some("Syncing…".to_string()));
            spawn(async move {
                match background_sync::sync_now().await {
                    Ok(stats) => {
                        status_message.set(Some(format!(
                            "Synced: {} pulled, {} pushed.",
                            stats.changes_pulled, stats.entries_pushed
                        )));
                        sync_log.set(background_sync::get_sync_log());
                        store.refresh_all();
                    }
                    Err(e) => {
                        status_message.set(None);
                        error_message.set(Some(e.user_message()));
                    }
                }
            });
        }
    };

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            div { style: "display: flex; align-items: center; gap: 8px; padding-top: 8px; margin-bottom: 12px;",
                button {
                    style: "padding: 8px 12px; border: none; background: transparent; font-size: 18px; cursor: pointer;",
                    onclick: move |_| on_navigate.call(Screen::Home),
                    "←"
                }
                h1 { style: "color: #0066cc; margin: 0; font-size: 24px; font-weight: 700;",
                    "⚙️ Sync settings"
                }
            }

            if let Some(error) = error_message() {
                div { style: "background-color: #fee; color: #c00; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{error}"
                }
            }
            if let Some(message) = status_message() {
                div { style: "background-color: #efe; color: #060; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{message}"
                }
            }

            div { class: "card", style: "margin-bottom: 16px;",
                div { class: "form-group", style: "margin-bottom: 16px;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Server URL" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "text",
                        placeholder: "https://sync.example.org",
                        value: "{server_url}",
                        oninput: move |e| server_url.set(e.value()),
                    }
                }
                div { class: "form-group", style: "margin-bottom: 16px;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Username" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "text",
                        value: "{username}",
                        oninput: move |e| username.set(e.value()),
                    }
                }
                div { class: "form-group", style: "margin-bottom: 16px;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "App password" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "password",
                        value: "{app_password}",
                        oninput: move |e| app_password.set(e.value()),
                    }
                }
                div { class: "form-group", style: "margin-bottom: 16px;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Band" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "text",
                        placeholder: "the-midnight-owls",
                        value: "{band_id}",
                        oninput: move |e| band_id.set(e.value()),
                    }
                }
                label { style: "display: flex; align-items: center; gap: 8px; margin-bottom: 16px; cursor: pointer;",
                    input {
                        r#type: "checkbox",
                        checked: enabled(),
                        onchange: move |e| enabled.set(e.checked()),
                    }
                    "Sync automatically every {background_sync::sync_interval_seconds()} seconds"
                }

                div { style: "display: flex; gap: 12px;",
                    button {
                        class: "btn-primary",
                        style: "flex: 1; padding: 12px;",
                        onclick: on_save,
                        "Save"
                    }
                    button {
                        class: "btn-success",
                        style: "padding: 12px 16px;",
                        onclick: on_sync_now,
                        "Sync now"
                    }
                }
            }

            div { class: "card", style: "margin-bottom: 128px;",
                h2 { style: "margin: 0 0 12px 0; font-size: 18px; color: #333;", "Sync activity" }
                p { style: "font-size: 13px; color: #666; margin: 0 0 8px 0;",
                    if background_sync::is_background_sync_running() {
                        "Background sync is running."
                    } else {
                        "Background sync is off."
                    }
                }
                if let Some(ts) = last_sync() {
                    p { style: "font-size: 13px; color: #666; margin: 0 0 8px 0;",
                        "Last sync: {ts}"
                    }
                }
                if sync_log().is_empty() {
                    p { style: "font-size: 13px; color: #999; margin: 0;",
                        "No sync cycles this session."
                    }
                } else {
                    div { style: "display: flex; flex-direction: column; gap: 4px; max-height: 220px; overflow-y: auto;",
                        for entry in sync_log().into_iter().rev() {
                            p { style: "font-size: 12px; color: #555; margin: 0; font-family: monospace;",
                                "↓ {entry.changes_pulled}  ↑ {entry.entries_pushed}"
                            }
                        }
                    }
                }
            }
        }
    }
}
