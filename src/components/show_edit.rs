use crate::components::sync_status::use_status_store;
use crate::database;
use crate::models::{Setlist, Show};
use crate::services::{setlist_service, show_service};
use crate::Screen;
use dioxus::prelude::*;

/// Create (uuid = None) or edit (uuid = Some) a show
#[component]
pub fn ShowEditScreen(uuid: Option<String>, on_navigate: EventHandler<Screen>) -> Element {
    let store = use_status_store();

    let mut show = use_signal(|| Show::new(String::new(), String::new()));
    let mut venue = use_signal(String::new);
    let mut city = use_signal(String::new);
    let mut show_date = use_signal(String::new);
    let mut start_time = use_signal(String::new);
    let mut setlist_id = use_signal(String::new);
    let mut notes = use_signal(String::new);
    let mut setlists = use_signal(Vec::<Setlist>::new);
    let mut error_message = use_signal(|| None::<String>);

    let is_edit = uuid.is_some();

    use_effect({
        let uuid = uuid.clone();
        let store = store.clone();
        move || {
            match database::init_database() {
                Ok(conn) => {
                    match setlist_service::list_setlists(&conn) {
                        Ok(list) => setlists.set(list),
                        Err(e) => log::error!("Failed to load setlists: {}", e),
                    }
                    if let Some(uuid) = uuid.clone() {
                        store.clear_status(&uuid);
                        match show_service::get_show(&conn, &uuid) {
                            Ok(loaded) => {
                                venue.set(loaded.venue.clone());
                                city.set(loaded.city.clone().unwrap_or_default());
                                show_date.set(loaded.show_date.clone());
                                start_time.set(loaded.start_time.clone().unwrap_or_default());
                                setlist_id.set(loaded.setlist_id.clone().unwrap_or_default());
                                notes.set(loaded.notes.clone().unwrap_or_default());
                                show.set(loaded);
                            }
                            Err(e) => error_message.set(Some(format!("Failed to load: {}", e))),
                        }
                    }
                }
                Err(e) => error_message.set(Some(format!("Database error: {}", e))),
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
                        let mut current = show();
                        current.venue = venue().trim().to_string();
                        current.city = non_empty(city());
                        current.show_date = show_date().trim().to_string();
                        current.start_time = non_empty(start_time());
                        current.setlist_id = non_empty(setlist_id());
                        current.notes = non_empty(notes());

                        let result = if is_edit {
                            show_service::update_show(&conn, &current)
                        } else {
                            show_service::create_show(&conn, &current)
                        };

                        match result {
                            Ok(()) => {
                                store.refresh_all();
                                on_navigate.call(Screen::Shows);
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
                    match show_service::delete_show(&conn, &show().uuid) {
                        Ok(()) => {
                            store.refresh_all();
                            on_navigate.call(Screen::Shows);
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
                if is_edit { "Edit show" } else { "Book a show" }
            }

            if let Some(error) = error_message() {
                div { style: "background-color: #fee; color: #c00; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{error}"
                }
            }

            div { class: "form-group", style: "margin-bottom: 16px;",
                label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Venue *" }
                input {
                    style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                    r#type: "text",
                    value: "{venue}",
                    oninput: move |e| venue.set(e.value()),
                }
            }

            div { class: "form-group", style: "margin-bottom: 16px;",
                label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "City" }
                input {
                    style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                    r#type: "text",
                    value: "{city}",
                    oninput: move |e| city.set(e.value()),
                }
            }

            div { style: "display: flex; gap: 12px; margin-bottom: 16px;",
                div { class: "form-group", style: "flex: 1;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Date *" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "date",
                        value: "{show_date}",
                        oninput: move |e| show_date.set(e.value()),
                    }
                }
                div { class: "form-group", style: "flex: 1;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Start" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "time",
                        value: "{start_time}",
                        oninput: move |e| start_time.set(e.value()),
                    }
                }
            }

            div { class: "form-group", style: "margin-bottom: 16px;",
                label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Setlist" }
                select {
                    style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                    value: "{setlist_id}",
                    onchange: move |e| setlist_id.set(e.value()),

                    option { value: "", "None" }
                    for setlist in setlists() {
                        option { value: "{setlist.uuid}", "{setlist.name}" }
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
                    onclick: move |_| on_navigate.call(Screen::Shows),
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
