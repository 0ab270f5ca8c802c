use crate::components::sync_status::use_status_store;
use crate::database;
use crate::models::{PracticeSession, Setlist};
use crate::services::{practice_service, setlist_service};
use crate::Screen;
use dioxus::prelude::*;

#[component]
pub fn PracticeAddScreen(on_navigate: EventHandler<Screen>) -> Element {
    let store = use_status_store();

    let mut session_date =
        use_signal(|| chrono::Local::now().date_naive().format("%Y-%m-%d").to_string());
    let mut duration = use_signal(|| "60".to_string());
    let mut setlist_id = use_signal(String::new);
    let mut notes = use_signal(String::new);
    let mut setlists = use_signal(Vec::<Setlist>::new);
    let mut error_message = use_signal(|| None::<String>);

    use_effect(move || {
        if let Ok(conn) = database::init_database() {
            match setlist_service::list_setlists(&conn) {
                Ok(list) => setlists.set(list),
                Err(e) => log::error!("Failed to load setlists: {}", e),
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
                        let minutes = duration().trim().parse().unwrap_or(0);
                        let mut session = PracticeSession::new(
                            session_date().trim().to_string(),
                            minutes,
                        );
                        let chosen = setlist_id();
                        if !chosen.is_empty() {
                            session.setlist_id = Some(chosen);
                        }
                        let note_text = notes().trim().to_string();
                        if !note_text.is_empty() {
                            session.notes = Some(note_text);
                        }

                        match practice_service::create_session(&conn, &session) {
                            Ok(()) => {
                                store.refresh_all();
                                on_navigate.call(Screen::Practice);
                            }
                            Err(e) => error_message.set(Some(e.user_message())),
                        }
                    }
                    Err(e) => error_message.set(Some(format!("Database error: {}", e))),
                }
            });
        }
    };

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            h1 { style: "color: #0066cc; font-size: 24px; font-weight: 700; padding-top: 8px;",
                "Log practice"
            }

            if let Some(error) = error_message() {
                div { style: "background-color: #fee; color: #c00; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{error}"
                }
            }

            div { style: "display: flex; gap: 12px; margin-bottom: 16px;",
                div { class: "form-group", style: "flex: 1;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Date *" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "date",
                        value: "{session_date}",
                        oninput: move |e| session_date.set(e.value()),
                    }
                }
                div { class: "form-group", style: "flex: 1;",
                    label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Minutes *" }
                    input {
                        style: "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px;",
                        r#type: "number",
                        value: "{duration}",
                        oninput: move |e| duration.set(e.value()),
                    }
                }
            }

            div { class: "form-group", style: "margin-bottom: 16px;",
                label { style: "display: block; margin-bottom: 8px; font-weight: bold;", "Setlist practiced" }
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
                    placeholder: "What did you work on?",
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
                button {
                    style: "padding: 14px 20px; font-size: 16px; background: #f0f0f0; color: #666; border: 1px solid #ddd; border-radius: 8px; cursor: pointer;",
                    onclick: move |_| on_navigate.call(Screen::Practice),
                    "Cancel"
                }
            }
        }
    }
}
