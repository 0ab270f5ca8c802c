use crate::components::sync_status::SyncStatusIcon;
use crate::database;
use crate::models::PracticeSession;
use crate::services::practice_service;
use crate::Screen;
use dioxus::prelude::*;

#[component]
pub fn PracticeListScreen(on_navigate: EventHandler<Screen>) -> Element {
    let mut sessions = use_signal(Vec::<PracticeSession>::new);
    let mut error_message = use_signal(|| None::<String>);

    let mut load = move || match database::init_database() {
        Ok(conn) => match practice_service::list_sessions(&conn) {
            Ok(list) => sessions.set(list),
            Err(e) => error_message.set(Some(format!("Failed to load sessions: {}", e))),
        },
        Err(e) => error_message.set(Some(format!("Database error: {}", e))),
    };

    use_effect(move || {
        load();
    });

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            div { style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px; padding-top: 8px;",
                h1 { style: "color: #0066cc; margin: 0; font-size: 24px; font-weight: 700;",
                    "🥁 Practice"
                }
                button {
                    class: "btn-success",
                    style: "padding: 10px 16px; font-size: 16px; font-weight: 500;",
                    onclick: move |_| on_navigate.call(Screen::PracticeAdd),
                    "+ Log"
                }
            }

            if let Some(error) = error_message() {
                div { style: "background-color: #fee; color: #c00; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{error}"
                }
            }

            if sessions().is_empty() {
                div { style: "text-align: center; padding: 40px; color: #999;",
                    "No sessions logged yet."
                }
            } else {
                div { style: "display: flex; flex-direction: column; gap: 8px; margin-bottom: 128px;",
                    for session in sessions() {
                        div {
                            key: "{session.uuid}",
                            class: "card",
                            style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 16px;",

                            div {
                                p { style: "font-size: 16px; font-weight: 600; margin: 0;",
                                    "{session.session_date}"
                                    SyncStatusIcon {
                                        table: "practice_sessions".to_string(),
                                        entity_id: session.uuid.clone(),
                                    }
                                }
                                if let Some(session_notes) = session.notes.clone() {
                                    p { style: "font-size: 13px; color: #666; margin: 2px 0 0 0;",
                                        "{session_notes}"
                                    }
                                }
                            }
                            div { style: "display: flex; align-items: center; gap: 12px;",
                                span { style: "font-size: 14px; color: #555;",
                                    "{session.duration_minutes} min"
                                }
                                button {
                                    style: "border: none; background: transparent; color: #c00; font-size: 16px; cursor: pointer;",
                                    onclick: {
                                        let uuid = session.uuid.clone();
                                        move |_| {
                                            let uuid = uuid.clone();
                                            spawn(async move {
                                                if let Ok(conn) = database::init_database() {
                                                    match practice_service::delete_session(&conn, &uuid) {
                                                        Ok(()) => load(),
                                                        Err(e) => error_message
                                                            .set(Some(e.user_message())),
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
        }
    }
}
