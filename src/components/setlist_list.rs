use crate::components::sync_status::SyncStatusIcon;
use crate::database;
use crate::models::Setlist;
use crate::services::setlist_service;
use crate::Screen;
use dioxus::prelude::*;

#[component]
pub fn SetlistListScreen(on_navigate: EventHandler<Screen>) -> Element {
    let mut setlists = use_signal(Vec::<Setlist>::new);
    let mut error_message = use_signal(|| None::<String>);

    use_effect(move || match database::init_database() {
        Ok(conn) => match setlist_service::list_setlists(&conn) {
            Ok(list) => setlists.set(list),
            Err(e) => error_message.set(Some(format!("Failed to load setlists: {}", e))),
        },
        Err(e) => error_message.set(Some(format!("Database error: {}", e))),
    });

    let on_create = move |_| {
        spawn(async move {
            match database::init_database() {
                Ok(conn) => {
                    let setlist = Setlist::new("Untitled set".to_string());
                    match setlist_service::create_setlist(&conn, &setlist) {
                        Ok(()) => on_navigate.call(Screen::SetlistEdit(setlist.uuid)),
                        Err(e) => error_message.set(Some(e.user_message())),
                    }
                }
                Err(e) => error_message.set(Some(format!("Database error: {}", e))),
            }
        });
    };

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            div { style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px; padding-top: 8px;",
                h1 { style: "color: #0066cc; margin: 0; font-size: 24px; font-weight: 700;",
                    "📋 Setlists"
                }
                button {
                    class: "btn-success",
                    style: "padding: 10px 16px; font-size: 16px; font-weight: 500;",
                    onclick: on_create,
                    "+ New"
                }
            }

            if let Some(error) = error_message() {
                div { style: "background-color: #fee; color: #c00; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{error}"
                }
            }

            if setlists().is_empty() {
                div { style: "text-align: center; padding: 40px; color: #999;",
                    "No setlists yet. Build one for the next gig."
                }
            } else {
                div { style: "display: flex; flex-direction: column; gap: 8px; margin-bottom: 128px;",
                    for setlist in setlists() {
                        div {
                            key: "{setlist.uuid}",
                            class: "card",
                            style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; cursor: pointer;",
                            onclick: {
                                let uuid = setlist.uuid.clone();
                                move |_| on_navigate.call(Screen::SetlistEdit(uuid.clone()))
                            },
                            p { style: "font-size: 16px; font-weight: 600; margin: 0;",
                                "{setlist.name}"
                                SyncStatusIcon {
                                    table: "setlists".to_string(),
                                    entity_id: setlist.uuid.clone(),
                                }
                            }
                            span { style: "color: #999;", "›" }
                        }
                    }
                }
            }
        }
    }
}
