use crate::components::sync_status::SyncStatusIcon;
use crate::database;
use crate::models::Show;
use crate::services::show_service;
use crate::Screen;
use dioxus::prelude::*;

#[component]
pub fn ShowListScreen(on_navigate: EventHandler<Screen>) -> Element {
    let mut upcoming = use_signal(Vec::<Show>::new);
    let mut past = use_signal(Vec::<Show>::new);
    let mut error_message = use_signal(|| None::<String>);

    use_effect(move || match database::init_database() {
        Ok(conn) => {
            let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
            match show_service::list_shows(&conn, true, &today) {
                Ok(list) => upcoming.set(list),
                Err(e) => error_message.set(Some(format!("Failed to load shows: {}", e))),
            }
            match show_service::list_shows(&conn, false, &today) {
                Ok(list) => past.set(list),
                Err(e) => log::error!("Failed to load past shows: {}", e),
            }
        }
        Err(e) => error_message.set(Some(format!("Database error: {}", e))),
    });

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            div { style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px; padding-top: 8px;",
                h1 { style: "color: #0066cc; margin: 0; font-size: 24px; font-weight: 700;",
                    "🎤 Shows"
                }
                button {
                    class: "btn-success",
                    style: "padding: 10px 16px; font-size: 16px; font-weight: 500;",
                    onclick: move |_| on_navigate.call(Screen::ShowEdit(None)),
                    "+ New"
                }
            }

            if let Some(error) = error_message() {
                div { style: "background-color: #fee; color: #c00; padding: 10px; margin-bottom: 20px; border-radius: 4px;",
                    "{error}"
                }
            }

            h2 { style: "font-size: 16px; color: #666; margin: 16px 0 8px;", "Upcoming" }
            if upcoming().is_empty() {
                p { style: "color: #999; font-size: 14px;", "Nothing booked." }
            } else {
                div { style: "display: flex; flex-direction: column; gap: 8px;",
                    for show in upcoming() {
                        ShowRow {
                            key: "{show.uuid}",
                            show: show.clone(),
                            on_click: {
                                let uuid = show.uuid.clone();
                                move |_| on_navigate.call(Screen::ShowEdit(Some(uuid.clone())))
                            },
                        }
                    }
                }
            }

            h2 { style: "font-size: 16px; color: #666; margin: 24px 0 8px;", "Past" }
            if past().is_empty() {
                p { style: "color: #999; font-size: 14px; margin-bottom: 128px;", "No shows played yet." }
            } else {
                div { style: "display: flex; flex-direction: column; gap: 8px; margin-bottom: 128px;",
                    for show in past() {
                        ShowRow {
                            key: "{show.uuid}",
                            show: show.clone(),
                            on_click: {
                                let uuid = show.uuid.clone();
                                move |_| on_navigate.call(Screen::ShowEdit(Some(uuid.clone())))
                            },
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ShowRow(show: Show, on_click: EventHandler<()>) -> Element {
    let place = match &show.city {
        Some(city) => format!("{}, {}", show.venue, city),
        None => show.venue.clone(),
    };

    rsx! {
        div {
            class: "card",
            style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; cursor: pointer;",
            onclick: move |_| on_click.call(()),

            div {
                p { style: "font-size: 16px; font-weight: 600; margin: 0;",
                    "{place}"
                    SyncStatusIcon { table: "shows".to_string(), entity_id: show.uuid.clone() }
                }
                p { style: "font-size: 13px; color: #666; margin: 2px 0 0 0;",
                    "{show.show_date}"
                    if let Some(time) = show.start_time.clone() {
                        " · {time}"
                    }
                }
            }
            span { style: "color: #999;", "›" }
        }
    }
}
