use crate::database;
use crate::models::Show;
use crate::services::{background_sync, practice_service, queue_service, show_service};
use crate::Screen;
use dioxus::prelude::*;

#[component]
pub fn HomeScreen(on_navigate: EventHandler<Screen>) -> Element {
    let mut db_status = use_signal(|| Err("Starting up…".to_string()));
    let mut next_show = use_signal(|| None::<Show>);
    let mut pending = use_signal(|| 0usize);
    let mut failed = use_signal(|| 0usize);
    let mut practiced_minutes = use_signal(|| 0i64);

    // Load dashboard data on mount
    use_effect(move || match database::init_database() {
        Ok(conn) => {
            let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
            match show_service::next_show(&conn, &today) {
                Ok(show) => next_show.set(show),
                Err(e) => log::error!("Failed to load next show: {}", e),
            }
            pending.set(queue_service::pending_count(&conn).unwrap_or(0));
            failed.set(queue_service::failed_count(&conn).unwrap_or(0));

            let month_ago = (chrono::Local::now().date_naive() - chrono::Duration::days(30))
                .format("%Y-%m-%d")
                .to_string();
            practiced_minutes.set(practice_service::minutes_since(&conn, &month_ago).unwrap_or(0));

            db_status.set(Ok(()));
        }
        Err(e) => {
            db_status.set(Err(format!("❌ Database error: {}", e)));
        }
    });

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",
            div { style: "display: flex; justify-content: space-between; align-items: center; margin-top: 24px; margin-bottom: 24px;",
                h1 { style: "color: #0066cc; margin: 0; font-size: 28px; font-weight: 700;",
                    "🎸 Gigbook"
                }
                button {
                    style: "padding: 8px 12px; font-size: 18px; border: none; background: transparent; cursor: pointer;",
                    onclick: move |_| on_navigate.call(Screen::Settings),
                    "⚙️"
                }
            }

            if let Err(message) = db_status() {
                div { class: "card",
                    p { style: "font-size: 14px; color: #c00; margin: 0;", "{message}" }
                }
            }

            // Next show card
            div { class: "card", style: "margin-bottom: 16px;",
                h2 { style: "margin: 0 0 12px 0; font-size: 18px; color: #333;", "Next show" }
                if let Some(show) = next_show() {
                    div {
                        style: "cursor: pointer;",
                        onclick: {
                            let uuid = show.uuid.clone();
                            move |_| on_navigate.call(Screen::ShowEdit(Some(uuid.clone())))
                        },
                        p { style: "font-size: 16px; font-weight: 600; margin: 0 0 4px 0;",
                            "{show.venue}"
                        }
                        p { style: "font-size: 14px; color: #555; margin: 0;",
                            "{show.show_date}"
                            if let Some(time) = show.start_time.clone() {
                                " · {time}"
                            }
                        }
                    }
                } else {
                    p { style: "font-size: 14px; color: #999; margin: 0;", "Nothing booked yet." }
                }
            }

            // Sync overview card
            div { class: "card", style: "margin-bottom: 16px;",
                h2 { style: "margin: 0 0 12px 0; font-size: 18px; color: #333;", "Sync" }
                p { style: "font-size: 14px; color: #555; margin: 0 0 4px 0;",
                    if pending() == 0 {
                        "✓ Everything is on the server."
                    } else {
                        "⏳ {pending()} changes waiting to sync."
                    }
                }
                if failed() > 0 {
                    p { style: "font-size: 14px; color: #c00; margin: 0;",
                        "⚠ {failed()} changes failed, check Settings."
                    }
                }
                if let Some(eta) = background_sync::next_sync_eta_seconds() {
                    p { style: "font-size: 12px; color: #999; margin: 4px 0 0 0;",
                        "Next sync in {eta} s"
                    }
                }
            }

            // Practice summary
            div { class: "card", style: "margin-bottom: 16px;",
                h2 { style: "margin: 0 0 12px 0; font-size: 18px; color: #333;", "Practice" }
                p { style: "font-size: 14px; color: #555; margin: 0;",
                    "{practiced_minutes()} minutes in the last 30 days"
                }
            }

            // Quick actions
            div { class: "card", style: "margin-bottom: 128px;",
                h2 { style: "margin: 0 0 16px 0; font-size: 18px; color: #333;", "Quick actions" }
                div { style: "display: flex; flex-direction: column; gap: 12px;",
                    button {
                        class: "btn-primary",
                        style: "padding: 16px; font-size: 16px;",
                        onclick: move |_| on_navigate.call(Screen::SongEdit(None)),
                        "🎵 Add a song"
                    }
                    button {
                        class: "btn-success",
                        style: "padding: 16px; font-size: 16px;",
                        onclick: move |_| on_navigate.call(Screen::PracticeAdd),
                        "🥁 Log a practice session"
                    }
                    button {
                        style: "padding: 16px; font-size: 16px; background: #ff8c00; color: white; border: none; border-radius: 8px; cursor: pointer;",
                        onclick: move |_| on_navigate.call(Screen::ShowEdit(None)),
                        "🎤 Book a show"
                    }
                }
            }
        }
    }
}
