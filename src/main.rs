use dioxus::prelude::*;

mod components;
mod database;
mod error;
mod models;
mod services;

use components::{
    HomeScreen, NavigationBar, PracticeAddScreen, PracticeListScreen, SetlistEditScreen,
    SetlistListScreen, SettingsScreen, ShowEditScreen, ShowListScreen, SongEditScreen,
    SongListScreen,
};
use components::{use_status_provider, use_sync_event_bridge};
use services::{background_sync, sync_service};

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    env_logger::init();
    dioxus::launch(App);
}

/// Screen navigation for the app
#[derive(Clone, PartialEq, Debug)]
pub enum Screen {
    Home,
    Songs,
    SongEdit(Option<String>), // None = create
    Setlists,
    SetlistEdit(String),
    Shows,
    ShowEdit(Option<String>), // None = create
    Practice,
    PracticeAdd,
    Settings,
}

#[component]
fn App() -> Element {
    let mut current_screen = use_signal(|| Screen::Home);

    // Status subsystem: one provider at the root, one bridge listener
    use_status_provider();
    use_sync_event_bridge();

    // Resume background sync if it was enabled last session
    use_effect(|| {
        match database::init_database() {
            Ok(conn) => match sync_service::load_sync_settings(&conn) {
                Ok(Some(settings)) if settings.enabled => {
                    background_sync::start_background_sync();
                }
                Ok(_) => {}
                Err(e) => log::error!("Failed to load sync settings: {}", e),
            },
            Err(e) => log::error!("Database unavailable at startup: {}", e),
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        div { style: "display: flex; flex-direction: column; height: 100vh; font-family: sans-serif;",

            // Main content
            div { style: "flex: 1; overflow-y: auto;",
                match current_screen() {
                    Screen::Home => rsx! {
                        HomeScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::Songs => rsx! {
                        SongListScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::SongEdit(uuid) => rsx! {
                        SongEditScreen { uuid, on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::Setlists => rsx! {
                        SetlistListScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::SetlistEdit(uuid) => rsx! {
                        SetlistEditScreen { uuid, on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::Shows => rsx! {
                        ShowListScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::ShowEdit(uuid) => rsx! {
                        ShowEditScreen { uuid, on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::Practice => rsx! {
                        PracticeListScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::PracticeAdd => rsx! {
                        PracticeAddScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::Settings => rsx! {
                        SettingsScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                }
            }

            // Bottom navigation bar
            NavigationBar {
                current_screen: current_screen(),
                on_navigate: move |screen| current_screen.set(screen),
            }
        }
    }
}
