use crate::Screen;
use dioxus::prelude::*;

const ACTIVE: &str = "flex: 1; padding: 12px 4px; margin: 0 4px; border: none; border-radius: 8px; cursor: pointer; font-size: 13px; text-align: center; background: #0066cc; color: #ffffff;";
const INACTIVE: &str = "flex: 1; padding: 12px 4px; margin: 0 4px; border: none; border-radius: 8px; cursor: pointer; font-size: 13px; text-align: center; background: #ffffff; color: #333;";

#[component]
pub fn NavigationBar(current_screen: Screen, on_navigate: EventHandler<Screen>) -> Element {
    let nav_style = "display: flex; justify-content: space-around; padding: 10px; background: #f0f0f0; border-top: 1px solid #ddd;";

    rsx! {
        div {
            style: "{nav_style}",

            button {
                style: if matches!(current_screen, Screen::Home) { ACTIVE } else { INACTIVE },
                onclick: move |_| on_navigate.call(Screen::Home),
                "🏠 Home"
            }

            button {
                style: if matches!(current_screen, Screen::Songs | Screen::SongEdit(_)) { ACTIVE } else { INACTIVE },
                onclick: move |_| on_navigate.call(Screen::Songs),
                "🎵 Songs"
            }

            button {
                style: if matches!(current_screen, Screen::Setlists | Screen::SetlistEdit(_)) { ACTIVE } else { INACTIVE },
                onclick: move |_| on_navigate.call(Screen::Setlists),
                "📋 Setlists"
            }

            button {
                style: if matches!(current_screen, Screen::Shows | Screen::ShowEdit(_)) { ACTIVE } else { INACTIVE },
                onclick: move |_| on_navigate.call(Screen::Shows),
                "🎤 Shows"
            }

            button {
                style: if matches!(current_screen, Screen::Practice | Screen::PracticeAdd) { ACTIVE } else { INACTIVE },
                onclick: move |_| on_navigate.call(Screen::Practice),
                "🥁 Practice"
            }
        }
    }
}
