pub mod home;
pub mod navigation;
pub mod practice_add;
pub mod practice_list;
pub mod setlist_edit;
pub mod setlist_list;
pub mod settings;
pub mod show_edit;
pub mod show_list;
pub mod song_edit;
pub mod song_list;
pub mod sync_status;

pub use home::HomeScreen;
pub use navigation::NavigationBar;
pub use practice_add::PracticeAddScreen;
pub use practice_list::PracticeListScreen;
pub use setlist_edit::SetlistEditScreen;
pub use setlist_list::SetlistListScreen;
pub use settings::SettingsScreen;
pub use show_edit::ShowEditScreen;
pub use show_list::ShowListScreen;
pub use song_edit::SongEditScreen;
pub use song_list::SongListScreen;
pub use sync_status::{use_status_provider, use_sync_event_bridge};
