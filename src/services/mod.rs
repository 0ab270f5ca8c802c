pub mod background_sync;
pub mod practice_service;
pub mod pull_service;
pub mod push_service;
pub mod queue_service;
pub mod setlist_service;
pub mod show_service;
pub mod song_service;
pub mod status_service;
pub mod sync_service;
