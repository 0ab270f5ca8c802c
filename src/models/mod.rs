pub mod practice_session;
pub mod queue_entry;
pub mod setlist;
pub mod show;
pub mod song;
pub mod sync_settings;

pub use practice_session::PracticeSession;
pub use queue_entry::{QueueEntry, QueueOperation, QueueState};
pub use setlist::{Setlist, SetlistSong};
pub use show::Show;
pub use song::Song;
pub use sync_settings::SyncSettings;
