use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Song {
    pub id: Option<i64>,
    pub uuid: String,
    pub title: String,
    pub artist: Option<String>,
    pub song_key: Option<String>,
    pub tempo_bpm: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub notes: Option<String>,
}

impl Song {
    pub fn new(title: String) -> Self {
        Self {
            id: None,
            uuid: uuid::Uuid::new_v4().to_string(),
            title,
            artist: None,
            song_key: None,
            tempo_bpm: None,
            duration_seconds: None,
            notes: None,
        }
    }

    /// Maps a row selected with the column order of `song_service::SONG_COLUMNS`
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            title: row.get(2)?,
            artist: row.get(3)?,
            song_key: row.get(4)?,
            tempo_bpm: row.get(5)?,
            duration_seconds: row.get(6)?,
            notes: row.get(7)?,
        })
    }

    /// Sync-queue payload; the entity id always lives at `$.id`
    pub fn to_payload(&self) -> serde_json::Value {
        json!({
            "id": self.uuid,
            "title": self.title,
            "artist": self.artist,
            "song_key": self.song_key,
            "tempo_bpm": self.tempo_bpm,
            "duration_seconds": self.duration_seconds,
            "notes": self.notes,
        })
    }

    /// "3:45" style display for the song length
    pub fn duration_display(&self) -> String {
        match self.duration_seconds {
            Some(secs) if secs > 0 => format!("{}:{:02}", secs / 60, secs % 60),
            _ => "–".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_carries_entity_id() {
        let song = Song::new("Black Dog".to_string());
        let payload = song.to_payload();
        assert_eq!(payload["id"], serde_json::Value::String(song.uuid.clone()));
        assert_eq!(payload["title"], "Black Dog");
    }

    #[test]
    fn test_duration_display() {
        let mut song = Song::new("Intro".to_string());
        assert_eq!(song.duration_display(), "–");
        song.duration_seconds = Some(225);
        assert_eq!(song.duration_display(), "3:45");
    }
}
