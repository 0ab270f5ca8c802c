use crate::models::Song;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setlist {
    pub id: Option<i64>,
    pub uuid: String,
    pub name: String,
    pub notes: Option<String>,
}

impl Setlist {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            uuid: uuid::Uuid::new_v4().to_string(),
            name,
            notes: None,
        }
    }

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            name: row.get(2)?,
            notes: row.get(3)?,
        })
    }

    /// Sync-queue payload including the current song ordering
    pub fn to_payload(&self, song_ids: &[String]) -> serde_json::Value {
        json!({
            "id": self.uuid,
            "name": self.name,
            "notes": self.notes,
            "song_ids": song_ids,
        })
    }
}

/// One positioned song inside a setlist (join of setlist_songs and songs)
#[derive(Debug, Clone, PartialEq)]
pub struct SetlistSong {
    pub song: Song,
    pub position: i64,
}
