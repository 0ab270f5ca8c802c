use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticeSession {
    pub id: Option<i64>,
    pub uuid: String,
    /// YYYY-MM-DD
    pub session_date: String,
    pub duration_minutes: i64,
    pub setlist_id: Option<String>,
    pub notes: Option<String>,
}

impl PracticeSession {
    pub fn new(session_date: String, duration_minutes: i64) -> Self {
        Self {
            id: None,
            uuid: uuid::Uuid::new_v4().to_string(),
            session_date,
            duration_minutes,
            setlist_id: None,
            notes: None,
        }
    }

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            session_date: row.get(2)?,
            duration_minutes: row.get(3)?,
            setlist_id: row.get(4)?,
            notes: row.get(5)?,
        })
    }

    pub fn to_payload(&self) -> serde_json::Value {
        json!({
            "id": self.uuid,
            "session_date": self.session_date,
            "duration_minutes": self.duration_minutes,
            "setlist_id": self.setlist_id,
            "notes": self.notes,
        })
    }
}
