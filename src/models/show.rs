use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Show {
    pub id: Option<i64>,
    pub uuid: String,
    pub venue: String,
    pub city: Option<String>,
    /// YYYY-MM-DD
    pub show_date: String,
    /// HH:MM, optional
    pub start_time: Option<String>,
    pub setlist_id: Option<String>,
    pub notes: Option<String>,
}

impl Show {
    pub fn new(venue: String, show_date: String) -> Self {
        Self {
            id: None,
            uuid: uuid::Uuid::new_v4().to_string(),
            venue,
            city: None,
            show_date,
            start_time: None,
            setlist_id: None,
            notes: None,
        }
    }

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            uuid: row.get(1)?,
            venue: row.get(2)?,
            city: row.get(3)?,
            show_date: row.get(4)?,
            start_time: row.get(5)?,
            setlist_id: row.get(6)?,
            notes: row.get(7)?,
        })
    }

    pub fn to_payload(&self) -> serde_json::Value {
        json!({
            "id": self.uuid,
            "venue": self.venue,
            "city": self.city,
            "show_date": self.show_date,
            "start_time": self.start_time,
            "setlist_id": self.setlist_id,
            "notes": self.notes,
        })
    }

}
