pub mod schema;

use crate::error::AppError;
use rusqlite::Connection;
use std::path::PathBuf;

/// Returns the path to the database file
pub fn get_database_path() -> PathBuf {
    PathBuf::from("./data/gigbook.db")
}

/// Initializes the database with the complete schema
pub fn init_database() -> Result<Connection, AppError> {
    let db_path = get_database_path();

    // Make sure the directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&db_path)?;

    schema::init_schema(&conn)?;

    Ok(conn)
}

/// Tests the database connection
#[allow(dead_code)]
pub fn test_connection() -> Result<(), AppError> {
    let conn = init_database()?;

    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
        [],
        |row| row.get(0),
    )?;

    if count < 3 {
        return Err(AppError::Database(rusqlite::Error::QueryReturnedNoRows));
    }

    Ok(())
}
