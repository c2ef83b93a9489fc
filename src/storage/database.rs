use rusqlite::{Connection, Result as SqlResult};
use std::fs;
use std::path::Path;

/// Base database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, creating its directory first.
    pub fn new<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(err) = fs::create_dir_all(parent) {
                    log::warn!("Unable to create {}: {err}", parent.display());
                }
            }
        }
        let db = Self {
            conn: Connection::open(path)?,
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn in_memory() -> SqlResult<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn init_schema(&self) -> SqlResult<()> {
        let conn = &self.conn;

        // Auth accounts, the local stand-in for the hosted auth service
        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                salt TEXT NOT NULL,
                display_name TEXT,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;

        // Every application table lives here as JSON bodies keyed by table name
        conn.execute(
            "CREATE TABLE IF NOT EXISTS rows (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                table_name TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                UNIQUE (table_name, id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_rows_table_name ON rows(table_name)",
            [],
        )?;

        Ok(())
    }
}
