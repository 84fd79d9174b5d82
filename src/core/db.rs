//! SQLite connection and schema management
use std::path::Path;

use anyhow::Result;
use tokio_rusqlite::Connection;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  email TEXT UNIQUE NOT NULL,
  is_confirmed INTEGER NOT NULL DEFAULT 0,
  one_time_code TEXT,
  otp_expiry TEXT
);

CREATE TABLE IF NOT EXISTS events (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  organizer_id INTEGER NOT NULL,
  title TEXT NOT NULL,
  start_datetime TEXT NOT NULL,
  end_datetime TEXT NOT NULL,
  status TEXT NOT NULL DEFAULT 'pending',
  created_at TEXT NOT NULL,
  FOREIGN KEY(organizer_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS invitees (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  event_id INTEGER NOT NULL,
  email TEXT NOT NULL,
  token TEXT UNIQUE NOT NULL,
  status TEXT NOT NULL DEFAULT 'pending',
  responded_at TEXT,
  FOREIGN KEY(event_id) REFERENCES events(id)
);

CREATE TABLE IF NOT EXISTS responses (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  invitee_id INTEGER NOT NULL,
  available_slot TEXT NOT NULL,
  FOREIGN KEY(invitee_id) REFERENCES invitees(id)
);
";

const INDICES: &str = r"
CREATE INDEX IF NOT EXISTS invitees_event_id_idx ON invitees(event_id);
CREATE INDEX IF NOT EXISTS responses_invitee_id_idx ON responses(invitee_id);
CREATE INDEX IF NOT EXISTS events_organizer_id_idx ON events(organizer_id);
";

/// Open the database at `db_path`, creating parent directories as
/// needed. Foreign keys are enforced on every connection.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(db_path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let db = Connection::open(db_path).await?;
    enable_foreign_keys(&db).await?;
    Ok(db)
}

/// In-memory database, used by tests and one-off tooling
pub async fn memory_db() -> Result<Connection> {
    let db = Connection::open_in_memory().await?;
    enable_foreign_keys(&db).await?;
    db.call(|conn| Ok(initialize_db(conn)?)).await?;
    Ok(db)
}

async fn enable_foreign_keys(db: &Connection) -> Result<()> {
    db.call(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub fn initialize_db(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(INDICES)?;
    Ok(())
}

/// Bring an existing database up to the current schema. Every statement
/// is idempotent so this is safe to run repeatedly.
pub fn migrate_db(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.execute_batch(INDICES)?;
    tx.commit()
}
