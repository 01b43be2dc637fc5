//! Destination store: the local SQLite contact database.
//!
//! Every table carries `account_id`; an import owns all rows of one account.
//! Schema versioning belongs to the application, [`ensure_schema`] only
//! creates missing tables so the importer can run against a fresh file.

mod insert;

pub use insert::*;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;

/// Destination tables, children before parents
pub const WIPE_ORDER: [&str; 12] = [
    "contact_tags",
    "activity_participants",
    "contact_methods",
    "notes",
    "relationships",
    "addresses",
    "life_events",
    "gifts",
    "reminders",
    "activities",
    "tags",
    "contacts",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    first_name TEXT NOT NULL,
    middle_name TEXT,
    last_name TEXT,
    nickname TEXT,
    gender TEXT,
    birthday TEXT,
    birthday_month INTEGER,
    birthday_day INTEGER,
    birth_year_approx INTEGER,
    deceased_on TEXT,
    status TEXT NOT NULL CHECK (status IN ('active', 'archived', 'deceased')),
    is_favorite INTEGER NOT NULL DEFAULT 0,
    how_we_met TEXT,
    job_title TEXT,
    company TEXT,
    food_preferences TEXT,
    description TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contacts_account ON contacts(account_id);

CREATE TABLE IF NOT EXISTS tags (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    name TEXT NOT NULL,
    UNIQUE (account_id, name)
);

CREATE TABLE IF NOT EXISTS contact_tags (
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    tag_id TEXT NOT NULL REFERENCES tags(id),
    PRIMARY KEY (contact_id, tag_id)
);

CREATE TABLE IF NOT EXISTS contact_methods (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    kind TEXT NOT NULL,
    value TEXT NOT NULL,
    label TEXT
);
CREATE INDEX IF NOT EXISTS idx_contact_methods_account ON contact_methods(account_id);

CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    title TEXT,
    body TEXT NOT NULL,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notes_account ON notes(account_id);

CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    activity_type TEXT,
    happened_on TEXT
);

CREATE TABLE IF NOT EXISTS activity_participants (
    account_id TEXT NOT NULL,
    activity_id TEXT NOT NULL REFERENCES activities(id),
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    PRIMARY KEY (activity_id, contact_id)
);

CREATE TABLE IF NOT EXISTS relationships (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    related_contact_id TEXT NOT NULL REFERENCES contacts(id),
    relationship_type TEXT NOT NULL,
    UNIQUE (contact_id, related_contact_id, relationship_type)
);

CREATE TABLE IF NOT EXISTS addresses (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    label TEXT,
    street TEXT,
    city TEXT,
    province TEXT,
    postal_code TEXT,
    country TEXT,
    latitude REAL,
    longitude REAL
);

CREATE TABLE IF NOT EXISTS life_events (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    category TEXT NOT NULL,
    event_type TEXT NOT NULL,
    title TEXT NOT NULL,
    note TEXT,
    happened_on TEXT
);

CREATE TABLE IF NOT EXISTS gifts (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    name TEXT NOT NULL,
    description TEXT,
    url TEXT,
    amount REAL,
    status TEXT NOT NULL CHECK (status IN ('idea', 'given', 'received')),
    occurred_on TEXT
);

CREATE TABLE IF NOT EXISTS reminders (
    id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id),
    title TEXT NOT NULL,
    description TEXT,
    next_due TEXT,
    recurrence TEXT NOT NULL,
    recurrence_interval INTEGER NOT NULL DEFAULT 1
);
"#;

/// Open (or create) a database file with foreign keys enforced
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .context("Failed to enable WAL mode")?;
    prepare(conn)
}

/// In-memory database, used for dry runs and tests
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
    prepare(conn)
}

fn prepare(conn: Connection) -> Result<Connection> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .context("Failed to enable foreign keys")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create any missing destination table
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Failed to create destination schema")
}

/// Delete every row of an account, children first. Returns rows deleted.
pub fn wipe_account(conn: &Connection, account_id: &str) -> rusqlite::Result<usize> {
    let mut deleted = 0;
    for table in WIPE_ORDER {
        let n = conn.execute(
            &format!("DELETE FROM {} WHERE account_id = ?1", table),
            params![account_id],
        )?;
        if n > 0 {
            log::debug!("wiped {} rows from {}", n, table);
        }
        deleted += n;
    }
    Ok(deleted)
}

/// Row counts of one account for every destination table, in wipe order
pub fn account_row_counts(
    conn: &Connection,
    account_id: &str,
) -> rusqlite::Result<Vec<(&'static str, i64)>> {
    WIPE_ORDER
        .iter()
        .map(|table| {
            let n: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE account_id = ?1", table),
                params![account_id],
                |row| row.get(0),
            )?;
            Ok((*table, n))
        })
        .collect()
}

/// Whether an error belongs to the row being written (constraint, type or
/// size violations) rather than to the database or transaction itself.
pub fn is_row_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::ConstraintViolation | ErrorCode::TypeMismatch | ErrorCode::TooBig
        ),
        rusqlite::Error::ToSqlConversionFailure(_) => true,
        _ => false,
    }
}
