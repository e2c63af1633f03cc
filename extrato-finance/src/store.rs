//! SQLite persistence: the movements table and the card directory.

use std::path::Path;

use extrato_core::{CardDirectory, Error, Result, Transaction, TransactionStore};
use rusqlite::{Connection, OpenFlags, params};
use tracing::{debug, info};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cards (
    id INTEGER NOT NULL UNIQUE,
    label TEXT
);

CREATE TABLE IF NOT EXISTS movements (
    id INTEGER PRIMARY KEY,
    transaction_id TEXT UNIQUE,
    date TEXT,
    description TEXT,
    value REAL NOT NULL,
    counterparty TEXT,
    method TEXT NOT NULL,
    institution_id INTEGER NOT NULL,
    institution_name TEXT NOT NULL,
    card_id INTEGER,
    category_name TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);
";

fn persistence(e: rusqlite::Error) -> Error {
    Error::Persistence(e.to_string())
}

/// Movement store and card directory backed by one SQLite database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).map_err(persistence)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").map_err(persistence)?;
        let store = Self { conn };
        store.init()?;
        debug!(path = %db_path.display(), "database opened");
        Ok(store)
    }

    /// Open an existing database for card lookups only. The schema and
    /// journal mode are left as found; inserts fail.
    pub fn open_read_only(db_path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(persistence)?;
        debug!(path = %db_path.display(), "database opened read-only");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(persistence)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Create tables if missing. Safe to call repeatedly.
    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA).map_err(persistence)
    }

    pub fn add_card(&self, card_id: i64, label: Option<&str>) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO cards (id, label) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET label = excluded.label",
                params![card_id, label],
            )
            .map_err(persistence)?;
        Ok(())
    }

    pub fn movement_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT count(*) FROM movements", [], |row| row.get(0))
            .map_err(persistence)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TransactionStore for SqliteStore {
    /// Insert every transaction in one SQLite transaction; nothing is kept
    /// if any row fails.
    fn insert(&mut self, transactions: &[Transaction]) -> Result<usize> {
        let tx = self.conn.transaction().map_err(persistence)?;
        let mut affected = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO movements (
                        transaction_id, date, description, value, counterparty,
                        method, institution_id, institution_name, card_id, category_name
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .map_err(persistence)?;
            for t in transactions {
                affected += stmt
                    .execute(params![
                        t.transaction_id,
                        t.date.map(|d| d.format("%Y-%m-%d").to_string()),
                        t.description,
                        t.value,
                        t.counterparty,
                        t.method.as_str(),
                        t.institution_id,
                        t.institution_name,
                        t.card_id,
                        t.category_name,
                    ])
                    .map_err(persistence)?;
            }
        }
        tx.commit().map_err(persistence)?;
        info!(rows = affected, "movements inserted");
        Ok(affected)
    }
}

impl CardDirectory for SqliteStore {
    fn list_cards(&self) -> Result<Vec<i64>> {
        let lookup = || -> rusqlite::Result<Vec<i64>> {
            let mut stmt = self.conn.prepare("SELECT id FROM cards ORDER BY rowid")?;
            let ids = stmt.query_map([], |row| row.get(0))?.collect::<rusqlite::Result<Vec<i64>>>()?;
            Ok(ids)
        };
        lookup().map_err(|e| Error::CardLookup(e.to_string()))
    }
}
