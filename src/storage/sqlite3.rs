use crate::daemon::events::KeystrokeEvent;
use crate::error::Result;
use crate::storage::KeystrokeRow;
use crate::util::paths;
use log::{debug, warn};
use rusqlite::{Connection, params};
use std::path::Path;

const CREATE_KEYSTROKES_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS keystrokes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scan_code INTEGER NOT NULL,
    key_name TEXT NOT NULL,
    date DATE NOT NULL,
    count INTEGER DEFAULT 0,
    UNIQUE(scan_code, date)
);";

const UPSERT_KEYSTROKE_SQL: &str = "INSERT INTO keystrokes (scan_code, key_name, date, count)
 VALUES (?1, ?2, ?3, 1)
 ON CONFLICT(scan_code, date) DO UPDATE SET
     count = count + 1,
     key_name = excluded.key_name;";

/// Aggregation store for per-day keystroke counts.
///
/// Single writer: the daemon thread. The WAL journal keeps concurrent
/// read-only consumers (the frontend opens the same file) safe, and together
/// with `synchronous=NORMAL` bounds commit latency on the input path at the
/// cost of a short durability window on power loss.
pub struct KeystrokeStore {
    conn: Connection,
}

impl KeystrokeStore {
    /// Open the database at `path`, creating the file and its parent
    /// directories if needed, and make sure pragmas and schema are in place.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        paths::ensure_parent_dirs(path)?;
        let conn = Connection::open(path)?;
        Self::apply_pragmas(&conn)?;
        let store = Self { conn };
        store.create_tables()?;
        debug!("keystroke store ready at {}", path.display());
        Ok(store)
    }

    fn apply_pragmas(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "cache_size", 10000)?;
        conn.pragma_update(None, "temp_store", "memory")?;
        Ok(())
    }

    /// Idempotent schema creation.
    pub fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(CREATE_KEYSTROKES_TABLE_SQL)?;
        Ok(())
    }

    /// Upsert a whole batch inside one transaction, preparing the statement
    /// once. A row that fails to step is logged and skipped; the rest of the
    /// batch still commits. A commit failure rolls everything back.
    pub fn write_batch(&mut self, events: &[KeystrokeEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPSERT_KEYSTROKE_SQL)?;
            for event in events {
                if let Err(err) =
                    stmt.execute(params![event.scan_code, event.key_name, event.date])
                {
                    warn!(
                        "skipping keystroke ({}, {}): {err}",
                        event.scan_code, event.date
                    );
                }
            }
        }
        tx.commit()?;
        debug!("committed a batch of {} keystrokes", events.len());
        Ok(())
    }

    /// All rows recorded for one `YYYY-MM-DD` date, ordered by scan code.
    pub fn fetch_date(&self, date: &str) -> Result<Vec<KeystrokeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, scan_code, key_name, date, count FROM keystrokes
             WHERE date = ?1 ORDER BY scan_code ASC",
        )?;
        let rows = stmt.query_map([date], |row| {
            Ok(KeystrokeRow {
                id: row.get(0)?,
                scan_code: row.get(1)?,
                key_name: row.get(2)?,
                date: row.get(3)?,
                count: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Sum of all counts over the lifetime of the store.
    pub fn total_count(&self) -> Result<u64> {
        let total: i64 =
            self.conn
                .query_row("SELECT COALESCE(SUM(count), 0) FROM keystrokes", [], |row| {
                    row.get(0)
                })?;
        Ok(total as u64)
    }
}
