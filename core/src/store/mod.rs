//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine and ledger call store methods — they never execute SQL
//! directly.

use crate::{
    error::SimResult,
    event::EventLogEntry,
    types::Timestamp,
};
use rusqlite::{params, Connection, OptionalExtension};

mod holding;
mod ledger;

pub struct SimStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for a file
}

impl SimStore {
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only takes effect for real files (shared-memory and
        // :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases this returns a fresh, isolated database;
    /// for file-based databases it opens the same file.
    pub fn reopen(&self) -> SimResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_holdings.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_ledger.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        started_ts: Timestamp,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_ts) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, started_ts as i64],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, ts, source, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.ts as i64,
                entry.source,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    /// Every event for a run, in append order. Used by the determinism
    /// test and replay tooling.
    pub fn all_events(&self, run_id: &str) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, ts, source, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    ts: row.get::<_, i64>(2)? as Timestamp,
                    source: row.get(3)?,
                    event_type: row.get(4)?,
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str) -> SimResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn event_count_by_type(&self, run_id: &str, event_type: &str) -> SimResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
                params![run_id, event_type],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── Sweep checkpoint ───────────────────────────────────────

    pub fn last_sweep_ts(&self) -> SimResult<Option<Timestamp>> {
        let ts: Option<i64> = self
            .conn
            .query_row(
                "SELECT last_sweep_ts FROM sweep_checkpoint WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ts.map(|t| t as Timestamp))
    }

    pub fn set_last_sweep_ts(&self, ts: Timestamp) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO sweep_checkpoint (id, last_sweep_ts) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET last_sweep_ts = excluded.last_sweep_ts",
            params![ts as i64],
        )?;
        Ok(())
    }
}
