//! Holding table queries.

use super::SimStore;
use crate::{
    error::SimResult,
    holding::Holding,
    types::{Timestamp, UserId},
};
use rusqlite::{params, OptionalExtension, Row};

fn holding_row_mapper(row: &Row<'_>) -> rusqlite::Result<Holding> {
    Ok(Holding {
        holding_id: row.get(0)?,
        user_id: row.get::<_, i64>(1)? as UserId,
        investment: row.get(2)?,
        purchase_ts: row.get::<_, i64>(3)? as Timestamp,
        maintenance: row.get(4)?,
        accumulated: row.get(5)?,
        risk_event: row.get(6)?,
        last_update: row.get::<_, i64>(7)? as Timestamp,
        last_collection_ts: row.get::<_, i64>(8)? as Timestamp,
    })
}

const HOLDING_COLUMNS: &str = "holding_id, user_id, investment, purchase_ts,
            maintenance, accumulated, risk_event, last_update, last_collection_ts";

impl SimStore {
    pub fn insert_holding(&self, h: &Holding) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO holding (
                holding_id, user_id, investment, purchase_ts,
                maintenance, accumulated, risk_event, last_update, last_collection_ts
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                h.holding_id,
                h.user_id as i64,
                h.investment,
                h.purchase_ts as i64,
                h.maintenance,
                h.accumulated,
                h.risk_event,
                h.last_update as i64,
                h.last_collection_ts as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_holding(&self, user_id: UserId, investment: &str) -> SimResult<Option<Holding>> {
        let result = self
            .conn
            .query_row(
                &format!(
                    "SELECT {HOLDING_COLUMNS} FROM holding
                     WHERE user_id = ?1 AND investment = ?2"
                ),
                params![user_id as i64, investment],
                holding_row_mapper,
            )
            .optional()?;
        Ok(result)
    }

    pub fn holdings_for_user(&self, user_id: UserId) -> SimResult<Vec<Holding>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HOLDING_COLUMNS} FROM holding
             WHERE user_id = ?1 ORDER BY rowid ASC"
        ))?;
        let rows = stmt.query_map(params![user_id as i64], holding_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every holding across all users, in insertion order. The sweep
    /// iterates this; no cross-instance ordering is promised beyond it.
    pub fn all_holdings(&self) -> SimResult<Vec<Holding>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HOLDING_COLUMNS} FROM holding ORDER BY rowid ASC"
        ))?;
        let rows = stmt.query_map([], holding_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Whole-row write-back keyed by (user, investment).
    pub fn update_holding(&self, h: &Holding) -> SimResult<()> {
        self.conn.execute(
            "UPDATE holding SET
                maintenance = ?1, accumulated = ?2, risk_event = ?3,
                last_update = ?4, last_collection_ts = ?5
             WHERE user_id = ?6 AND investment = ?7",
            params![
                h.maintenance,
                h.accumulated,
                h.risk_event,
                h.last_update as i64,
                h.last_collection_ts as i64,
                h.user_id as i64,
                h.investment,
            ],
        )?;
        Ok(())
    }

    pub fn delete_holding(&self, user_id: UserId, investment: &str) -> SimResult<()> {
        self.conn.execute(
            "DELETE FROM holding WHERE user_id = ?1 AND investment = ?2",
            params![user_id as i64, investment],
        )?;
        Ok(())
    }

    pub fn holding_count(&self) -> SimResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM holding", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
