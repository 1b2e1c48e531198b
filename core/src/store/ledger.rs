//! Balance table queries. Policy (positive amounts, no overdraft)
//! lives in the ledger module, not here.

use super::SimStore;
use crate::{
    error::SimResult,
    types::{Coins, UserId},
};
use rusqlite::params;

impl SimStore {
    /// Current balance; users with no row hold zero coins.
    pub fn balance(&self, user_id: UserId) -> SimResult<Coins> {
        use rusqlite::OptionalExtension;
        let coins: Option<Coins> = self
            .conn
            .query_row(
                "SELECT coins FROM balance WHERE user_id = ?1",
                params![user_id as i64],
                |row| row.get(0),
            )
            .optional()?;
        Ok(coins.unwrap_or(0))
    }

    pub fn adjust_balance(&self, user_id: UserId, delta: Coins) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO balance (user_id, coins) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET coins = coins + excluded.coins",
            params![user_id as i64, delta],
        )?;
        Ok(())
    }

    /// Every non-empty balance, ordered by user id. Used by the runner
    /// summary.
    pub fn all_balances(&self) -> SimResult<Vec<(UserId, Coins)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id, coins FROM balance ORDER BY user_id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)? as UserId, row.get::<_, Coins>(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
