//! Currency movement rules.
//!
//! The balance table lives in the store; this module owns the policy:
//! amounts are positive, and a debit may never take a balance below
//! zero. The engine orders ledger calls around holding mutations —
//! debit before a purchase (refunded if insertion fails), credit after
//! a collect or sell.

use crate::{
    error::{SimError, SimResult},
    store::SimStore,
    types::{Coins, UserId},
};

/// Add coins to a user's balance. Returns the new balance.
pub fn credit(store: &SimStore, user_id: UserId, amount: Coins) -> SimResult<Coins> {
    assert!(amount > 0, "credit amount must be positive");
    store.adjust_balance(user_id, amount)?;
    store.balance(user_id)
}

/// Remove coins from a user's balance. Rejected without side effects
/// if the balance cannot cover the amount. Returns the new balance.
pub fn debit(store: &SimStore, user_id: UserId, amount: Coins) -> SimResult<Coins> {
    assert!(amount > 0, "debit amount must be positive");
    let balance = store.balance(user_id)?;
    if balance < amount {
        return Err(SimError::InsufficientFunds {
            balance,
            required: amount,
        });
    }
    store.adjust_balance(user_id, -amount)?;
    Ok(balance - amount)
}
