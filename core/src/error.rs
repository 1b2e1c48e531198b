use crate::types::{Coins, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown investment type '{name}'")]
    UnknownInvestment { name: String },

    #[error("User {user_id} owns no '{investment}'")]
    NoHolding { user_id: UserId, investment: String },

    #[error("User {user_id} already owns a '{investment}'")]
    DuplicateHolding { user_id: UserId, investment: String },

    #[error("'{investment}' is down with an active risk event: {cause}")]
    RiskEventActive { investment: String, cause: String },

    #[error("'{investment}' has no active risk event to repair")]
    NoRiskEvent { investment: String },

    #[error("Collection on cooldown for another {remaining_secs}s")]
    OnCooldown { remaining_secs: u64 },

    #[error("Insufficient funds: have {balance}, need {required}")]
    InsufficientFunds { balance: Coins, required: Coins },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
