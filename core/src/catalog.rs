//! The investment catalog — every venture a user can buy.
//!
//! Catalog entries are immutable: built once at startup, never
//! mutated, never persisted. Holdings reference entries by name, so a
//! lookup miss on a stored holding means the row predates a catalog
//! change and is treated as a data-integrity problem by the caller.

use crate::types::Coins;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Probability that crossing below the maintenance threshold
    /// triggers a risk event on that sweep tick.
    pub fn event_probability(&self) -> f64 {
        match self {
            Self::Low => 0.10,
            Self::Medium => 0.30,
            Self::High => 0.50,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentType {
    pub name: String,
    pub cost: Coins,
    /// Currency units accrued per whole elapsed hour.
    pub hourly_return: f64,
    /// Cap on accumulated-but-uncollected yield.
    pub max_holding: f64,
    /// Maintenance points lost per elapsed hour.
    pub maintenance_drain: f64,
    pub risk_level: RiskLevel,
    /// Named failure causes. Non-empty for every entry.
    pub risk_events: Vec<String>,
}

pub struct Catalog {
    types: Vec<InvestmentType>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(types: Vec<InvestmentType>) -> Self {
        let by_name = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        Self { types, by_name }
    }

    /// The built-in venture lineup.
    pub fn builtin() -> Self {
        fn entry(
            name: &str,
            cost: Coins,
            hourly_return: f64,
            max_holding: f64,
            maintenance_drain: f64,
            risk_level: RiskLevel,
            risk_events: &[&str],
        ) -> InvestmentType {
            InvestmentType {
                name: name.to_string(),
                cost,
                hourly_return,
                max_holding,
                maintenance_drain,
                risk_level,
                risk_events: risk_events.iter().map(|s| s.to_string()).collect(),
            }
        }

        Self::new(vec![
            entry("Lemonade Stand", 150, 4.0, 60.0, 3.0, RiskLevel::Low,
                  &["spoiled stock", "health inspection"]),
            entry("Grocery Store", 500, 10.0, 120.0, 5.0, RiskLevel::Low,
                  &["power outage", "supplier shortage"]),
            entry("Car Wash", 800, 15.0, 200.0, 6.0, RiskLevel::Low,
                  &["broken pump", "water shortage"]),
            entry("Food Truck", 1_200, 22.0, 260.0, 8.0, RiskLevel::Medium,
                  &["engine failure", "permit dispute", "kitchen fire"]),
            entry("Arcade", 2_000, 35.0, 420.0, 9.0, RiskLevel::Medium,
                  &["cabinet vandalism", "power surge"]),
            entry("Taxi Fleet", 3_200, 50.0, 600.0, 10.0, RiskLevel::Medium,
                  &["fender bender", "fuel spike", "license audit"]),
            entry("Night Club", 5_000, 80.0, 900.0, 12.0, RiskLevel::High,
                  &["license suspension", "flood damage", "staff walkout"]),
            entry("Crypto Mine", 8_000, 140.0, 1_500.0, 15.0, RiskLevel::High,
                  &["hardware burnout", "grid blackout", "exchange freeze"]),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&InvestmentType> {
        self.by_name.get(name).map(|&i| &self.types[i])
    }

    /// All entries in catalog order.
    pub fn types(&self) -> &[InvestmentType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
