//! The ledger's event journal.
//!
//! Every mutation pushes one or more events. Front ends drain the
//! journal after each call to show notifications.

use crate::{
    clock::Month,
    types::{CoffeeCount, CustomerName, REWARD_INTERVAL},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    CustomerAdded {
        name:         CustomerName,
        coffee_count: CoffeeCount,
        replaced:     bool,
    },
    CoffeeAdded {
        name:         CustomerName,
        delta:        i64,
        coffee_count: CoffeeCount,
    },
    /// One-shot; fires on every update that leaves the count at or above
    /// the reward threshold.
    RewardAvailable {
        name:         CustomerName,
        coffee_count: CoffeeCount,
    },
    MonthlyRolloverApplied {
        month: Month,
        reset: usize,
    },
}

impl LedgerEvent {
    /// A stable string name for each variant.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CustomerAdded { .. }          => "customer_added",
            Self::CoffeeAdded { .. }            => "coffee_added",
            Self::RewardAvailable { .. }        => "reward_available",
            Self::MonthlyRolloverApplied { .. } => "monthly_rollover_applied",
        }
    }

    /// Human-readable line for notification surfaces.
    pub fn describe(&self) -> String {
        match self {
            Self::CustomerAdded { name, replaced: false, .. } => {
                format!("Customer {name} added successfully!")
            }
            Self::CustomerAdded { name, replaced: true, .. } => {
                format!("Customer {name} replaced.")
            }
            Self::CoffeeAdded { name, coffee_count, .. } => {
                format!("Coffee quantity updated for {name}: now {coffee_count}.")
            }
            Self::RewardAvailable { name, .. } => {
                format!("{name} reached {REWARD_INTERVAL} coffees! Enjoy a free one!")
            }
            Self::MonthlyRolloverApplied { month, reset } => {
                format!("Monthly rollover for {month}: {reset} customer(s) reset.")
            }
        }
    }
}
