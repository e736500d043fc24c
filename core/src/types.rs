//! Shared primitive types used across the ledger.

/// A customer's display name. Unique key within a ledger.
pub type CustomerName = String;

/// A ten-digit mobile number, stored as its integer value.
pub type MobileNumber = u64;

/// A reward-adjusted coffee tally.
pub type CoffeeCount = u64;

/// Number of paid coffees that earn one free coffee.
pub const REWARD_INTERVAL: u64 = 8;
