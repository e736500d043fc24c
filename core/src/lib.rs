//! Loyalty ledger for a single coffee shop.
//!
//! Tracks customers and their coffee counts, grants one free coffee per
//! eight paid, and keeps a JSON store in sync with memory.

pub mod clock;
pub mod command;
pub mod config;
pub mod customer;
pub mod error;
pub mod event;
pub mod export;
pub mod ledger;
pub mod reward;
pub mod snapshot;
pub mod store;
pub mod types;
