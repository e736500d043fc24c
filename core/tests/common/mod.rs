//! Shared fixtures for ledger integration tests.

#![allow(dead_code)]

use loyalty_core::{
    clock::{FixedClock, Month},
    ledger::Ledger,
    store::LedgerStore,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ADA_MOBILE: u64 = 9_876_543_210;
pub const BO_MOBILE: u64 = 9_123_456_789;

pub fn month(s: &str) -> Month {
    s.parse().expect("valid month")
}

pub fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("customers.json")
}

/// A ledger over `path` whose clock is pinned to `at`.
pub fn open_at(path: &Path, at: &str) -> Ledger {
    let _ = env_logger::builder().is_test(true).try_init();
    Ledger::open_with_clock(LedgerStore::new(path), Box::new(FixedClock::at_month(month(at))))
}

/// A fresh ledger in its own scratch directory.
pub fn fresh(at: &str) -> (TempDir, Ledger) {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = open_at(&store_path(&dir), at);
    (dir, ledger)
}
