//! Persistence: whole-file round trips, degraded loads, failed writes.

use loyalty_core::{
    error::LedgerError,
    snapshot::LedgerSnapshot,
    store::LedgerStore,
};

mod common;
use common::*;

#[test]
fn persist_then_reload_is_structurally_equal() {
    let (dir, mut ledger) = fresh("2025-03");
    ledger.add_or_replace_customer("Zed", ADA_MOBILE, &[2, 3, 1]).unwrap();
    ledger.add_or_replace_customer("Ada", BO_MOBILE, &[8]).unwrap();
    ledger.add_coffee_to_customer("Zed", 4).unwrap();
    ledger.add_or_replace_customer("Mia", ADA_MOBILE, &[1]).unwrap();

    let reloaded = open_at(&store_path(&dir), "2025-03");
    assert_eq!(reloaded.snapshot(), ledger.snapshot());
    assert!(reloaded.load_warning().is_none());
}

#[test]
fn every_mutation_rewrites_the_store() {
    let (dir, mut ledger) = fresh("2025-03");
    let store = LedgerStore::new(store_path(&dir));
    assert!(store.try_load().unwrap().is_none());

    ledger.add_or_replace_customer("Ada", ADA_MOBILE, &[1]).unwrap();
    assert_eq!(store.try_load().unwrap().unwrap().customers[0].coffee_count, 1);

    ledger.add_coffee_to_customer("Ada", 2).unwrap();
    assert_eq!(store.try_load().unwrap().unwrap().customers[0].coffee_count, 3);
}

#[test]
fn missing_store_loads_empty_without_warning() {
    let (_dir, ledger) = fresh("2025-03");
    assert!(ledger.list_all_customers().is_empty());
    assert!(ledger.load_warning().is_none());
}

#[test]
fn corrupt_store_loads_empty_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    std::fs::write(&path, "{ \"Ada\": { \"mobile_number\": ").unwrap();

    let ledger = open_at(&path, "2025-03");
    assert!(ledger.list_all_customers().is_empty());
    assert!(matches!(ledger.load_warning(), Some(LedgerError::StorageRead { .. })));
}

#[test]
fn wrong_shape_store_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let ledger = open_at(&path, "2025-03");
    assert!(ledger.list_all_customers().is_empty());
    assert!(ledger.load_warning().is_some());
}

#[test]
fn store_written_by_older_version_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    std::fs::write(
        &path,
        r#"{
    "Ada": { "mobile_number": 9876543210, "quantity_coffee": 13, "last_updated": "2025-02" },
    "Bo":  { "mobile_number": 9123456789, "quantity_coffee": 4 }
}"#,
    )
    .unwrap();

    let ledger = open_at(&path, "2025-03");
    let customers = ledger.list_all_customers();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0].last_updated_month, Some(month("2025-02")));
    assert_eq!(customers[1].last_updated_month, None);
    assert_eq!(ledger.find_customer("bo").unwrap().coffee_count, 4);
}

#[test]
fn store_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop").join("data").join("customers.json");
    let mut ledger = open_at(&path, "2025-03");
    ledger.add_or_replace_customer("Ada", ADA_MOBILE, &[1]).unwrap();
    assert!(path.exists());
}

#[test]
fn failed_write_is_reported_and_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    // The store path is a directory, so the final rename must fail.
    let path = dir.path().join("customers.json");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), "x").unwrap();

    let mut ledger = open_at(&path, "2025-03");
    let before = ledger.snapshot();

    let err = ledger.add_or_replace_customer("Ada", ADA_MOBILE, &[1]).unwrap_err();
    assert!(matches!(err, LedgerError::StorageWrite { .. }));
    assert_eq!(ledger.snapshot(), before);
    assert!(ledger.find_customer("Ada").is_err());
    assert!(ledger.drain_events().is_empty());
}

#[test]
fn snapshot_json_round_trips() {
    let (_dir, mut ledger) = fresh("2025-03");
    ledger.add_or_replace_customer("Ada \"the\" First", ADA_MOBILE, &[3, 5]).unwrap();
    ledger.add_coffee_to_customer("Ada \"the\" First", -2).unwrap();

    let json = ledger.snapshot().to_json().unwrap();
    assert_eq!(LedgerSnapshot::from_json(&json).unwrap(), ledger.snapshot());
}

#[test]
fn negative_counts_from_older_stores_keep_every_customer() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    std::fs::write(
        &path,
        r#"{
    "Ada": { "mobile_number": 9876543210, "quantity_coffee": -2, "last_updated": "2025-03" },
    "Bo":  { "mobile_number": 9123456789, "quantity_coffee": 7, "last_updated": "2025-03" }
}"#,
    )
    .unwrap();

    let mut ledger = open_at(&path, "2025-03");
    assert!(ledger.load_warning().is_none());
    assert_eq!(ledger.find_customer("Ada").unwrap().coffee_count, 0);
    assert_eq!(ledger.find_customer("Bo").unwrap().coffee_count, 7);

    // A later write must not lose anyone.
    ledger.add_or_replace_customer("Cy", ADA_MOBILE, &[1]).unwrap();
    let reloaded = open_at(&path, "2025-03");
    assert_eq!(reloaded.list_all_customers().len(), 3);
}
