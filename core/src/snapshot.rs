//! Snapshot serialization — the full ledger to/from JSON.
//!
//! The store is one JSON object keyed by customer name, written in
//! ledger order. The same shape is used for the structured export.

use crate::{
    clock::Month,
    customer::{CustomerRecord, PurchaseEntry},
    error::LedgerResult,
    types::{CoffeeCount, MobileNumber},
};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::fmt;

/// The value stored under each customer name.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCustomer {
    mobile_number:    MobileNumber,
    #[serde(deserialize_with = "count_at_least_zero")]
    quantity_coffee:  CoffeeCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated:     Option<Month>,
    #[serde(default)]
    purchase_history: Vec<PurchaseEntry>,
}

/// Older stores allowed negative counts; read those as zero rather than
/// rejecting the whole file.
fn count_at_least_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CoffeeCount, D::Error> {
    struct CountVisitor;

    impl Visitor<'_> for CountVisitor {
        type Value = CoffeeCount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer coffee count")
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<CoffeeCount, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<CoffeeCount, E> {
            if v < 0 {
                log::warn!("negative quantity_coffee {v} in store, reading it as 0");
            }
            Ok(u64::try_from(v).unwrap_or(0))
        }
    }

    deserializer.deserialize_u64(CountVisitor)
}

/// Every customer record, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub customers: Vec<CustomerRecord>,
}

impl LedgerSnapshot {
    pub fn new(customers: Vec<CustomerRecord>) -> Self {
        Self { customers }
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json(&self) -> LedgerResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8(buf).map_err(anyhow::Error::from)?)
    }

    pub fn from_json(json: &str) -> LedgerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Serialize for LedgerSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.customers.len()))?;
        for c in &self.customers {
            let stored = StoredCustomer {
                mobile_number:    c.mobile_number,
                quantity_coffee:  c.coffee_count,
                last_updated:     c.last_updated_month,
                purchase_history: c.purchase_history.clone(),
            };
            map.serialize_entry(&c.name, &stored)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LedgerSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SnapshotVisitor)
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = LedgerSnapshot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping customer names to records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut customers: Vec<CustomerRecord> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, stored)) = access.next_entry::<String, StoredCustomer>()? {
            let record = CustomerRecord {
                name,
                mobile_number:      stored.mobile_number,
                coffee_count:       stored.quantity_coffee,
                last_updated_month: stored.last_updated,
                purchase_history:   stored.purchase_history,
            };
            // Duplicate keys: last one wins, first position kept.
            match customers.iter_mut().find(|c| c.name == record.name) {
                Some(existing) => *existing = record,
                None => customers.push(record),
            }
        }
        Ok(LedgerSnapshot { customers })
    }
}
