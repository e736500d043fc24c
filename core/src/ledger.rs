//! The loyalty ledger — owns every customer record.
//!
//! RULES:
//!   - Records live in insertion order; names are unique.
//!   - Every mutation persists the whole ledger before returning.
//!   - A failed persist rolls the in-memory change back, so memory
//!     and storage never disagree.
//!   - All time flows through the ledger's clock.

use crate::{
    clock::{LedgerClock, Month, SystemClock},
    customer::CustomerRecord,
    error::{LedgerError, LedgerResult},
    event::LedgerEvent,
    reward::reward_available,
    snapshot::LedgerSnapshot,
    store::LedgerStore,
    types::{CoffeeCount, CustomerName, MobileNumber},
};
use serde::Serialize;

/// Result of adding coffees to an existing customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoffeeUpdate {
    pub record:           CustomerRecord,
    pub reward_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub total_coffees: CoffeeCount,
    pub top_customer:  Option<CustomerName>,
    pub month:         Month,
}

pub struct Ledger {
    customers:    Vec<CustomerRecord>,
    store:        LedgerStore,
    clock:        Box<dyn LedgerClock>,
    events:       Vec<LedgerEvent>,
    load_warning: Option<LedgerError>,
}

impl Ledger {
    /// Load the ledger from `store` using wall-clock time.
    pub fn open(store: LedgerStore) -> Self {
        Self::open_with_clock(store, Box::new(SystemClock))
    }

    /// Load the ledger from `store`. A missing or corrupt store gives an
    /// empty ledger; the swallowed error is kept in `load_warning()`.
    pub fn open_with_clock(store: LedgerStore, clock: Box<dyn LedgerClock>) -> Self {
        let (snapshot, load_warning) = store.load();
        log::info!(
            "ledger opened: {} customers from {}",
            snapshot.customers.len(),
            store.path().display()
        );
        Self {
            customers: snapshot.customers,
            store,
            clock,
            events: Vec::new(),
            load_warning,
        }
    }

    pub fn load_warning(&self) -> Option<&LedgerError> {
        self.load_warning.as_ref()
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn current_month(&self) -> Month {
        self.clock.current_month()
    }

    // ── Operations ─────────────────────────────────────────────

    /// Create or overwrite the record under `name` (trimmed). Any prior
    /// count and history for that name are replaced, not merged.
    pub fn add_or_replace_customer(
        &mut self,
        name: &str,
        mobile_number: MobileNumber,
        raw_quantities: &[u64],
    ) -> LedgerResult<CustomerRecord> {
        let record = CustomerRecord::new(
            name,
            mobile_number,
            raw_quantities,
            self.clock.current_month(),
            &self.clock.timestamp(),
        )?;

        let previous = self.customers.clone();
        let replaced = match self.position(&record.name) {
            Some(i) => {
                self.customers[i] = record.clone();
                true
            }
            None => {
                self.customers.push(record.clone());
                false
            }
        };
        self.commit(previous)?;

        log::info!(
            "customer {} {}: count={}",
            record.name,
            if replaced { "replaced" } else { "added" },
            record.coffee_count
        );
        self.events.push(LedgerEvent::CustomerAdded {
            name:         record.name.clone(),
            coffee_count: record.coffee_count,
            replaced,
        });
        Ok(record)
    }

    /// First record, in ledger order, whose name matches `query`
    /// case-insensitively or whose mobile number is exactly `query`.
    pub fn find_customer(&self, query: &str) -> LedgerResult<&CustomerRecord> {
        self.customers
            .iter()
            .find(|c| c.matches(query))
            .ok_or_else(|| LedgerError::not_found(query))
    }

    /// Add `additional_coffee` (possibly negative) to the named customer's
    /// count and stamp the current month. `name` must match a record exactly.
    pub fn add_coffee_to_customer(
        &mut self,
        name: &str,
        additional_coffee: i64,
    ) -> LedgerResult<CoffeeUpdate> {
        let i = self.position(name).ok_or_else(|| LedgerError::not_found(name))?;
        let month = self.clock.current_month();
        let timestamp = self.clock.timestamp();

        let previous = self.customers.clone();
        self.customers[i].add_coffee(additional_coffee, month, &timestamp)?;
        self.commit(previous)?;

        let record = self.customers[i].clone();
        let reward = reward_available(record.coffee_count);
        log::info!(
            "customer {}: {:+} coffee, count={}",
            record.name,
            additional_coffee,
            record.coffee_count
        );
        self.events.push(LedgerEvent::CoffeeAdded {
            name:         record.name.clone(),
            delta:        additional_coffee,
            coffee_count: record.coffee_count,
        });
        if reward {
            log::info!("customer {}: reward available", record.name);
            self.events.push(LedgerEvent::RewardAvailable {
                name:         record.name.clone(),
                coffee_count: record.coffee_count,
            });
        }
        Ok(CoffeeUpdate { record, reward_available: reward })
    }

    /// Every record, in insertion order.
    pub fn list_all_customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    /// Zero the count of every record not stamped with `current_month`
    /// and restamp it. Persists once, and only if something changed.
    /// Returns the number of records reset.
    pub fn run_monthly_rollover(&mut self, current_month: &str) -> LedgerResult<usize> {
        let month: Month = current_month.parse()?;
        self.roll_over(month)
    }

    /// Monthly rollover against the clock's current month.
    pub fn roll_over_to_current_month(&mut self) -> LedgerResult<usize> {
        let month = self.clock.current_month();
        self.roll_over(month)
    }

    fn roll_over(&mut self, month: Month) -> LedgerResult<usize> {
        let previous = self.customers.clone();
        let reset = self
            .customers
            .iter_mut()
            .map(|c| c.roll_over(month))
            .filter(|&changed| changed)
            .count();
        if reset == 0 {
            log::debug!("monthly rollover {month}: nothing to reset");
            return Ok(0);
        }
        self.commit(previous)?;

        log::info!("monthly rollover {month}: reset {reset} customers");
        self.events.push(LedgerEvent::MonthlyRolloverApplied { month, reset });
        Ok(reset)
    }

    /// Totals for the analytics summary. Ties for top customer go to the
    /// earliest record.
    pub fn analytics(&self) -> Analytics {
        let total_coffees = self
            .customers
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.coffee_count));
        let top_customer = self
            .customers
            .iter()
            .fold(None::<&CustomerRecord>, |best, c| match best {
                Some(b) if b.coffee_count >= c.coffee_count => Some(b),
                _ => Some(c),
            })
            .map(|c| c.name.clone());
        Analytics {
            total_coffees,
            top_customer,
            month: self.clock.current_month(),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.customers.clone())
    }

    /// Write the whole ledger to its store.
    pub fn persist(&self) -> LedgerResult<()> {
        self.store.persist(&self.snapshot())
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.customers.iter().position(|c| c.name == name)
    }

    /// Persist; on failure restore `previous` and report the write error.
    fn commit(&mut self, previous: Vec<CustomerRecord>) -> LedgerResult<()> {
        if let Err(e) = self.persist() {
            log::warn!("{e}; in-memory change rolled back");
            self.customers = previous;
            return Err(e);
        }
        Ok(())
    }
}
