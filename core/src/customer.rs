use crate::{
    clock::Month,
    error::{LedgerError, LedgerResult},
    reward::{reward_adjusted_total, validate_mobile_number},
    types::{CoffeeCount, CustomerName, MobileNumber},
};
use serde::{Deserialize, Serialize};

/// One recorded purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseEntry {
    pub quantity:  i64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    pub name:               CustomerName,
    pub mobile_number:      MobileNumber,
    pub coffee_count:       CoffeeCount,
    /// `None` only for records loaded from a store that never stamped them.
    pub last_updated_month: Option<Month>,
    pub purchase_history:   Vec<PurchaseEntry>,
}

impl CustomerRecord {
    /// Build a fresh record from paid quantities. History gets one entry
    /// per quantity, all stamped with `timestamp`. Surrounding whitespace
    /// is stripped from `name`.
    pub fn new(
        name: &str,
        mobile_number: MobileNumber,
        raw_quantities: &[u64],
        month: Month,
        timestamp: &str,
    ) -> LedgerResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("name", "must not be empty"));
        }
        validate_mobile_number(mobile_number)?;
        if raw_quantities.is_empty() {
            return Err(LedgerError::validation("coffee quantities", "must not be empty"));
        }

        let coffee_count = reward_adjusted_total(raw_quantities)?;
        let purchase_history = raw_quantities
            .iter()
            .map(|&q| {
                let quantity = i64::try_from(q).map_err(|_| {
                    LedgerError::validation("coffee quantities", format!("{q} is too large"))
                })?;
                Ok(PurchaseEntry { quantity, timestamp: timestamp.to_string() })
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            mobile_number,
            coffee_count,
            last_updated_month: Some(month),
            purchase_history,
        })
    }

    /// Name matches case-insensitively; mobile matches its decimal form exactly.
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase() == query.to_lowercase()
            || self.mobile_number.to_string() == query
    }

    /// Apply a signed change to the count and stamp `month`. Fails without
    /// touching the record if the count would drop below zero or overflow.
    pub fn add_coffee(&mut self, additional: i64, month: Month, timestamp: &str) -> LedgerResult<()> {
        let updated = self.coffee_count.checked_add_signed(additional).ok_or_else(|| {
            LedgerError::validation(
                "additional coffee",
                format!("{additional} would take {}'s count of {} out of range", self.name, self.coffee_count),
            )
        })?;
        self.coffee_count = updated;
        self.last_updated_month = Some(month);
        self.purchase_history.push(PurchaseEntry {
            quantity:  additional,
            timestamp: timestamp.to_string(),
        });
        Ok(())
    }

    /// Zero the count if it was last touched in a different month.
    /// Returns whether the record changed.
    pub fn roll_over(&mut self, current: Month) -> bool {
        if self.last_updated_month == Some(current) {
            return false;
        }
        self.coffee_count = 0;
        self.last_updated_month = Some(current);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    fn sample() -> CustomerRecord {
        CustomerRecord::new("Ada", 9_876_543_210, &[4, 4, 4], march(), "2025-03-01 09:00:00").unwrap()
    }

    #[test]
    fn new_record_applies_reward_formula_and_logs_each_quantity() {
        let c = sample();
        assert_eq!(c.coffee_count, 13);
        assert_eq!(c.last_updated_month, Some(march()));
        assert_eq!(c.purchase_history.len(), 3);
        assert!(c.purchase_history.iter().all(|p| p.quantity == 4));
    }

    #[test]
    fn new_record_rejects_bad_input() {
        let ts = "2025-03-01 09:00:00";
        assert!(CustomerRecord::new("  ", 9_876_543_210, &[1], march(), ts).is_err());
        assert!(CustomerRecord::new("Ada", 123, &[1], march(), ts).is_err());
        assert!(CustomerRecord::new("Ada", 9_876_543_210, &[], march(), ts).is_err());
    }

    #[test]
    fn matching_is_case_insensitive_on_name_and_exact_on_mobile() {
        let c = sample();
        assert!(c.matches("ada"));
        assert!(c.matches("ADA"));
        assert!(c.matches("9876543210"));
        assert!(!c.matches("987654321"));
        assert!(!c.matches("Ad"));
    }

    #[test]
    fn negative_adjustment_cannot_go_below_zero() {
        let mut c = sample();
        c.add_coffee(-3, march(), "t").unwrap();
        assert_eq!(c.coffee_count, 10);
        let err = c.add_coffee(-11, march(), "t").unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
        assert_eq!(c.coffee_count, 10);
        assert_eq!(c.purchase_history.len(), 4);
    }

    #[test]
    fn names_are_trimmed() {
        let c = CustomerRecord::new("  Ada \t", 9_876_543_210, &[1], march(), "t").unwrap();
        assert_eq!(c.name, "Ada");
    }

    #[test]
    fn quantities_beyond_history_range_are_rejected() {
        let largest = i64::MAX as u64;
        let c = CustomerRecord::new("Ada", 9_876_543_210, &[largest], march(), "t").unwrap();
        assert_eq!(c.purchase_history[0].quantity, i64::MAX);
        assert_eq!(c.coffee_count, largest + largest / 8);

        let err = CustomerRecord::new("Ada", 9_876_543_210, &[largest + 1], march(), "t").unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
    }

    #[test]
    fn adding_coffee_restamps_the_month() {
        let mut c = sample();
        let april = Month::new(2025, 4).unwrap();
        c.add_coffee(2, april, "t").unwrap();
        assert_eq!(c.last_updated_month, Some(april));
        assert!(!c.roll_over(april));
        assert_eq!(c.coffee_count, 15);
    }

    #[test]
    fn roll_over_only_touches_stale_records() {
        let mut c = sample();
        assert!(!c.roll_over(march()));
        assert_eq!(c.coffee_count, 13);
        let april = Month::new(2025, 4).unwrap();
        assert!(c.roll_over(april));
        assert_eq!(c.coffee_count, 0);
        assert_eq!(c.last_updated_month, Some(april));
    }
}
