//! The reward rule: every eighth paid coffee earns one free coffee.
//!
//! Free coffees are added to the running count rather than redeemed,
//! so a count already includes every reward granted.

use crate::{
    error::{LedgerError, LedgerResult},
    types::{CoffeeCount, MobileNumber, REWARD_INTERVAL},
};

/// `sum + sum / 8` over the paid quantities. A total that does not fit a
/// `CoffeeCount` is a validation error.
pub fn reward_adjusted_total(raw_quantities: &[u64]) -> LedgerResult<CoffeeCount> {
    let too_large = || LedgerError::validation("coffee quantities", "total too large");
    let total = raw_quantities
        .iter()
        .try_fold(0u64, |acc, &q| acc.checked_add(q))
        .ok_or_else(too_large)?;
    total.checked_add(total / REWARD_INTERVAL).ok_or_else(too_large)
}

/// True once a count is high enough for the customer to be told
/// about a free coffee.
pub fn reward_available(count: CoffeeCount) -> bool {
    count >= REWARD_INTERVAL
}

/// Parse a comma-separated list of coffee quantities, e.g. `"2, 3,1"`.
pub fn parse_quantities(text: &str) -> LedgerResult<Vec<u64>> {
    if text.trim().is_empty() {
        return Err(LedgerError::validation("coffee quantities", "must not be empty"));
    }
    text.split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<u64>().map_err(|_| {
                LedgerError::validation(
                    "coffee quantities",
                    format!("{token:?} is not a non-negative whole number"),
                )
            })
        })
        .collect()
}

/// Parse a mobile number. The parsed value must have exactly ten digits,
/// so a leading zero does not count toward the length.
pub fn parse_mobile_number(text: &str) -> LedgerResult<MobileNumber> {
    let text = text.trim();
    let number: MobileNumber = text.parse().map_err(|_| {
        LedgerError::validation("mobile number", format!("{text:?} is not a number"))
    })?;
    validate_mobile_number(number)?;
    Ok(number)
}

pub fn validate_mobile_number(number: MobileNumber) -> LedgerResult<()> {
    if (1_000_000_000..=9_999_999_999).contains(&number) {
        Ok(())
    } else {
        Err(LedgerError::validation("mobile number", "must be 10 digits"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_free_coffee_per_eight_paid() {
        assert_eq!(reward_adjusted_total(&[]).unwrap(), 0);
        assert_eq!(reward_adjusted_total(&[7]).unwrap(), 7);
        assert_eq!(reward_adjusted_total(&[8]).unwrap(), 9);
        assert_eq!(reward_adjusted_total(&[16]).unwrap(), 18);
        assert_eq!(reward_adjusted_total(&[2, 3, 1]).unwrap(), 6);
        assert_eq!(reward_adjusted_total(&[4, 4, 4]).unwrap(), 13);
    }

    #[test]
    fn overflowing_totals_are_validation_errors() {
        for q in [&[u64::MAX, 1][..], &[u64::MAX / 2, u64::MAX / 2], &[u64::MAX]] {
            let err = reward_adjusted_total(q).unwrap_err();
            assert!(matches!(err, LedgerError::Validation { .. }), "{q:?} gave {err}");
        }
    }

    #[test]
    fn reward_threshold_is_inclusive() {
        assert!(!reward_available(7));
        assert!(reward_available(8));
        assert!(reward_available(40));
    }

    #[test]
    fn quantities_tolerate_whitespace() {
        assert_eq!(parse_quantities("2, 3 ,1").unwrap(), vec![2, 3, 1]);
        assert_eq!(parse_quantities("5").unwrap(), vec![5]);
    }

    #[test]
    fn bad_quantities_are_validation_errors() {
        for bad in ["", "   ", "2,,3", "two", "1.5", "-1", "3,"] {
            let err = parse_quantities(bad).unwrap_err();
            assert!(matches!(err, LedgerError::Validation { .. }), "{bad:?} gave {err}");
        }
    }

    #[test]
    fn mobile_number_needs_ten_digits() {
        assert_eq!(parse_mobile_number(" 9876543210 ").unwrap(), 9_876_543_210);
        assert!(parse_mobile_number("123456789").is_err());
        assert!(parse_mobile_number("12345678901").is_err());
        assert!(parse_mobile_number("0123456789").is_err());
        assert!(parse_mobile_number("98765-43210").is_err());
        assert!(parse_mobile_number("").is_err());
    }
}
