//! Quantity policy for cart lines

use thiserror::Error;

/// Maximum quantity of a single product allowed per cart line,
/// independent of stock.
pub const GLOBAL_LINE_CAP: u32 = 10;

/// Why a requested quantity was rejected. Checks run in a fixed order;
/// the first violated bound wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityViolation {
    #[error("quantity must be at least 1")]
    BelowMinimum,

    #[error("limited to {0} per order")]
    ExceedsGlobalCap(u32),

    #[error("only {0} left in stock")]
    ExceedsStock(u32),
}

/// Validate a requested quantity against stock and the per-line cap.
///
/// `requested` is taken as a signed value so out-of-range input from the
/// UI (0 or negative) classifies as [`QuantityViolation::BelowMinimum`]
/// instead of wrapping.
pub fn validate_quantity(
    requested: i64,
    max_stock: u32,
    global_cap: u32,
) -> Result<u32, QuantityViolation> {
    if requested < 1 {
        return Err(QuantityViolation::BelowMinimum);
    }
    let requested = requested as u64;
    if requested > u64::from(global_cap) {
        return Err(QuantityViolation::ExceedsGlobalCap(global_cap));
    }
    if requested > u64::from(max_stock) {
        return Err(QuantityViolation::ExceedsStock(max_stock));
    }
    Ok(requested as u32)
}

/// The ceiling the UI should offer for a line: `min(stock, cap)`.
pub fn effective_max(max_stock: u32, global_cap: u32) -> u32 {
    max_stock.min(global_cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_in_range_quantities() {
        assert_eq!(validate_quantity(1, 5, GLOBAL_LINE_CAP), Ok(1));
        assert_eq!(validate_quantity(5, 5, GLOBAL_LINE_CAP), Ok(5));
        assert_eq!(validate_quantity(10, 20, GLOBAL_LINE_CAP), Ok(10));
    }

    #[test]
    fn rejects_below_minimum() {
        assert_eq!(validate_quantity(0, 5, 10), Err(QuantityViolation::BelowMinimum));
        assert_eq!(validate_quantity(-3, 5, 10), Err(QuantityViolation::BelowMinimum));
    }

    #[test]
    fn global_cap_checked_before_stock() {
        // Both bounds violated: the cap violation wins.
        assert_eq!(validate_quantity(50, 3, 10), Err(QuantityViolation::ExceedsGlobalCap(10)));
    }

    #[test]
    fn rejects_over_stock() {
        // maxStock=3, cap=10, request 5.
        assert_eq!(validate_quantity(5, 3, 10), Err(QuantityViolation::ExceedsStock(3)));
        assert_eq!(effective_max(3, 10), 3);
    }

    #[test]
    fn effective_max_is_min_of_stock_and_cap() {
        assert_eq!(effective_max(25, GLOBAL_LINE_CAP), 10);
        assert_eq!(effective_max(2, GLOBAL_LINE_CAP), 2);
        assert_eq!(effective_max(0, GLOBAL_LINE_CAP), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // BelowMinimum iff q < 1, else ExceedsGlobalCap iff q > cap,
        // else ExceedsStock iff q > stock, else Ok.
        #[test]
        fn prop_violation_order_is_first_match() {
            proptest!(|(q in -20i64..40, stock in 0u32..30, cap in 1u32..15)| {
                let got = validate_quantity(q, stock, cap);
                let expect = if q < 1 {
                    Err(QuantityViolation::BelowMinimum)
                } else if q > i64::from(cap) {
                    Err(QuantityViolation::ExceedsGlobalCap(cap))
                } else if q > i64::from(stock) {
                    Err(QuantityViolation::ExceedsStock(stock))
                } else {
                    Ok(q as u32)
                };
                prop_assert_eq!(got, expect);
            });
        }

        #[test]
        fn prop_accepted_quantity_is_within_effective_max() {
            proptest!(|(q in 1i64..40, stock in 0u32..30, cap in 1u32..15)| {
                if let Ok(qty) = validate_quantity(q, stock, cap) {
                    prop_assert!(qty <= effective_max(stock, cap));
                    prop_assert!(qty >= 1);
                }
            });
        }
    }
}
