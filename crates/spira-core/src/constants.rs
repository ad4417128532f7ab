//! # Protocol Constants
//!
//! Fundamental constants for the leverage simulator including:
//! - Basis-point scale factors
//! - Convergence loop bounds and tolerances
//! - Snapshot validation thresholds

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ============================================================================
// Basis Points
// ============================================================================

/// Basis points denominator (10,000 = 100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Maximum fee in basis points accepted by fee config validation (100%)
pub const MAX_FEE_BPS: u32 = 10_000;

/// Decimal form of the basis points denominator
pub const BPS_DENOMINATOR_DEC: Decimal = dec!(10000);

// ============================================================================
// Convergence Loop
// ============================================================================

/// Hard cap on borrow/redeposit (and withdraw/repay) loop iterations
pub const MAX_LOOP_ITERATIONS: usize = 20;

/// Relative tolerance for exposure convergence (1e-4)
pub const EXPOSURE_REL_TOLERANCE: Decimal = dec!(0.0001);

// ============================================================================
// Percentages
// ============================================================================

/// 100% as a decimal percentage value
pub const HUNDRED_PCT: Decimal = dec!(100);

/// One, as a decimal (the exposure of an unleveraged position)
pub const ONE: Decimal = dec!(1);

// ============================================================================
// Snapshot Validation Thresholds
// ============================================================================

/// Maximum absolute drift tolerated between an obligation's derived USD
/// aggregates and the sum over its entries (one cent)
pub const AGGREGATE_USD_TOLERANCE: Decimal = dec!(0.01);

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert basis points to a decimal fraction
pub fn bps_to_fraction(bps: u32) -> Decimal {
    Decimal::from(bps) / BPS_DENOMINATOR_DEC
}

/// Convert a decimal percentage (e.g. 80) to a fraction (0.8)
pub fn pct_to_fraction(pct: Decimal) -> Decimal {
    pct / HUNDRED_PCT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_validity() {
        assert_eq!(BPS_DENOMINATOR, 10_000);
        assert!(EXPOSURE_REL_TOLERANCE > Decimal::ZERO);
        assert!(EXPOSURE_REL_TOLERANCE < ONE);
        assert_eq!(MAX_LOOP_ITERATIONS, 20);
    }

    #[test]
    fn test_helper_functions() {
        assert_eq!(bps_to_fraction(5_000), dec!(0.5));
        assert_eq!(bps_to_fraction(5), dec!(0.0005));
        assert_eq!(pct_to_fraction(dec!(80)), dec!(0.8));
    }
}
