//! # Fee Primitives
//!
//! Pure fee calculations over basis-point configs. Fees are always rounded up
//! at the target asset's decimal precision; inputs are assumed non-negative
//! and zero amounts resolve to zero fees rather than errors.

use rust_decimal::Decimal;

use crate::constants::{bps_to_fraction, BPS_DENOMINATOR_DEC};
use crate::math::rounding::{round_down_dp, round_up_dp};

/// Fee charged when minting the collateral asset (e.g. staking base into an
/// LST), rounded up at the paying asset's decimals.
pub fn mint_fee(amount: Decimal, fee_bps: u32, dp: u32) -> Decimal {
    round_up_dp(amount * bps_to_fraction(fee_bps), dp)
}

/// Fee charged when redeeming the collateral asset back into the base asset.
/// Same rounding policy as [`mint_fee`].
pub fn redeem_fee(amount: Decimal, fee_bps: u32, dp: u32) -> Decimal {
    round_up_dp(amount * bps_to_fraction(fee_bps), dp)
}

/// Fee the protocol adds on top of a borrow request.
pub fn borrow_fee(amount: Decimal, fee_bps: u32, dp: u32) -> Decimal {
    round_up_dp(amount * bps_to_fraction(fee_bps), dp)
}

/// Largest borrow request whose amount-plus-fee stays within `limit`.
///
/// The protocol debits `amount * (1 + fee)` for a request of `amount`, so a
/// caller holding a borrow-limit headroom of `limit` must gross the request
/// down by `1 / (1 + fee_bps/10_000)`. Rounded down.
pub fn max_borrow_within(limit: Decimal, fee_bps: u32, dp: u32) -> Decimal {
    let divisor = (BPS_DENOMINATOR_DEC + Decimal::from(fee_bps)) / BPS_DENOMINATOR_DEC;
    round_down_dp(limit / divisor, dp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::rounding::precision_unit;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mint_fee_rounds_up() {
        // 5 bps on 100 = 0.05 exactly
        assert_eq!(mint_fee(dec!(100), 5, 9), dec!(0.05));
        // 3 bps on 1 = 0.0003; at 3 dp this rounds up to 0.001
        assert_eq!(mint_fee(dec!(1), 3, 3), dec!(0.001));
    }

    #[test]
    fn test_zero_amounts() {
        assert_eq!(mint_fee(Decimal::ZERO, 25, 9), Decimal::ZERO);
        assert_eq!(redeem_fee(Decimal::ZERO, 25, 9), Decimal::ZERO);
        assert_eq!(borrow_fee(Decimal::ZERO, 25, 9), Decimal::ZERO);
        assert_eq!(max_borrow_within(Decimal::ZERO, 25, 9), Decimal::ZERO);
    }

    #[test]
    fn test_zero_bps() {
        assert_eq!(mint_fee(dec!(123.456), 0, 9), Decimal::ZERO);
        assert_eq!(max_borrow_within(dec!(123.456), 0, 9), dec!(123.456));
    }

    #[test]
    fn test_gross_up_stays_within_limit() {
        let limit = dec!(100);
        let request = max_borrow_within(limit, 30, 9);
        let debited = request + borrow_fee(request, 30, 9);
        assert!(debited <= limit + precision_unit(9));
        assert!(request < limit);
    }

    #[test]
    fn test_split_fee_discrepancy_bounded() {
        // Splitting an amount can only cost extra rounding, and each call
        // rounds by at most one precision unit.
        let (a, b) = (dec!(7.000000003), dec!(2.999999999));
        let split = mint_fee(a, 25, 9) + mint_fee(b, 25, 9);
        let whole = mint_fee(a + b, 25, 9);
        assert!(split >= whole);
        assert!(split - whole <= precision_unit(9) * dec!(2));
    }
}
