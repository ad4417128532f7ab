//! # Step-Max Bound Calculator
//!
//! Per-iteration safety bounds for the looping engine. For a single atomic
//! step (one more borrow-and-redeposit, or one withdraw-and-repay) these
//! compute the maximum amount that stays inside the collateral reserve's open
//! LTV constraint.
//!
//! Valuation is deliberately conservative: collateral is valued at its lower
//! price bound and debt at its upper bound, never at the point price. Oracle
//! noise therefore under-leverages the proposal instead of over-leveraging
//! it. Do not collapse the two bounds into a single price.

use rust_decimal::Decimal;

use spira_core::constants::pct_to_fraction;
use spira_core::errors::{SimError, SimResult};
use spira_core::math::{mint_fee, redeem_fee, round_down_dp};
use spira_core::types::ReserveSnapshot;

/// One collateral/debt reserve pair plus the mint/redeem exchange rates
/// between the two assets
#[derive(Debug, Clone, Copy)]
pub struct LoopMarket<'a> {
    /// Reserve the strategy deposits into (the LST side)
    pub collateral: &'a ReserveSnapshot,
    /// Reserve the strategy borrows from (the base side)
    pub debt: &'a ReserveSnapshot,
    /// Collateral units minted per unit of the base asset
    pub mint_rate: Decimal,
    /// Base units returned per unit of collateral on redemption
    pub redeem_rate: Decimal,
}

impl<'a> LoopMarket<'a> {
    pub fn new(
        collateral: &'a ReserveSnapshot,
        debt: &'a ReserveSnapshot,
        mint_rate: Decimal,
        redeem_rate: Decimal,
    ) -> SimResult<Self> {
        collateral.validate()?;
        debt.validate()?;
        if mint_rate <= Decimal::ZERO || redeem_rate <= Decimal::ZERO {
            return Err(SimError::DivisionByZero);
        }
        Ok(Self {
            collateral,
            debt,
            mint_rate,
            redeem_rate,
        })
    }

    /// Conservative price ratio: collateral at its lower bound over debt at
    /// its upper bound
    fn conservative_price_ratio(&self) -> Decimal {
        self.collateral.min_price / self.debt.max_price
    }

    /// Maximum additional borrow (in debt units) for one loop step:
    /// `deposited * openLtv/100 * minPrice/maxPrice - borrowed`, rounded down
    /// at the debt asset's decimals and floored at zero.
    pub fn step_max_borrow(&self, deposited: Decimal, borrowed: Decimal) -> Decimal {
        let ltv = pct_to_fraction(self.collateral.open_ltv_pct);
        let headroom = deposited * ltv * self.conservative_price_ratio() - borrowed;
        round_down_dp(headroom.max(Decimal::ZERO), self.debt.decimals)
    }

    /// Collateral minted and redeposited from a borrow of `step_borrow`:
    /// the borrow net of the mint fee, converted at the mint rate. Rounded
    /// down at the collateral asset's decimals.
    pub fn step_max_deposit(&self, step_borrow: Decimal) -> Decimal {
        let fee = mint_fee(
            step_borrow,
            self.collateral.fees.mint_bps,
            self.debt.decimals,
        );
        round_down_dp(
            (step_borrow - fee) * self.mint_rate,
            self.collateral.decimals,
        )
    }

    /// Maximum collateral withdrawal (in collateral units) that keeps the
    /// remaining position inside the open LTV constraint, capped by the
    /// deposited amount. Rounded down at the collateral asset's decimals.
    pub fn step_max_withdraw(&self, deposited: Decimal, borrowed: Decimal) -> Decimal {
        let ltv = pct_to_fraction(self.collateral.open_ltv_pct);
        let min_price = self.collateral.min_price;
        let max_price = self.debt.max_price;

        if ltv <= Decimal::ZERO {
            // Nothing is borrowable against the collateral, so it is all free
            // unless debt is already outstanding.
            return if borrowed > Decimal::ZERO {
                Decimal::ZERO
            } else {
                round_down_dp(deposited, self.collateral.decimals)
            };
        }

        let free = (deposited * min_price * ltv - borrowed * max_price * self.debt.borrow_weight)
            / min_price
            / ltv;
        round_down_dp(
            free.max(Decimal::ZERO).min(deposited),
            self.collateral.decimals,
        )
    }

    /// Debt repayable from a withdrawal of `step_withdraw`: the withdrawal
    /// net of the redeem fee, converted at the redeem rate, capped by the
    /// outstanding debt. Rounded down at the debt asset's decimals.
    pub fn step_max_repay(&self, step_withdraw: Decimal, borrowed: Decimal) -> Decimal {
        let fee = redeem_fee(
            step_withdraw,
            self.collateral.fees.redeem_bps,
            self.collateral.decimals,
        );
        let redeemed = (step_withdraw - fee) * self.redeem_rate;
        round_down_dp(redeemed.max(Decimal::ZERO).min(borrowed), self.debt.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{lst_reserve, sui_reserve};
    use rust_decimal_macros::dec;

    fn fixtures() -> (ReserveSnapshot, ReserveSnapshot) {
        (lst_reserve(), sui_reserve())
    }

    #[test]
    fn test_step_max_borrow_headroom() {
        let (coll, debt) = fixtures();
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        // 100 * 0.8 * 0.98 - 0 = 78.4
        assert_eq!(market.step_max_borrow(dec!(100), dec!(0)), dec!(78.4));
        // Existing debt reduces the headroom one-for-one
        assert_eq!(market.step_max_borrow(dec!(100), dec!(50)), dec!(28.4));
    }

    #[test]
    fn test_step_max_borrow_floors_at_zero() {
        let (coll, debt) = fixtures();
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        assert_eq!(market.step_max_borrow(dec!(100), dec!(90)), dec!(0));
    }

    #[test]
    fn test_step_max_deposit_nets_mint_fee() {
        let (mut coll, debt) = fixtures();
        coll.fees.mint_bps = 100; // 1%
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        assert_eq!(market.step_max_deposit(dec!(50)), dec!(49.5));
    }

    #[test]
    fn test_step_max_withdraw_all_free_when_no_debt() {
        let (coll, debt) = fixtures();
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        assert_eq!(market.step_max_withdraw(dec!(100), dec!(0)), dec!(100));
    }

    #[test]
    fn test_step_max_withdraw_respects_ltv() {
        let (coll, debt) = fixtures();
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        // free = (300*0.98*0.8 - 200*1*1) / 0.98 / 0.8
        let w = market.step_max_withdraw(dec!(300), dec!(200));
        assert!(w > dec!(44) && w < dec!(45));
        // Withdrawing w must leave the position within the open LTV
        let remaining = dec!(300) - w;
        assert!(remaining * dec!(0.98) * dec!(0.8) >= dec!(200));
    }

    #[test]
    fn test_step_max_repay_caps_at_debt() {
        let (coll, debt) = fixtures();
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        assert_eq!(market.step_max_repay(dec!(100), dec!(10)), dec!(10));
    }

    #[test]
    fn test_step_max_repay_nets_redeem_fee() {
        let (mut coll, debt) = fixtures();
        coll.fees.redeem_bps = 100; // 1%
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        assert_eq!(market.step_max_repay(dec!(100), dec!(500)), dec!(99));
    }

    #[test]
    fn test_rejects_nonpositive_rates() {
        let (coll, debt) = fixtures();
        assert!(LoopMarket::new(&coll, &debt, dec!(0), dec!(1)).is_err());
    }
}
