//! # Exposure Calculator
//!
//! Leverage ratio of a looped position: `deposited / (deposited - borrowed)`,
//! with both amounts denominated in the same unit. The ratio is undefined
//! once borrows reach deposits; that state is modeled explicitly so callers
//! can stop iterating instead of propagating a negative ratio.

use rust_decimal::Decimal;

use crate::constants::{pct_to_fraction, ONE};
use crate::errors::{SimError, SimResult};

/// Exposure of a position, derived from a deposit/borrow snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exposure {
    /// Nothing deposited; defined as zero exposure
    Flat,
    /// Leveraged ratio, `>= 1` for any position with non-negative borrows
    Leveraged(Decimal),
    /// Borrows meet or exceed deposits; the ratio is undefined and the
    /// position must not be iterated further
    Insolvent,
}

impl Exposure {
    /// Compute exposure from deposited and borrowed amounts (same unit)
    pub fn compute(deposited: Decimal, borrowed: Decimal) -> Self {
        if deposited <= Decimal::ZERO {
            return Self::Flat;
        }
        if borrowed >= deposited {
            return Self::Insolvent;
        }
        Self::Leveraged(deposited / (deposited - borrowed))
    }

    /// The ratio as a plain decimal, `None` when insolvent
    pub fn ratio(&self) -> Option<Decimal> {
        match self {
            Self::Flat => Some(Decimal::ZERO),
            Self::Leveraged(r) => Some(*r),
            Self::Insolvent => None,
        }
    }

    /// The ratio, or an error carrying the offending amounts
    pub fn ratio_or_err(&self, deposited: Decimal, borrowed: Decimal) -> SimResult<Decimal> {
        self.ratio().ok_or(SimError::InsolventPosition {
            deposited,
            borrowed,
        })
    }
}

/// Theoretical maximum exposure for a reserve's open LTV:
/// `1 / (1 - openLtv/100)`. Targets at or above this can never converge and
/// must be rejected before entering the loop.
pub fn max_exposure(open_ltv_pct: Decimal) -> SimResult<Decimal> {
    let ltv = pct_to_fraction(open_ltv_pct);
    if ltv >= ONE {
        return Err(SimError::InvalidLtv(open_ltv_pct));
    }
    Ok(ONE / (ONE - ltv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_when_nothing_deposited() {
        assert_eq!(Exposure::compute(Decimal::ZERO, Decimal::ZERO), Exposure::Flat);
        assert_eq!(Exposure::compute(Decimal::ZERO, dec!(5)), Exposure::Flat);
    }

    #[test]
    fn test_unleveraged_is_one() {
        assert_eq!(
            Exposure::compute(dec!(100), Decimal::ZERO),
            Exposure::Leveraged(dec!(1))
        );
    }

    #[test]
    fn test_ratio_values() {
        // 100 deposited against 50 borrowed = 2x
        assert_eq!(
            Exposure::compute(dec!(100), dec!(50)).ratio(),
            Some(dec!(2))
        );
        // 300 against 200 = 3x
        assert_eq!(
            Exposure::compute(dec!(300), dec!(200)).ratio(),
            Some(dec!(3))
        );
    }

    #[test]
    fn test_insolvent_when_borrowed_meets_deposited() {
        assert_eq!(Exposure::compute(dec!(100), dec!(100)), Exposure::Insolvent);
        assert_eq!(Exposure::compute(dec!(100), dec!(150)), Exposure::Insolvent);
        assert_eq!(Exposure::compute(dec!(100), dec!(150)).ratio(), None);
    }

    #[test]
    fn test_monotone_in_borrowed() {
        let dep = dec!(1000);
        let mut prev = Decimal::ZERO;
        for bor in [dec!(0), dec!(100), dec!(500), dec!(900), dec!(999)] {
            let r = Exposure::compute(dep, bor).ratio().unwrap();
            assert!(r >= dec!(1));
            assert!(r >= prev);
            prev = r;
        }
    }

    #[test]
    fn test_max_exposure() {
        assert_eq!(max_exposure(dec!(80)).unwrap(), dec!(5));
        assert_eq!(max_exposure(dec!(50)).unwrap(), dec!(2));
        assert!(max_exposure(dec!(100)).is_err());
    }
}
