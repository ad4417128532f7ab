//! # Market Data Provider
//!
//! Explicit dependency-injection seam for the aggregator: callers hand the
//! engine a provider of already-parsed, already-price-refreshed snapshots
//! instead of reading ambient shared state. The simulation core never fetches
//! or parses raw chain data itself.

use spira_core::errors::{SimError, SimResult};
use spira_core::types::{ObligationSnapshot, ReserveSnapshot};

/// Source of reserve and obligation snapshots for one simulation call
pub trait MarketDataProvider {
    /// Reserve snapshot for a coin type, if the market carries it
    fn reserve(&self, coin_type: &str) -> Option<&ReserveSnapshot>;

    /// The user's obligation, `None` when no position exists yet
    fn obligation(&self) -> Option<&ObligationSnapshot>;

    /// Collateral units minted per unit of the base asset
    fn mint_rate(&self) -> rust_decimal::Decimal;

    /// Base units returned per unit of collateral on redemption
    fn redeem_rate(&self) -> rust_decimal::Decimal;

    /// Reserve snapshot for a coin type, as an error when absent
    fn reserve_or_err(&self, coin_type: &str) -> SimResult<&ReserveSnapshot> {
        self.reserve(coin_type)
            .ok_or_else(|| SimError::unknown_reserve(coin_type))
    }
}

/// In-memory provider over owned snapshots; the test and example harness
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    pub reserves: Vec<ReserveSnapshot>,
    pub obligation: Option<ObligationSnapshot>,
    pub mint_rate: rust_decimal::Decimal,
    pub redeem_rate: rust_decimal::Decimal,
}

impl MarketDataProvider for InMemoryProvider {
    fn reserve(&self, coin_type: &str) -> Option<&ReserveSnapshot> {
        self.reserves.iter().find(|r| r.coin_type == coin_type)
    }

    fn obligation(&self) -> Option<&ObligationSnapshot> {
        self.obligation.as_ref()
    }

    fn mint_rate(&self) -> rust_decimal::Decimal {
        self.mint_rate
    }

    fn redeem_rate(&self) -> rust_decimal::Decimal {
        self.redeem_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{lst_reserve, sui_reserve};
    use rust_decimal_macros::dec;

    #[test]
    fn test_lookup_and_error() {
        let provider = InMemoryProvider {
            reserves: vec![lst_reserve(), sui_reserve()],
            obligation: None,
            mint_rate: dec!(1),
            redeem_rate: dec!(1),
        };
        assert!(provider.reserve("0x2::sui::SUI").is_some());
        assert!(provider.reserve("0xmissing::x::X").is_none());
        assert!(matches!(
            provider.reserve_or_err("0xmissing::x::X"),
            Err(SimError::UnknownReserve(_))
        ));
    }
}
