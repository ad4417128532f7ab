//! # Decimal Rounding
//!
//! Rounding helpers that pin every protocol-facing amount to an asset's mint
//! decimals. The direction matters: fees round up (in the protocol's favor),
//! amounts the client proposes to the protocol round down (never suggest a
//! value the chain would reject as over-limit).

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a non-negative amount down to `dp` decimal places
pub fn round_down_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Round a non-negative amount up to `dp` decimal places
pub fn round_up_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::AwayFromZero)
}

/// One unit of precision at `dp` decimal places (e.g. `dp = 9` -> 1e-9)
pub fn precision_unit(dp: u32) -> Decimal {
    Decimal::new(1, dp)
}
