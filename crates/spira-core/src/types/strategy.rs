//! # Looping Strategies
//!
//! The fixed set of paired-asset looping strategies and their configuration:
//! which reserves a strategy deposits into and borrows from, the exposure
//! band it accepts, and the health anchor used by the metrics aggregator.
//!
//! The health anchor (`target_utilization_at_default_pct`) is the borrow-limit
//! utilization a position sits at when opened at the default target exposure.
//! It is configuration, precomputed per strategy, not derived from the other
//! fields at runtime.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::{HUNDRED_PCT, ONE};
use crate::errors::{SimError, SimResult};

/// The fixed set of supported looping strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    /// Deposit an LST, borrow the base asset, loop
    LstLoop,
    /// Deposit a stablecoin alongside the LST, borrow the base asset, loop
    StableLstLoop,
}

impl StrategyType {
    /// All strategies, in display order
    pub const ALL: [StrategyType; 2] = [StrategyType::LstLoop, StrategyType::StableLstLoop];

    /// Built-in configuration for this strategy
    pub fn config(&self) -> StrategyConfig {
        match self {
            StrategyType::LstLoop => StrategyConfig {
                strategy: *self,
                deposit_coin_types: vec!["0xlst::ssui::SSUI".into()],
                borrow_coin_type: "0x2::sui::SUI".into(),
                default_target_exposure: dec!(3),
                min_target_exposure: dec!(1),
                max_target_exposure: dec!(4.5),
                target_utilization_at_default_pct: dec!(62.5),
            },
            StrategyType::StableLstLoop => StrategyConfig {
                strategy: *self,
                deposit_coin_types: vec![
                    "0xstable::usdc::USDC".into(),
                    "0xlst::ssui::SSUI".into(),
                ],
                borrow_coin_type: "0x2::sui::SUI".into(),
                default_target_exposure: dec!(2),
                min_target_exposure: dec!(1),
                max_target_exposure: dec!(3),
                target_utilization_at_default_pct: dec!(50),
            },
        }
    }
}

/// Configuration of one looping strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub strategy: StrategyType,
    /// Reserves the strategy deposits into (first entry is the loop collateral)
    pub deposit_coin_types: Vec<String>,
    /// Reserve the strategy borrows from
    pub borrow_coin_type: String,
    pub default_target_exposure: Decimal,
    pub min_target_exposure: Decimal,
    pub max_target_exposure: Decimal,
    /// Borrow-limit utilization% at the default target exposure; anchors the
    /// health percentage approximation
    pub target_utilization_at_default_pct: Decimal,
}

impl StrategyConfig {
    /// Loop collateral coin type (the first deposit reserve)
    pub fn collateral_coin_type(&self) -> &str {
        &self.deposit_coin_types[0]
    }

    /// Validate the exposure band and health anchor
    pub fn validate(&self) -> SimResult<()> {
        if self.deposit_coin_types.is_empty() {
            return Err(SimError::inconsistent("strategy has no deposit reserves"));
        }
        if self.min_target_exposure < ONE
            || self.default_target_exposure < self.min_target_exposure
            || self.max_target_exposure < self.default_target_exposure
        {
            return Err(SimError::TargetExposureOutOfRange {
                target: self.default_target_exposure,
                min: self.min_target_exposure,
                max: self.max_target_exposure,
            });
        }
        if self.target_utilization_at_default_pct >= HUNDRED_PCT {
            return Err(SimError::inconsistent(
                "health anchor utilization must be below 100%",
            ));
        }
        Ok(())
    }

    /// Clamp a requested target exposure to the strategy's band
    pub fn clamp_target(&self, target: Decimal) -> Decimal {
        target
            .max(self.min_target_exposure)
            .min(self.max_target_exposure)
    }
}
