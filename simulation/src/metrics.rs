//! # Position Metrics Aggregator
//!
//! Display- and decision-grade numbers for one strategy position: TVL in the
//! strategy's base unit, the net APR of the looped position, and the health
//! percentage approximation anchored to the strategy's configured utilization
//! at its default exposure.

use rust_decimal::Decimal;
use serde::Serialize;

use spira_core::constants::{HUNDRED_PCT, ONE};
use spira_core::errors::{SimError, SimResult};
use spira_core::types::{ReserveSnapshot, StrategyConfig};

use crate::convergence::plan_open;
use crate::provider::MarketDataProvider;
use crate::step_bounds::LoopMarket;

/// Net equity of a looped position in the strategy's base unit:
/// `deposited * redeem_rate - borrowed`.
pub fn tvl(deposited: Decimal, borrowed: Decimal, redeem_rate: Decimal) -> Decimal {
    deposited * redeem_rate - borrowed
}

/// APR composition of a leveraged position, all in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AprBreakdown {
    /// Supply-side interest earned on the collateral reserve
    pub supply_apr_pct: Decimal,
    /// Liquidity-mining rewards on the collateral reserve (deduplicated)
    pub reward_apr_pct: Decimal,
    /// Staking yield of the collateral asset, zero for non-LSTs
    pub staking_apr_pct: Decimal,
    /// Interest paid on the borrow reserve
    pub borrow_apr_pct: Decimal,
    /// Net APR over the position's equity
    pub net_apr_pct: Decimal,
}

/// Net APR of a position holding `deposited` collateral against `borrowed`
/// debt. Earnings accrue on the full deposit value, costs on the full borrow
/// value; both are weighted over the position's equity.
pub fn position_apr(
    collateral: &ReserveSnapshot,
    debt: &ReserveSnapshot,
    deposited: Decimal,
    borrowed: Decimal,
    redeem_rate: Decimal,
) -> SimResult<AprBreakdown> {
    let deposit_value = deposited * redeem_rate;
    let equity = deposit_value - borrowed;
    if equity <= Decimal::ZERO {
        return Err(SimError::InsolventPosition {
            deposited: deposit_value,
            borrowed,
        });
    }

    let supply_apr_pct = collateral.supply_apr_pct();
    let reward_apr_pct = collateral.reward_apr_pct();
    let staking_apr_pct = collateral.staking_yield_apr_pct.unwrap_or(Decimal::ZERO);
    let borrow_apr_pct = debt.borrow_apr_pct();

    let earn = (supply_apr_pct + reward_apr_pct + staking_apr_pct) * deposit_value;
    let cost = borrow_apr_pct * borrowed;
    let net_apr_pct = (earn - cost) / equity;

    Ok(AprBreakdown {
        supply_apr_pct,
        reward_apr_pct,
        staking_apr_pct,
        borrow_apr_pct,
        net_apr_pct,
    })
}

/// Health percentage of an obligation, clamped to `[0, 100]`.
///
/// `utilization` is weighted borrows over the liquidation threshold. The
/// anchor is the utilization a fresh position sits at when opened at the
/// strategy's default target exposure; health degrades linearly from 100 at
/// the anchor to 0 at the threshold. An approximation for display, not a
/// first-principles risk recomputation.
pub fn health_percent(
    weighted_borrows_usd: Decimal,
    unhealthy_borrow_value_usd: Decimal,
    anchor_utilization_pct: Decimal,
) -> Decimal {
    if unhealthy_borrow_value_usd <= Decimal::ZERO {
        return HUNDRED_PCT;
    }
    let utilization = weighted_borrows_usd / unhealthy_borrow_value_usd * HUNDRED_PCT;
    let span = HUNDRED_PCT - anchor_utilization_pct;
    if span <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let health = HUNDRED_PCT - (utilization - anchor_utilization_pct) / span * HUNDRED_PCT;
    health.max(Decimal::ZERO).min(HUNDRED_PCT)
}

/// Aggregated stats for one strategy, for display and decision-making
#[derive(Debug, Clone, Serialize)]
pub struct StrategyStats {
    /// Net equity in the strategy's base unit
    pub tvl: Decimal,
    pub apr: AprBreakdown,
    /// Health percentage in `[0, 100]`; 100 when no obligation exists
    pub health_pct: Decimal,
    /// True when the stats describe a hypothetical default-exposure position
    /// rather than an existing obligation
    pub hypothetical: bool,
}

/// Compute strategy stats from a provider's snapshots.
///
/// With an existing obligation, the actual deposit/borrow mix is used. With
/// none, a hypothetical 1-unit deposit is run through the convergence engine
/// at the strategy's default target exposure.
pub fn strategy_stats(
    provider: &dyn MarketDataProvider,
    config: &StrategyConfig,
) -> SimResult<StrategyStats> {
    config.validate()?;
    let collateral = provider.reserve_or_err(config.collateral_coin_type())?;
    let debt = provider.reserve_or_err(&config.borrow_coin_type)?;
    let market = LoopMarket::new(
        collateral,
        debt,
        provider.mint_rate(),
        provider.redeem_rate(),
    )?;

    let (deposited, borrowed, health_pct, hypothetical) = match provider.obligation() {
        Some(obligation) => {
            obligation.validate()?;
            (
                obligation.deposited_amount(config.collateral_coin_type()),
                obligation.borrowed_amount(&config.borrow_coin_type),
                health_percent(
                    obligation.weighted_borrows_usd,
                    obligation.unhealthy_borrow_value_usd,
                    config.target_utilization_at_default_pct,
                ),
                false,
            )
        }
        None => {
            let plan = plan_open(&market, ONE, config.default_target_exposure)?;
            (plan.deposited, plan.borrowed, HUNDRED_PCT, true)
        }
    };

    let apr = position_apr(
        collateral,
        debt,
        deposited,
        borrowed,
        provider.redeem_rate(),
    )?;

    Ok(StrategyStats {
        tvl: tvl(deposited, borrowed, provider.redeem_rate()),
        apr,
        health_pct,
        hypothetical,
    })
}
