//! # Iterative Convergence Engine
//!
//! Walks a position from its current exposure toward a target exposure by
//! repeatedly applying the step-max bounds, entirely client-side. The engine
//! proposes amounts; it never touches the network. The chain re-validates
//! every step at execution time, so the output is advisory.
//!
//! Termination: relative tolerance [`EXPOSURE_REL_TOLERANCE`] on the exposure
//! ratio, or the hard [`MAX_LOOP_ITERATIONS`] cap. Hitting the cap without
//! converging is reported on the plan (and logged) rather than silently
//! swallowed.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use spira_core::constants::{EXPOSURE_REL_TOLERANCE, MAX_LOOP_ITERATIONS, ONE};
use spira_core::errors::{SimError, SimResult};
use spira_core::math::{max_exposure, mint_fee, round_down_dp, Exposure};

use crate::step_bounds::LoopMarket;

/// One borrow-and-redeposit instruction proposed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoopStep {
    /// Amount to borrow, in debt units
    pub borrow: Decimal,
    /// Collateral minted and redeposited from that borrow
    pub deposit: Decimal,
}

/// Result of a leverage-up simulation
#[derive(Debug, Clone, Serialize)]
pub struct LeveragePlan {
    /// Collateral deposited up front when opening a fresh position
    pub initial_deposit: Decimal,
    /// Borrow-and-redeposit steps, in submission order
    pub steps: Vec<LoopStep>,
    /// Deposited amount after all steps
    pub deposited: Decimal,
    /// Borrowed amount after all steps
    pub borrowed: Decimal,
    /// Exposure reached by the plan
    pub final_exposure: Decimal,
    /// False when the iteration cap elapsed before reaching tolerance
    pub converged: bool,
    /// Loop iterations consumed
    pub iterations: usize,
    /// Mint fees paid across the initial deposit and every step
    pub mint_fees_paid: Decimal,
}

/// Validate a target exposure against the protocol ceiling for the market's
/// open LTV. Rejected targets never enter the loop.
pub fn validate_target(market: &LoopMarket<'_>, target: Decimal) -> SimResult<()> {
    let ceiling = max_exposure(market.collateral.open_ltv_pct)?;
    if target < ONE || target >= ceiling {
        return Err(SimError::TargetExposureOutOfRange {
            target,
            min: ONE,
            max: ceiling,
        });
    }
    Ok(())
}

/// Open a fresh position: convert `base_amount` of the base asset into
/// collateral through the mint fee and mint rate, then loop toward `target`.
///
/// A target of exactly 1x performs the initial deposit and zero loop
/// iterations.
pub fn plan_open(
    market: &LoopMarket<'_>,
    base_amount: Decimal,
    target: Decimal,
) -> SimResult<LeveragePlan> {
    validate_target(market, target)?;

    let entry_fee = mint_fee(
        base_amount,
        market.collateral.fees.mint_bps,
        market.debt.decimals,
    );
    let initial_deposit = round_down_dp(
        (base_amount - entry_fee) * market.mint_rate,
        market.collateral.decimals,
    );

    let mut plan = run_loop(market, initial_deposit, Decimal::ZERO, target)?;
    plan.initial_deposit = initial_deposit;
    plan.mint_fees_paid += entry_fee;
    Ok(plan)
}

/// Lever an existing position up toward `target` from its current
/// deposit/borrow amounts (both in the loop pair's units).
pub fn plan_leverage(
    market: &LoopMarket<'_>,
    deposited: Decimal,
    borrowed: Decimal,
    target: Decimal,
) -> SimResult<LeveragePlan> {
    validate_target(market, target)?;
    run_loop(market, deposited, borrowed, target)
}

fn run_loop(
    market: &LoopMarket<'_>,
    mut deposited: Decimal,
    mut borrowed: Decimal,
    target: Decimal,
) -> SimResult<LeveragePlan> {
    let mut steps = Vec::new();
    let mut mint_fees_paid = Decimal::ZERO;
    let mut converged = false;
    let mut iterations = 0;
    let mut current = Exposure::compute(deposited, borrowed).ratio_or_err(deposited, borrowed)?;

    while iterations < MAX_LOOP_ITERATIONS {
        // Terminal check: within relative tolerance of the target.
        if current * (ONE + EXPOSURE_REL_TOLERANCE) >= target {
            converged = true;
            break;
        }
        iterations += 1;

        let step_max_borrow = market.step_max_borrow(deposited, borrowed);
        let step_max_deposit = market.step_max_deposit(step_max_borrow);
        if step_max_borrow <= Decimal::ZERO || step_max_deposit <= Decimal::ZERO {
            // The protocol ceiling leaves no headroom; nothing further to do.
            break;
        }

        let max_stepped = Exposure::compute(
            deposited + step_max_deposit,
            borrowed + step_max_borrow,
        );
        let Some(max_stepped_ratio) = max_stepped.ratio() else {
            // A full step would cross into undefined territory; stop rather
            // than propagate a negative ratio.
            break;
        };
        let step_max_gain = max_stepped_ratio - current;
        if step_max_gain <= Decimal::ZERO {
            break;
        }

        let pending = target - current;
        let borrow = if pending >= step_max_gain {
            // The protocol ceiling binds; take the full step.
            step_max_borrow
        } else {
            round_down_dp(
                step_max_borrow * (pending / step_max_gain),
                market.debt.decimals,
            )
        };
        if borrow <= Decimal::ZERO {
            converged = true;
            break;
        }
        let deposit = market.step_max_deposit(borrow);
        mint_fees_paid += mint_fee(borrow, market.collateral.fees.mint_bps, market.debt.decimals);

        deposited += deposit;
        borrowed += borrow;
        steps.push(LoopStep { borrow, deposit });

        current = Exposure::compute(deposited, borrowed).ratio_or_err(deposited, borrowed)?;
        debug!(
            iteration = iterations,
            %borrow,
            %deposit,
            exposure = %current,
            %target,
            "leverage loop step"
        );
    }

    if !converged {
        warn!(
            exposure = %current,
            %target,
            iterations,
            "leverage loop hit iteration cap before converging"
        );
    }

    Ok(LeveragePlan {
        initial_deposit: Decimal::ZERO,
        steps,
        deposited,
        borrowed,
        final_exposure: current,
        converged,
        iterations,
        mint_fees_paid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{lst_reserve, sui_reserve};
    use rust_decimal_macros::dec;

    #[test]
    fn test_three_x_target_converges() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();

        let plan = plan_leverage(&market, dec!(100), dec!(0), dec!(3)).unwrap();
        assert!(plan.converged);
        assert!(plan.iterations <= 20);
        assert!(plan.final_exposure >= dec!(2.9997));
        assert!(plan.final_exposure <= dec!(3.0003));
        // Every step stayed within the per-step ceiling.
        assert!(plan.steps.iter().all(|s| s.borrow > dec!(0)));
    }

    #[test]
    fn test_one_x_target_is_a_noop_loop() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();

        let plan = plan_open(&market, dec!(10), dec!(1)).unwrap();
        assert!(plan.converged);
        assert_eq!(plan.iterations, 0);
        assert!(plan.steps.is_empty());
        assert_eq!(plan.borrowed, dec!(0));
        // Entry fee is zero in the fixture, so the full amount lands.
        assert_eq!(plan.initial_deposit, dec!(10));
    }

    #[test]
    fn test_entry_fee_applied_on_open() {
        let (mut coll, debt) = (lst_reserve(), sui_reserve());
        coll.fees.mint_bps = 100; // 1%
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();

        let plan = plan_open(&market, dec!(10), dec!(1)).unwrap();
        assert_eq!(plan.initial_deposit, dec!(9.9));
        assert_eq!(plan.mint_fees_paid, dec!(0.1));
    }

    #[test]
    fn test_target_at_ceiling_rejected() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();

        // openLtv 80% => ceiling 5x
        let err = plan_leverage(&market, dec!(100), dec!(0), dec!(5)).unwrap_err();
        assert!(matches!(err, SimError::TargetExposureOutOfRange { .. }));
        let err = plan_leverage(&market, dec!(100), dec!(0), dec!(0.5)).unwrap_err();
        assert!(matches!(err, SimError::TargetExposureOutOfRange { .. }));
    }

    #[test]
    fn test_insolvent_start_is_an_error() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();

        let err = plan_leverage(&market, dec!(100), dec!(150), dec!(2)).unwrap_err();
        assert!(matches!(err, SimError::InsolventPosition { .. }));
    }

    #[test]
    fn test_unreachable_target_reports_non_convergence() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();

        // The conservative price ratio caps reachable exposure at
        // 1/(1 - 0.8*0.98) ~ 4.63x; a 4.62x target needs many iterations.
        let plan = plan_leverage(&market, dec!(100), dec!(0), dec!(4.6)).unwrap();
        if !plan.converged {
            assert_eq!(plan.iterations, MAX_LOOP_ITERATIONS);
        }
        // Either way the plan never proposes past the per-step ceiling.
        assert!(plan.final_exposure < dec!(4.6321));
    }

    #[test]
    fn test_steps_respect_step_max_bound() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();

        let plan = plan_leverage(&market, dec!(100), dec!(0), dec!(3)).unwrap();
        let mut dep = dec!(100);
        let mut bor = dec!(0);
        for step in &plan.steps {
            let ceiling = market.step_max_borrow(dep, bor);
            assert!(step.borrow <= ceiling);
            dep += step.deposit;
            bor += step.borrow;
        }
        assert_eq!(dep, plan.deposited);
        assert_eq!(bor, plan.borrowed);
    }
}
