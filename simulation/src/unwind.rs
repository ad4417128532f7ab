//! # Unwind Planner
//!
//! The symmetric direction of the convergence engine: withdraw-and-repay
//! steps that walk a position down toward a lower target exposure, or all the
//! way to a full close.
//!
//! A full unwind cannot know client-side exactly when the chain considers the
//! debt cleared (interest accrues between snapshot and submission), so it
//! consults a dry-run probe before each repay. A probe answer of "no
//! outstanding debt" is the termination signal: the loop stops and the
//! remaining collateral is withdrawn outright instead of looped further.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use spira_core::constants::{EXPOSURE_REL_TOLERANCE, MAX_LOOP_ITERATIONS, ONE};
use spira_core::errors::{SimError, SimResult};
use spira_core::math::{redeem_fee, round_down_dp, Exposure};

use crate::step_bounds::LoopMarket;

/// Outcome of dry-running one repay step against the chain
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// The obligation has no debt left to repay; terminates the unwind loop
    #[error("no outstanding debt to repay")]
    NoOutstandingDebt,
    /// Transport or execution failure; aborts the whole simulation
    #[error("dry-run failed: {0}")]
    Transport(String),
}

/// Dry-run seam for the unwind loop. Production implementations call the
/// chain's simulate endpoint; tests use an in-memory ledger.
pub trait RepayProbe {
    /// Check whether a repay of `amount` would execute against the current
    /// on-chain obligation state.
    fn check_repay(&mut self, amount: Decimal) -> Result<(), ProbeError>;
}

/// A probe that accepts every repay; usable when the caller already knows
/// debt remains (partial de-leverage toward a nonzero target).
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysSolvent;

impl RepayProbe for AlwaysSolvent {
    fn check_repay(&mut self, _amount: Decimal) -> Result<(), ProbeError> {
        Ok(())
    }
}

/// One withdraw-and-repay instruction proposed by the unwind planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnwindStep {
    /// Collateral to withdraw, in collateral units
    pub withdraw: Decimal,
    /// Debt repaid from the redeemed withdrawal, in debt units
    pub repay: Decimal,
}

/// Result of an unwind simulation
#[derive(Debug, Clone, Serialize)]
pub struct UnwindPlan {
    /// Withdraw-and-repay steps, in submission order
    pub steps: Vec<UnwindStep>,
    /// Collateral withdrawn outright after the debt cleared (full unwind only)
    pub leftover_withdraw: Option<Decimal>,
    /// Redeemed base units left over after repays, transferred out rather
    /// than looped further
    pub surplus_redeemed: Decimal,
    /// Deposited amount after all steps
    pub deposited: Decimal,
    /// Borrowed amount after all steps
    pub borrowed: Decimal,
    /// Exposure after all steps (zero once fully closed)
    pub final_exposure: Decimal,
    /// False when the iteration cap elapsed before reaching the target
    pub converged: bool,
    /// Loop iterations consumed
    pub iterations: usize,
    /// Redeem fees paid across every step
    pub redeem_fees_paid: Decimal,
}

/// Walk a position down toward `target` exposure, or fully close it when
/// `target` is `None`.
pub fn plan_unwind(
    market: &LoopMarket<'_>,
    mut deposited: Decimal,
    mut borrowed: Decimal,
    target: Option<Decimal>,
    probe: &mut dyn RepayProbe,
) -> SimResult<UnwindPlan> {
    if let Some(t) = target {
        if t < ONE {
            return Err(SimError::TargetExposureOutOfRange {
                target: t,
                min: ONE,
                max: Decimal::MAX,
            });
        }
    }

    let mut steps = Vec::new();
    let mut redeem_fees_paid = Decimal::ZERO;
    let mut surplus_redeemed = Decimal::ZERO;
    let mut leftover_withdraw = None;
    let mut converged = false;
    let mut iterations = 0;
    let mut current = Exposure::compute(deposited, borrowed).ratio_or_err(deposited, borrowed)?;

    while iterations < MAX_LOOP_ITERATIONS {
        // Terminal check against the target, mirroring the leverage loop.
        if let Some(t) = target {
            if current <= t * (ONE + EXPOSURE_REL_TOLERANCE) {
                converged = true;
                break;
            }
        }
        if borrowed <= Decimal::ZERO {
            // Snapshot says the debt is gone; confirm via dry-run and take
            // the rest of the collateral out in one piece.
            match probe.check_repay(Decimal::ZERO) {
                Err(ProbeError::NoOutstandingDebt) => {
                    leftover_withdraw = Some(deposited);
                    deposited = Decimal::ZERO;
                    converged = true;
                    break;
                }
                // The chain still sees repayable debt the snapshot lost
                // track of; a full withdrawal would be rejected on-chain.
                Ok(()) => {
                    return Err(SimError::inconsistent(
                        "snapshot shows no debt but the chain reports outstanding debt",
                    ))
                }
                Err(ProbeError::Transport(msg)) => return Err(SimError::ProbeFailure(msg)),
            }
        }
        iterations += 1;

        let step_max_withdraw = market.step_max_withdraw(deposited, borrowed);
        if step_max_withdraw <= Decimal::ZERO {
            break;
        }

        // Scale the final step so a partial unwind lands on the target
        // instead of overshooting below it.
        let withdraw = match (target, Exposure::compute(
            deposited - step_max_withdraw,
            borrowed - market.step_max_repay(step_max_withdraw, borrowed),
        )) {
            (Some(t), Exposure::Leveraged(full_stepped)) if full_stepped < t => {
                let full_drop = current - full_stepped;
                let pending_drop = current - t;
                if full_drop > Decimal::ZERO && pending_drop < full_drop {
                    round_down_dp(
                        step_max_withdraw * (pending_drop / full_drop),
                        market.collateral.decimals,
                    )
                } else {
                    step_max_withdraw
                }
            }
            _ => step_max_withdraw,
        };
        if withdraw <= Decimal::ZERO {
            converged = true;
            break;
        }
        let repay = market.step_max_repay(withdraw, borrowed);

        match probe.check_repay(repay) {
            Ok(()) => {}
            Err(ProbeError::NoOutstandingDebt) => {
                // The chain already considers the debt cleared; transfer the
                // remaining collateral out rather than looping further.
                leftover_withdraw = Some(deposited);
                deposited = Decimal::ZERO;
                borrowed = Decimal::ZERO;
                converged = true;
                break;
            }
            Err(ProbeError::Transport(msg)) => return Err(SimError::ProbeFailure(msg)),
        }

        let fee = redeem_fee(
            withdraw,
            market.collateral.fees.redeem_bps,
            market.collateral.decimals,
        );
        redeem_fees_paid += fee;
        let redeemed = (withdraw - fee) * market.redeem_rate;
        surplus_redeemed += (redeemed - repay).max(Decimal::ZERO);

        deposited -= withdraw;
        borrowed -= repay;
        steps.push(UnwindStep { withdraw, repay });

        current = match Exposure::compute(deposited, borrowed) {
            Exposure::Flat => Decimal::ZERO,
            other => other.ratio_or_err(deposited, borrowed)?,
        };
        debug!(
            iteration = iterations,
            %withdraw,
            %repay,
            exposure = %current,
            "unwind loop step"
        );
    }

    if !converged {
        warn!(
            exposure = %current,
            iterations,
            "unwind loop hit iteration cap before reaching target"
        );
    }

    let final_exposure = match Exposure::compute(deposited, borrowed) {
        Exposure::Flat => Decimal::ZERO,
        other => other.ratio_or_err(deposited, borrowed)?,
    };

    Ok(UnwindPlan {
        steps,
        leftover_withdraw,
        surplus_redeemed,
        deposited,
        borrowed,
        final_exposure,
        converged,
        iterations,
        redeem_fees_paid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{lst_reserve, sui_reserve};
    use rust_decimal_macros::dec;

    /// Probe backed by an in-memory debt ledger, mimicking the chain's view
    struct LedgerProbe {
        debt: Decimal,
    }

    impl RepayProbe for LedgerProbe {
        fn check_repay(&mut self, amount: Decimal) -> Result<(), ProbeError> {
            if self.debt <= Decimal::ZERO {
                return Err(ProbeError::NoOutstandingDebt);
            }
            self.debt -= amount.min(self.debt);
            Ok(())
        }
    }

    #[test]
    fn test_full_unwind_clears_debt() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        let mut probe = LedgerProbe { debt: dec!(200) };

        let plan = plan_unwind(&market, dec!(300), dec!(200), None, &mut probe).unwrap();
        assert!(plan.converged);
        assert_eq!(plan.borrowed, dec!(0));
        assert_eq!(plan.deposited, dec!(0));
        assert!(plan.leftover_withdraw.is_some());
        assert_eq!(plan.final_exposure, dec!(0));

        // Fees are zero in the fixture, so the starting equity of 100 comes
        // back in full across surplus and leftover.
        let recovered = plan.surplus_redeemed + plan.leftover_withdraw.unwrap();
        assert!((recovered - dec!(100)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_partial_unwind_lands_on_target() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();

        // 3x down to 2x
        let plan = plan_unwind(
            &market,
            dec!(300),
            dec!(200),
            Some(dec!(2)),
            &mut AlwaysSolvent,
        )
        .unwrap();
        assert!(plan.converged);
        assert!(plan.final_exposure >= dec!(1.9997));
        assert!(plan.final_exposure <= dec!(2.0003));
        assert!(plan.leftover_withdraw.is_none());
        assert!(plan.borrowed > dec!(0));
    }

    #[test]
    fn test_probe_cuts_loop_short() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        // Chain sees far less debt than the stale snapshot claims.
        let mut probe = LedgerProbe { debt: dec!(10) };

        let plan = plan_unwind(&market, dec!(300), dec!(200), None, &mut probe).unwrap();
        assert!(plan.converged);
        assert!(plan.leftover_withdraw.is_some());
    }

    #[test]
    fn test_stale_debt_free_snapshot_is_rejected() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        // Snapshot claims the debt is gone, but the chain still carries some.
        let mut probe = LedgerProbe { debt: dec!(5) };

        let err = plan_unwind(&market, dec!(100), dec!(0), None, &mut probe).unwrap_err();
        assert!(matches!(err, SimError::InconsistentSnapshot(_)));
    }

    #[test]
    fn test_transport_failure_propagates() {
        struct FailingProbe;
        impl RepayProbe for FailingProbe {
            fn check_repay(&mut self, _amount: Decimal) -> Result<(), ProbeError> {
                Err(ProbeError::Transport("rpc timeout".into()))
            }
        }

        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        let err =
            plan_unwind(&market, dec!(300), dec!(200), None, &mut FailingProbe).unwrap_err();
        assert!(matches!(err, SimError::ProbeFailure(_)));
    }

    #[test]
    fn test_unwind_rejects_sub_one_target() {
        let (coll, debt) = (lst_reserve(), sui_reserve());
        let market = LoopMarket::new(&coll, &debt, dec!(1), dec!(1)).unwrap();
        let err = plan_unwind(
            &market,
            dec!(300),
            dec!(200),
            Some(dec!(0.5)),
            &mut AlwaysSolvent,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::TargetExposureOutOfRange { .. }));
    }
}
