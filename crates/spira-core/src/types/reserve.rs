//! # Reserve Snapshot
//!
//! Read-only snapshot of a single-asset lending market: conservative price
//! bounds, risk parameters, fee config, and the utilization-driven interest
//! curve. Snapshots are produced by the fetch layer and treated as immutable
//! inputs for the duration of one simulation call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{bps_to_fraction, pct_to_fraction, HUNDRED_PCT, MAX_FEE_BPS, ONE};
use crate::errors::{SimError, SimResult};

/// Fee configuration for a reserve, in basis points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee on minting the collateral asset from the base asset
    pub mint_bps: u32,
    /// Fee on redeeming the collateral asset back into the base asset
    pub redeem_bps: u32,
    /// Fee added on top of each borrow request
    pub borrow_bps: u32,
    /// Share of borrow interest retained by the protocol
    pub spread_bps: u32,
}

impl FeeConfig {
    /// Validate that no fee exceeds 100%
    pub fn validate(&self) -> SimResult<()> {
        for bps in [self.mint_bps, self.redeem_bps, self.borrow_bps, self.spread_bps] {
            if bps > MAX_FEE_BPS {
                return Err(SimError::InvalidFeeBps(bps));
            }
        }
        Ok(())
    }
}

/// One breakpoint of a reserve's interest-rate curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    /// Utilization percentage in `[0, 100]`
    pub utilization_pct: Decimal,
    /// Borrow APR percentage at that utilization
    pub borrow_apr_pct: Decimal,
}

/// Piecewise-linear interest-rate curve: utilization% -> borrow APR%
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCurve {
    pub points: Vec<RatePoint>,
}

impl RateCurve {
    /// A flat curve returning the same borrow APR at every utilization
    pub fn flat(borrow_apr_pct: Decimal) -> Self {
        Self {
            points: vec![
                RatePoint {
                    utilization_pct: Decimal::ZERO,
                    borrow_apr_pct,
                },
                RatePoint {
                    utilization_pct: HUNDRED_PCT,
                    borrow_apr_pct,
                },
            ],
        }
    }

    /// Validate breakpoint ordering and bounds
    pub fn validate(&self) -> SimResult<()> {
        if self.points.len() < 2 {
            return Err(SimError::InvalidRateCurve("fewer than two breakpoints"));
        }
        for pair in self.points.windows(2) {
            if pair[1].utilization_pct <= pair[0].utilization_pct {
                return Err(SimError::InvalidRateCurve(
                    "breakpoints not strictly increasing in utilization",
                ));
            }
        }
        let first = &self.points[0];
        let last = &self.points[self.points.len() - 1];
        if first.utilization_pct != Decimal::ZERO || last.utilization_pct != HUNDRED_PCT {
            return Err(SimError::InvalidRateCurve(
                "curve must span utilization 0% to 100%",
            ));
        }
        Ok(())
    }

    /// Borrow APR% at a utilization%, linearly interpolated between the two
    /// surrounding breakpoints. Utilization is clamped to `[0, 100]`.
    pub fn borrow_apr_pct(&self, utilization_pct: Decimal) -> Decimal {
        let u = utilization_pct
            .max(Decimal::ZERO)
            .min(HUNDRED_PCT);
        for pair in self.points.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if u <= hi.utilization_pct {
                let span = hi.utilization_pct - lo.utilization_pct;
                let t = (u - lo.utilization_pct) / span;
                return lo.borrow_apr_pct + (hi.borrow_apr_pct - lo.borrow_apr_pct) * t;
            }
        }
        // Unreachable for validated curves; clamp to the last breakpoint.
        self.points[self.points.len() - 1].borrow_apr_pct
    }
}

/// A liquidity-mining reward attached to a reserve's deposit side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEntry {
    /// Coin type of the reward token
    pub coin_type: String,
    /// Reward APR percentage at the snapshot's valuation
    pub apr_pct: Decimal,
}

/// Read-only snapshot of one reserve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    /// Fully-qualified coin type of the reserve's asset
    pub coin_type: String,
    /// Mint decimals of the asset; every proposed amount is pinned here
    pub decimals: u32,

    /// Oracle point price
    pub price: Decimal,
    /// Conservative lower price bound used when valuing collateral
    pub min_price: Decimal,
    /// Conservative upper price bound used when valuing debt
    pub max_price: Decimal,

    /// Open LTV percentage; gates new borrows
    pub open_ltv_pct: Decimal,
    /// Close LTV percentage; gates liquidation
    pub close_ltv_pct: Decimal,
    /// Borrow weight applied to this asset's debt value
    pub borrow_weight: Decimal,

    pub fees: FeeConfig,

    /// Total deposited into the reserve
    pub deposited_total: Decimal,
    /// Total borrowed from the reserve
    pub borrowed_total: Decimal,

    pub rate_curve: RateCurve,
    pub rewards: Vec<RewardEntry>,

    /// Staking-yield APR% for liquid-staking tokens, `None` otherwise
    pub staking_yield_apr_pct: Option<Decimal>,
}

impl ReserveSnapshot {
    /// Validate the snapshot's internal invariants
    pub fn validate(&self) -> SimResult<()> {
        if self.min_price > self.max_price {
            return Err(SimError::InvalidPriceBounds {
                min: self.min_price,
                max: self.max_price,
            });
        }
        if self.price < self.min_price || self.price > self.max_price {
            return Err(SimError::PriceOutsideBounds {
                price: self.price,
                min: self.min_price,
                max: self.max_price,
            });
        }
        if self.open_ltv_pct < Decimal::ZERO || self.open_ltv_pct >= HUNDRED_PCT {
            return Err(SimError::InvalidLtv(self.open_ltv_pct));
        }
        self.fees.validate()?;
        self.rate_curve.validate()
    }

    /// Current utilization percentage of the reserve
    pub fn utilization_pct(&self) -> Decimal {
        if self.deposited_total <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.borrowed_total / self.deposited_total) * HUNDRED_PCT
    }

    /// Borrow APR% at the reserve's current utilization
    pub fn borrow_apr_pct(&self) -> Decimal {
        self.rate_curve.borrow_apr_pct(self.utilization_pct())
    }

    /// Supply-side APR%: borrow interest passed through to depositors, net of
    /// the protocol spread
    pub fn supply_apr_pct(&self) -> Decimal {
        let util = pct_to_fraction(self.utilization_pct());
        let spread = bps_to_fraction(self.fees.spread_bps);
        self.borrow_apr_pct() * util * (ONE - spread)
    }

    /// Total reward APR%, deduplicated across entries sharing a coin type
    /// (the first entry for a coin type wins)
    pub fn reward_apr_pct(&self) -> Decimal {
        let mut seen: Vec<&str> = Vec::with_capacity(self.rewards.len());
        let mut total = Decimal::ZERO;
        for entry in &self.rewards {
            if seen.contains(&entry.coin_type.as_str()) {
                continue;
            }
            seen.push(&entry.coin_type);
            total += entry.apr_pct;
        }
        total
    }
}
