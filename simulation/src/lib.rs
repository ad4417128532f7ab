//! # Spira Simulation - Leverage-Loop Engine
//!
//! Client-side simulation of leveraged looping positions. Given immutable
//! reserve/obligation snapshots, the engine computes exposure, per-step
//! borrow/withdraw ceilings, and full borrow-and-redeposit (or
//! withdraw-and-repay) plans that walk a position toward a target exposure.
//!
//! Everything here is advisory: the engine proposes amounts for a transaction
//! builder, and the chain re-validates every step at execution time. The only
//! network-facing seams are the injected [`provider::MarketDataProvider`] and
//! the unwind loop's [`unwind::RepayProbe`]; the planners themselves are
//! synchronous pure functions with no shared state.

pub mod convergence;
pub mod metrics;
pub mod pnl;
pub mod provider;
pub mod step_bounds;
pub mod unwind;

#[cfg(test)]
pub(crate) mod testutil;

pub use convergence::{plan_leverage, plan_open, validate_target, LeveragePlan, LoopStep};
pub use metrics::{health_percent, position_apr, strategy_stats, tvl, AprBreakdown, StrategyStats};
pub use pnl::{realized_pnl, CoinFlows, NetFlows};
pub use provider::{InMemoryProvider, MarketDataProvider};
pub use step_bounds::LoopMarket;
pub use unwind::{plan_unwind, AlwaysSolvent, ProbeError, RepayProbe, UnwindPlan, UnwindStep};

// Re-export the shared error types so embedders need a single dependency.
pub use spira_core::{SimError, SimResult};
