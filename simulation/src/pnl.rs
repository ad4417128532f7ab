//! # Realized PnL Reconstruction
//!
//! Folds an obligation's chronological event history into per-coin net flows
//! and derives realized PnL against the current position. Events come from
//! the chain in order and are never mutated; the fold is a pure reduction.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use spira_core::types::HistoryEvent;

/// Accumulated flows for one coin type across an obligation's history
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoinFlows {
    pub deposited: Decimal,
    pub withdrawn: Decimal,
    pub borrowed: Decimal,
    pub repaid: Decimal,
    pub rewards_claimed: Decimal,
    /// Collateral seized by liquidations
    pub liquidated: Decimal,
    /// Debt repaid by liquidators out of seized collateral. Not a wallet
    /// flow; kept separate from `repaid` so PnL does not double-count the
    /// debt reduction already reflected in the surviving position.
    pub liquidation_repaid: Decimal,
    /// Debt forgiven against this coin through loss socialization
    pub socialized: Decimal,
}

/// Per-coin net flows folded from an event history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetFlows {
    pub by_coin: BTreeMap<String, CoinFlows>,
}

impl NetFlows {
    /// Fold a chronologically ordered event slice
    pub fn from_events(events: &[HistoryEvent]) -> Self {
        let mut flows = NetFlows::default();
        for event in events {
            match event {
                HistoryEvent::Deposit {
                    coin_type, amount, ..
                } => flows.entry(coin_type).deposited += *amount,
                HistoryEvent::Withdraw {
                    coin_type, amount, ..
                } => flows.entry(coin_type).withdrawn += *amount,
                HistoryEvent::Borrow {
                    coin_type, amount, ..
                } => flows.entry(coin_type).borrowed += *amount,
                HistoryEvent::Repay {
                    coin_type, amount, ..
                } => flows.entry(coin_type).repaid += *amount,
                HistoryEvent::Liquidate {
                    withdraw_coin_type,
                    withdraw_amount,
                    repay_coin_type,
                    repay_amount,
                    ..
                } => {
                    flows.entry(withdraw_coin_type).liquidated += *withdraw_amount;
                    flows.entry(repay_coin_type).liquidation_repaid += *repay_amount;
                }
                HistoryEvent::ClaimReward {
                    coin_type, amount, ..
                } => flows.entry(coin_type).rewards_claimed += *amount,
                HistoryEvent::SocializeLoss {
                    coin_type, amount, ..
                } => flows.entry(coin_type).socialized += *amount,
            }
        }
        flows
    }

    fn entry(&mut self, coin_type: &str) -> &mut CoinFlows {
        self.by_coin.entry(coin_type.to_string()).or_default()
    }

    /// Flows for one coin type, all-zero when absent
    pub fn coin(&self, coin_type: &str) -> CoinFlows {
        self.by_coin.get(coin_type).copied().unwrap_or_default()
    }
}

/// Realized PnL of a position, valued in a common unit through `rate_of`
/// (units of the common unit per one unit of the coin).
///
/// PnL = current equity + everything taken out - everything put in. Borrows
/// and repays net out against the debt they create, so only the external
/// flows (deposits, withdrawals, rewards) and the surviving position move the
/// result. Liquidation repays are funded by seized collateral rather than the
/// wallet and are excluded here; the seizure itself lands through the reduced
/// `current_deposited`.
pub fn realized_pnl<F>(
    flows: &NetFlows,
    current_deposited: &BTreeMap<String, Decimal>,
    current_borrowed: &BTreeMap<String, Decimal>,
    rate_of: F,
) -> Decimal
where
    F: Fn(&str) -> Decimal,
{
    let mut pnl = Decimal::ZERO;
    for (coin, f) in &flows.by_coin {
        let rate = rate_of(coin);
        pnl += (f.withdrawn + f.rewards_claimed - f.deposited) * rate;
        // Borrowed funds entered the wallet, repaid funds left it.
        pnl += (f.borrowed - f.repaid) * rate;
    }
    for (coin, amount) in current_deposited {
        pnl += *amount * rate_of(coin);
    }
    for (coin, amount) in current_borrowed {
        pnl -= *amount * rate_of(coin);
    }
    pnl
}
