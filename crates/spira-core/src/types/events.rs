//! # Obligation History Events
//!
//! Chronologically ordered on-chain events for one obligation, used to
//! reconstruct realized PnL. The chain only ever appends; events are never
//! mutated. Each variant's payload is fixed at compile time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One on-chain event in an obligation's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEvent {
    Deposit {
        coin_type: String,
        amount: Decimal,
        timestamp_s: u64,
        digest: String,
    },
    Borrow {
        coin_type: String,
        amount: Decimal,
        timestamp_s: u64,
        digest: String,
    },
    Withdraw {
        coin_type: String,
        amount: Decimal,
        timestamp_s: u64,
        digest: String,
    },
    Repay {
        coin_type: String,
        amount: Decimal,
        timestamp_s: u64,
        digest: String,
    },
    /// Liquidation seizes collateral in exchange for repaying debt
    Liquidate {
        withdraw_coin_type: String,
        withdraw_amount: Decimal,
        repay_coin_type: String,
        repay_amount: Decimal,
        timestamp_s: u64,
        digest: String,
    },
    ClaimReward {
        coin_type: String,
        amount: Decimal,
        timestamp_s: u64,
        digest: String,
    },
    /// Bad debt socialized across the reserve's depositors
    SocializeLoss {
        coin_type: String,
        amount: Decimal,
        timestamp_s: u64,
        digest: String,
    },
}

impl HistoryEvent {
    /// Event timestamp in seconds
    pub fn timestamp_s(&self) -> u64 {
        match self {
            Self::Deposit { timestamp_s, .. }
            | Self::Borrow { timestamp_s, .. }
            | Self::Withdraw { timestamp_s, .. }
            | Self::Repay { timestamp_s, .. }
            | Self::Liquidate { timestamp_s, .. }
            | Self::ClaimReward { timestamp_s, .. }
            | Self::SocializeLoss { timestamp_s, .. } => *timestamp_s,
        }
    }

    /// Transaction digest the event was emitted in
    pub fn digest(&self) -> &str {
        match self {
            Self::Deposit { digest, .. }
            | Self::Borrow { digest, .. }
            | Self::Withdraw { digest, .. }
            | Self::Repay { digest, .. }
            | Self::Liquidate { digest, .. }
            | Self::ClaimReward { digest, .. }
            | Self::SocializeLoss { digest, .. } => digest,
        }
    }
}
