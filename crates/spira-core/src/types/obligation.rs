//! # Obligation Snapshot
//!
//! Read-only snapshot of a user's position: deposit and borrow entries plus
//! the USD aggregates the protocol derives at the snapshot's valuation. The
//! aggregates must reconcile with the entry sums; a snapshot that fails that
//! check is rejected before any simulation runs on it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::AGGREGATE_USD_TOLERANCE;
use crate::errors::{SimError, SimResult};

/// One collateral deposit inside an obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositEntry {
    pub coin_type: String,
    /// Amount in the asset's own unit
    pub deposited_amount: Decimal,
    /// USD value at the snapshot's valuation
    pub deposited_usd: Decimal,
}

/// One outstanding borrow inside an obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowEntry {
    pub coin_type: String,
    /// Amount in the asset's own unit
    pub borrowed_amount: Decimal,
    /// Borrow-weight-adjusted USD value at the snapshot's valuation
    pub weighted_borrowed_usd: Decimal,
}

/// Read-only snapshot of a user's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObligationSnapshot {
    pub deposits: Vec<DepositEntry>,
    pub borrows: Vec<BorrowEntry>,

    /// Sum of deposit USD values
    pub deposited_usd: Decimal,
    /// Sum of borrow-weight-adjusted borrow USD values
    pub weighted_borrows_usd: Decimal,
    /// Open-LTV-weighted collateral value; gates new borrows
    pub borrow_limit_usd: Decimal,
    /// Close-LTV-weighted collateral value; the liquidation threshold
    pub unhealthy_borrow_value_usd: Decimal,
}

impl ObligationSnapshot {
    /// Validate that the derived aggregates reconcile with the entry sums
    /// (within one cent, to absorb the chain's own rounding)
    pub fn validate(&self) -> SimResult<()> {
        let deposit_sum: Decimal = self.deposits.iter().map(|d| d.deposited_usd).sum();
        if (deposit_sum - self.deposited_usd).abs() > AGGREGATE_USD_TOLERANCE {
            return Err(SimError::inconsistent(format!(
                "deposited_usd {} != entry sum {}",
                self.deposited_usd, deposit_sum
            )));
        }
        let borrow_sum: Decimal = self
            .borrows
            .iter()
            .map(|b| b.weighted_borrowed_usd)
            .sum();
        if (borrow_sum - self.weighted_borrows_usd).abs() > AGGREGATE_USD_TOLERANCE {
            return Err(SimError::inconsistent(format!(
                "weighted_borrows_usd {} != entry sum {}",
                self.weighted_borrows_usd, borrow_sum
            )));
        }
        if self.borrow_limit_usd > self.unhealthy_borrow_value_usd {
            return Err(SimError::inconsistent(
                "borrow limit exceeds liquidation threshold".to_string(),
            ));
        }
        Ok(())
    }

    /// Deposited amount for one coin type, zero when absent
    pub fn deposited_amount(&self, coin_type: &str) -> Decimal {
        self.deposits
            .iter()
            .find(|d| d.coin_type == coin_type)
            .map(|d| d.deposited_amount)
            .unwrap_or(Decimal::ZERO)
    }

    /// Borrowed amount for one coin type, zero when absent
    pub fn borrowed_amount(&self, coin_type: &str) -> Decimal {
        self.borrows
            .iter()
            .find(|b| b.coin_type == coin_type)
            .map(|b| b.borrowed_amount)
            .unwrap_or(Decimal::ZERO)
    }

    /// True when the obligation carries no outstanding debt
    pub fn is_debt_free(&self) -> bool {
        self.borrows
            .iter()
            .all(|b| b.borrowed_amount <= Decimal::ZERO)
    }
}
