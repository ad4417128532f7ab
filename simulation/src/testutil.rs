//! Shared test fixtures: a zero-fee LST/SUI reserve pair with the
//! conservative price ratio at 0.98, matching the engine's reference
//! scenarios.

use rust_decimal_macros::dec;
use spira_core::types::{
    BorrowEntry, DepositEntry, FeeConfig, ObligationSnapshot, RateCurve, ReserveSnapshot,
};

pub(crate) fn lst_reserve() -> ReserveSnapshot {
    ReserveSnapshot {
        coin_type: "0xlst::ssui::SSUI".into(),
        decimals: 9,
        price: dec!(1.00),
        min_price: dec!(0.98),
        max_price: dec!(1.00),
        open_ltv_pct: dec!(80),
        close_ltv_pct: dec!(85),
        borrow_weight: dec!(1),
        fees: FeeConfig::default(),
        deposited_total: dec!(5000000),
        borrowed_total: dec!(1000000),
        rate_curve: RateCurve::flat(dec!(2)),
        rewards: vec![],
        staking_yield_apr_pct: Some(dec!(4)),
    }
}

pub(crate) fn sui_reserve() -> ReserveSnapshot {
    ReserveSnapshot {
        coin_type: "0x2::sui::SUI".into(),
        decimals: 9,
        price: dec!(1.00),
        min_price: dec!(1.00),
        max_price: dec!(1.00),
        open_ltv_pct: dec!(70),
        close_ltv_pct: dec!(75),
        borrow_weight: dec!(1),
        fees: FeeConfig::default(),
        deposited_total: dec!(1000000),
        borrowed_total: dec!(400000),
        rate_curve: RateCurve::flat(dec!(3)),
        rewards: vec![],
        staking_yield_apr_pct: None,
    }
}

/// A 3x position: 300 LST deposited against 200 SUI borrowed
pub(crate) fn obligation_3x() -> ObligationSnapshot {
    ObligationSnapshot {
        deposits: vec![DepositEntry {
            coin_type: "0xlst::ssui::SSUI".into(),
            deposited_amount: dec!(300),
            deposited_usd: dec!(300),
        }],
        borrows: vec![BorrowEntry {
            coin_type: "0x2::sui::SUI".into(),
            borrowed_amount: dec!(200),
            weighted_borrowed_usd: dec!(200),
        }],
        deposited_usd: dec!(300),
        weighted_borrows_usd: dec!(200),
        borrow_limit_usd: dec!(240),
        unhealthy_borrow_value_usd: dec!(255),
    }
}
