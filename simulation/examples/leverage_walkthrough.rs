//! Walk a position through the full engine: open at 3x, read the aggregated
//! stats, then unwind back to flat.
//!
//! Run with `cargo run --example leverage_walkthrough`; per-iteration loop
//! logs are emitted at debug level.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use spira_core::types::{FeeConfig, RateCurve, ReserveSnapshot, StrategyType};
use spira_simulation::{
    plan_open, plan_unwind, strategy_stats, InMemoryProvider, LoopMarket, ProbeError, RepayProbe,
    SimResult,
};

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

fn main() -> SimResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let collateral = ReserveSnapshot {
        coin_type: "0xlst::ssui::SSUI".into(),
        decimals: 9,
        price: dec!(1.00),
        min_price: dec!(0.98),
        max_price: dec!(1.00),
        open_ltv_pct: dec!(80),
        close_ltv_pct: dec!(85),
        borrow_weight: dec!(1),
        fees: FeeConfig {
            mint_bps: 10,
            redeem_bps: 10,
            borrow_bps: 0,
            spread_bps: 2_000,
        },
        deposited_total: dec!(5000000),
        borrowed_total: dec!(1000000),
        rate_curve: RateCurve::flat(dec!(2)),
        rewards: vec![],
        staking_yield_apr_pct: Some(dec!(4)),
    };
    let debt = ReserveSnapshot {
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
    };

    let market = LoopMarket::new(&collateral, &debt, dec!(1), dec!(1))?;

    // Open 100 SUI worth of the LST loop at 3x.
    let open = plan_open(&market, dec!(100), dec!(3))?;
    println!(
        "open: {} steps, exposure {:.4}, deposited {:.4}, borrowed {:.4}, converged {}",
        open.steps.len(),
        open.final_exposure,
        open.deposited,
        open.borrowed,
        open.converged
    );

    // Strategy dashboard numbers for a fresh wallet (hypothetical position).
    let provider = InMemoryProvider {
        reserves: vec![collateral.clone(), debt.clone()],
        obligation: None,
        mint_rate: dec!(1),
        redeem_rate: dec!(1),
    };
    let stats = strategy_stats(&provider, &StrategyType::LstLoop.config())?;
    println!(
        "stats: tvl {:.4}, net apr {:.2}%, health {:.1}%",
        stats.tvl, stats.apr.net_apr_pct, stats.health_pct
    );

    // Unwind the position back to flat.
    let mut probe = LedgerProbe { debt: open.borrowed };
    let close = plan_unwind(&market, open.deposited, open.borrowed, None, &mut probe)?;
    println!(
        "close: {} steps, leftover {:?}, surplus {:.4}, fees {:.6}",
        close.steps.len(),
        close.leftover_withdraw,
        close.surplus_redeemed,
        open.mint_fees_paid + close.redeem_fees_paid
    );

    Ok(())
}
