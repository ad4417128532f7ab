//! # Math Primitives
//!
//! Pure decimal arithmetic shared by the snapshot types and the simulation
//! engine: precision-aware rounding, basis-point fee calculations, and the
//! exposure (leverage ratio) calculator.

pub mod exposure;
pub mod fees;
pub mod rounding;

pub use exposure::{max_exposure, Exposure};
pub use fees::{borrow_fee, max_borrow_within, mint_fee, redeem_fee};
pub use rounding::{precision_unit, round_down_dp, round_up_dp};
