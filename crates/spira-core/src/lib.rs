//! # Spira Core - Shared Types and Math
//!
//! This crate contains the types and pure math shared between the simulation
//! engine and any client embedding it. It provides:
//!
//! - Snapshot types for reserves, obligations, and looping strategies
//! - The obligation history event sum type
//! - Fee, rounding, and exposure primitives
//! - Constants and validation logic
//!
//! Everything here is synchronous and side-effect free: snapshots go in,
//! plain decimal values come out.

pub mod constants;
pub mod errors;
pub mod math;
pub mod types;

pub use errors::{SimError, SimResult};
pub use math::{max_exposure, Exposure};
pub use types::*;
