//! # Snapshot Types
//!
//! Immutable snapshot and configuration types consumed by the simulation
//! engine: reserves, obligations, looping strategies, and obligation history
//! events. Snapshots are owned by the fetch layer; the engine never mutates
//! them.

pub mod events;
pub mod obligation;
pub mod reserve;
pub mod strategy;

pub use events::HistoryEvent;
pub use obligation::{BorrowEntry, DepositEntry, ObligationSnapshot};
pub use reserve::{FeeConfig, RateCurve, RatePoint, ReserveSnapshot, RewardEntry};
pub use strategy::{StrategyConfig, StrategyType};
