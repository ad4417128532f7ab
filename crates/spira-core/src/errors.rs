//! # Core Error Types
//!
//! Common error types shared between the snapshot types and the simulation
//! engine. Snapshots are validated up front so that the pure math paths can
//! stay free of per-operation error plumbing.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by snapshot validation and the simulation engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    // ========================================================================
    // Math Errors
    // ========================================================================
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Decimal overflow")]
    DecimalOverflow,

    // ========================================================================
    // Snapshot Validation Errors
    // ========================================================================
    #[error("Invalid price bounds: min {min} must not exceed max {max}")]
    InvalidPriceBounds { min: Decimal, max: Decimal },

    #[error("Price {price} outside conservative bounds [{min}, {max}]")]
    PriceOutsideBounds {
        price: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Invalid fee config: {0} bps exceeds 100%")]
    InvalidFeeBps(u32),

    #[error("Invalid rate curve: {0}")]
    InvalidRateCurve(&'static str),

    #[error("Invalid LTV percentage: {0}")]
    InvalidLtv(Decimal),

    #[error("Inconsistent obligation snapshot: {0}")]
    InconsistentSnapshot(String),

    #[error("Unknown reserve: {0}")]
    UnknownReserve(String),

    #[error("No obligation snapshot available")]
    MissingObligation,

    // ========================================================================
    // Engine Errors
    // ========================================================================
    #[error("Target exposure {target} outside valid range [{min}, {max})")]
    TargetExposureOutOfRange {
        target: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Position is insolvent: borrowed {borrowed} >= deposited {deposited}")]
    InsolventPosition {
        deposited: Decimal,
        borrowed: Decimal,
    },

    #[error("Dry-run probe failed: {0}")]
    ProbeFailure(String),
}

/// Result type using simulation errors
pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Create an inconsistent-snapshot error with context
    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentSnapshot(reason.into())
    }

    /// Create an unknown-reserve error for a coin type
    pub fn unknown_reserve(coin_type: impl Into<String>) -> Self {
        Self::UnknownReserve(coin_type.into())
    }
}
