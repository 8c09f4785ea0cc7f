pub mod error;
pub mod rates;
pub mod types;

#[cfg(feature = "annuity")]
pub mod annuity;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "strategy")]
pub mod strategy;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use error::PayoffError;
pub use types::*;

/// Standard result type for all payoff-engine operations
pub type PayoffResult<T> = Result<T, PayoffError>;
