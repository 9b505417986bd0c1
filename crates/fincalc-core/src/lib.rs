pub mod error;
pub mod time_value;
pub mod types;

mod validation;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "growth")]
pub mod growth;

#[cfg(feature = "household")]
pub mod household;

#[cfg(feature = "business")]
pub mod business;

#[cfg(feature = "market")]
pub mod market;

pub use error::FinCalcError;
pub use types::*;

/// Standard result type for all fincalc operations
pub type FinCalcResult<T> = Result<T, FinCalcError>;
