//! Range checks shared by every calculator.
//!
//! Deserialization only checks shape. Each calculator asserts the ranges its
//! formula depends on before computing anything.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FinCalcError;
use crate::types::TermUnit;
use crate::FinCalcResult;

/// Longest horizon any calculator projects over.
pub(crate) const MAX_YEARS: u32 = 100;
pub(crate) const MAX_MONTHS: u32 = MAX_YEARS * 12;

pub(crate) fn positive(field: &str, value: Decimal) -> FinCalcResult<()> {
    if value <= Decimal::ZERO {
        return Err(FinCalcError::invalid(field, "must be positive"));
    }
    Ok(())
}

pub(crate) fn non_negative(field: &str, value: Decimal) -> FinCalcResult<()> {
    if value < Decimal::ZERO {
        return Err(FinCalcError::invalid(field, "must be non-negative"));
    }
    Ok(())
}

/// A plain percentage in [0, 100].
pub(crate) fn percentage(field: &str, value: Decimal) -> FinCalcResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(FinCalcError::invalid(
            field,
            "must be a percentage between 0 and 100",
        ));
    }
    Ok(())
}

pub(crate) fn positive_count(field: &str, value: u32) -> FinCalcResult<()> {
    if value == 0 {
        return Err(FinCalcError::invalid(field, "must be at least 1"));
    }
    Ok(())
}

/// A whole number of years in [1, MAX_YEARS].
pub(crate) fn horizon_years(field: &str, value: u32) -> FinCalcResult<()> {
    positive_count(field, value)?;
    if value > MAX_YEARS {
        return Err(FinCalcError::invalid(field, format!("must be at most {MAX_YEARS} years")));
    }
    Ok(())
}

/// A whole number of months in [1, MAX_MONTHS].
pub(crate) fn horizon_months(field: &str, value: u32) -> FinCalcResult<()> {
    positive_count(field, value)?;
    if value > MAX_MONTHS {
        return Err(FinCalcError::invalid(field, format!("must be at most {MAX_MONTHS} months")));
    }
    Ok(())
}

/// A positive, possibly fractional, number of years up to MAX_YEARS.
pub(crate) fn horizon_years_decimal(field: &str, value: Decimal) -> FinCalcResult<()> {
    positive(field, value)?;
    if value > Decimal::from(MAX_YEARS) {
        return Err(FinCalcError::invalid(field, format!("must be at most {MAX_YEARS} years")));
    }
    Ok(())
}

/// Loan term converted to monthly payments, bounded like `horizon_months`.
pub(crate) fn term_months(field: &str, term: u32, unit: TermUnit) -> FinCalcResult<u32> {
    let months = unit
        .months(term)
        .ok_or_else(|| FinCalcError::invalid(field, "term is too long"))?;
    horizon_months(field, months)?;
    Ok(months)
}

pub(crate) fn optional_non_negative(field: &str, value: Option<Decimal>) -> FinCalcResult<()> {
    match value {
        Some(v) => non_negative(field, v),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_bounds() {
        assert!(percentage("rate", dec!(0)).is_ok());
        assert!(percentage("rate", dec!(100)).is_ok());
        assert!(percentage("rate", dec!(100.01)).is_err());
        assert!(percentage("rate", dec!(-0.01)).is_err());
    }

    #[test]
    fn test_horizon_bounds() {
        assert!(horizon_years("years", 1).is_ok());
        assert!(horizon_years("years", MAX_YEARS).is_ok());
        assert!(horizon_years("years", MAX_YEARS + 1).is_err());
        assert!(horizon_years("years", 0).is_err());
        assert!(horizon_months("months", MAX_MONTHS).is_ok());
        assert!(horizon_months("months", MAX_MONTHS + 1).is_err());
        assert!(horizon_years_decimal("time_period", dec!(0.5)).is_ok());
        assert!(horizon_years_decimal("time_period", dec!(100.01)).is_err());
    }

    #[test]
    fn test_term_months() {
        assert_eq!(term_months("loan_term", 30, TermUnit::Years).unwrap(), 360);
        assert_eq!(term_months("loan_term", 18, TermUnit::Months).unwrap(), 18);
        assert!(term_months("loan_term", 101, TermUnit::Years).is_err());
        // u32::MAX * 12 would wrap
        match term_months("loan_term", u32::MAX, TermUnit::Years).unwrap_err() {
            FinCalcError::InvalidInput { field, .. } => assert_eq!(field, "loan_term"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_error_names_field() {
        match positive("face_value", Decimal::ZERO).unwrap_err() {
            FinCalcError::InvalidInput { field, .. } => assert_eq!(field, "face_value"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
