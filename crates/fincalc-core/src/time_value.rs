use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::error::FinCalcError;
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// (1 + r)^n for a whole number of periods via iterative multiplication
/// (avoids Decimal::powd drift).
///
/// Fails with `Overflow` once the factor leaves the Decimal range.
pub fn compound(rate: Rate, periods: u32) -> FinCalcResult<Decimal> {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..periods {
        result = result
            .checked_mul(factor)
            .ok_or_else(|| FinCalcError::overflow(format!("(1 + {rate})^{periods}")))?;
    }
    Ok(result)
}

/// (1 + r)^n where n may be fractional (e.g. 2.5 years of quarterly
/// compounding). Whole-period counts stay on the iterative path.
pub fn growth_factor(rate: Rate, periods: Decimal) -> FinCalcResult<Decimal> {
    if rate <= dec!(-1) {
        return Err(FinCalcError::invalid(
            "rate",
            "periodic rate must be greater than -100%",
        ));
    }
    if periods.fract().is_zero() {
        if let Some(n) = periods.to_u32() {
            return compound(rate, n);
        }
    }
    (Decimal::ONE + rate)
        .checked_powd(periods)
        .ok_or_else(|| FinCalcError::overflow(format!("growth factor over {periods} periods")))
}

/// Level payment that amortizes `principal` over `nper` periods.
///
/// Zero-rate loans repay the principal in equal instalments.
pub fn annuity_payment(principal: Money, rate: Rate, nper: u32) -> FinCalcResult<Money> {
    if nper == 0 {
        return Err(FinCalcError::invalid("nper", "Number of periods must be > 0"));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    // P r / (1 - (1+r)^-n) stays bounded where (1+r)^n would not
    if rate <= dec!(-1) {
        return Err(FinCalcError::invalid(
            "rate",
            "periodic rate must be greater than -100%",
        ));
    }
    let discount = Decimal::ONE / (Decimal::ONE + rate);
    let mut remaining = Decimal::ONE;
    for _ in 0..nper {
        remaining = remaining
            .checked_mul(discount)
            .ok_or_else(|| FinCalcError::overflow("annuity discount factor"))?;
    }
    let denominator = Decimal::ONE - remaining;
    if denominator.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    (principal * rate)
        .checked_div(denominator)
        .ok_or_else(|| FinCalcError::overflow("annuity payment"))
}

/// Future value of `pmt` paid at the end of each of `nper` periods.
pub fn annuity_future_value(pmt: Money, rate: Rate, nper: Decimal) -> FinCalcResult<Money> {
    if rate.is_zero() {
        return Ok(pmt * nper);
    }
    let factor = growth_factor(rate, nper)?;
    Ok(pmt * (factor - Decimal::ONE) / rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_matches_powd_for_whole_periods() {
        let iterative = compound(dec!(0.05), 10).unwrap();
        let fractional_path = growth_factor(dec!(0.05), dec!(10)).unwrap();
        assert_eq!(iterative, fractional_path);
        assert!((iterative - dec!(1.628894627)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_growth_factor_fractional_periods() {
        let f = growth_factor(dec!(0.10), dec!(0.5)).unwrap();
        // sqrt(1.1) ~ 1.0488088
        assert!((f - dec!(1.0488088)).abs() < dec!(0.00001));
    }

    #[test]
    fn test_annuity_payment_standard_mortgage() {
        let pmt = annuity_payment(dec!(300000), dec!(0.005), 360).unwrap();
        assert!((pmt - dec!(1798.65)).abs() < dec!(0.01));
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        let pmt = annuity_payment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_annuity_payment_zero_periods_rejected() {
        assert!(annuity_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_annuity_future_value_zero_rate() {
        let fv = annuity_future_value(dec!(100), Decimal::ZERO, dec!(24)).unwrap();
        assert_eq!(fv, dec!(2400));
    }

    #[test]
    fn test_compound_overflow_is_an_error() {
        // 2^100 exceeds the 96-bit Decimal mantissa
        match compound(Decimal::ONE, 100).unwrap_err() {
            FinCalcError::Overflow { .. } => {}
            other => panic!("Expected Overflow, got {other:?}"),
        }
        assert!(compound(Decimal::ONE, 90).is_ok());
    }

    #[test]
    fn test_growth_factor_fractional_overflow_is_an_error() {
        match growth_factor(Decimal::ONE, dec!(150.5)).unwrap_err() {
            FinCalcError::Overflow { .. } => {}
            other => panic!("Expected Overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_annuity_payment_long_high_rate_term() {
        // (1.5)^1200 is far outside the Decimal range; the payment tends to P r
        let pmt = annuity_payment(dec!(1000), dec!(0.5), 1200).unwrap();
        assert_eq!(pmt.round_dp(2), dec!(500.00));
    }

    #[test]
    fn test_rate_below_minus_one_rejected() {
        assert!(growth_factor(dec!(-1), dec!(2)).is_err());
    }
}
