use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Percent, Years};
use crate::validation;
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOf72Input {
    /// Annual growth rate as a percentage
    pub annual_rate: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOf72Breakdown {
    /// ln 2 / ln(1 + r)
    pub exact_years: Years,
    /// years_to_double - exact_years
    pub approximation_error: Years,
    /// Rate needed to double in a whole number of years (72 / years)
    pub doubling_rate_check: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOf72Output {
    pub years_to_double: Years,
    pub breakdown: RuleOf72Breakdown,
}

/// Years for money to double at a fixed annual rate: 72 / rate.
pub fn calculate_rule_of_72(
    input: &RuleOf72Input,
) -> FinCalcResult<ComputationOutput<RuleOf72Output>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::positive("annual_rate", input.annual_rate)?;
    validation::percentage("annual_rate", input.annual_rate)?;

    let years = dec!(72)
        .checked_div(input.annual_rate)
        .ok_or_else(|| FinCalcError::overflow("rule of 72: 72 / rate"))?;

    let ln_two = dec!(2).ln();
    let ln_growth = (Decimal::ONE + pct_to_rate(input.annual_rate))
        .checked_ln()
        .ok_or_else(|| FinCalcError::DivisionByZero {
            context: "rule of 72: ln(1 + r)".into(),
        })?;
    let exact = ln_two
        .checked_div(ln_growth)
        .ok_or_else(|| FinCalcError::DivisionByZero {
            context: "rule of 72: rate too small to resolve ln(1 + r)".into(),
        })?;

    if input.annual_rate > dec!(20) {
        warnings.push("The rule of 72 loses accuracy above 20% a year".into());
    }

    let rounded_years = years.round_dp(2);
    let output = RuleOf72Output {
        years_to_double: rounded_years,
        breakdown: RuleOf72Breakdown {
            exact_years: exact.round_dp(2),
            approximation_error: (years - exact).round_dp(2),
            doubling_rate_check: (dec!(72) / years).round_dp(2),
        },
    };

    let message = format!(
        "At {}% a year your money doubles in about {} years (exactly {:.2}).",
        input.annual_rate.normalize(),
        rounded_years,
        exact,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rule of 72 (72 / annual rate)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_eight_percent_doubles_in_nine_years() {
        let out = calculate_rule_of_72(&RuleOf72Input {
            annual_rate: dec!(8),
        })
        .unwrap()
        .result;
        assert_eq!(out.years_to_double, dec!(9.00));
        // ln 2 / ln 1.08 = 9.006
        assert_eq!(out.breakdown.exact_years, dec!(9.01));
    }

    #[test]
    fn test_rule_overstates_at_low_rates() {
        let out = calculate_rule_of_72(&RuleOf72Input {
            annual_rate: dec!(2),
        })
        .unwrap()
        .result;
        assert_eq!(out.years_to_double, dec!(36.00));
        assert!(out.breakdown.approximation_error > Decimal::ZERO);
    }

    #[test]
    fn test_high_rate_warns() {
        let result = calculate_rule_of_72(&RuleOf72Input {
            annual_rate: dec!(36),
        })
        .unwrap();
        assert_eq!(result.result.years_to_double, dec!(2.00));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(calculate_rule_of_72(&RuleOf72Input {
            annual_rate: Decimal::ZERO
        })
        .is_err());
    }

    #[test]
    fn test_vanishing_rate_is_an_error_not_a_panic() {
        let err = calculate_rule_of_72(&RuleOf72Input {
            annual_rate: dec!(0.0000000000000000000000000001),
        })
        .unwrap_err();
        assert!(matches!(err, FinCalcError::Overflow { .. }));
    }
}
