use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{
    format_money, pct_to_rate, rate_to_pct, round_money, with_metadata, ComputationOutput, Money,
    Percent,
};
use crate::validation;
use crate::FinCalcResult;

/// Ceiling most lenders use for total debt payments.
const PREFERRED_DTI: Percent = dec!(36);
/// Qualified-mortgage ceiling.
const MAXIMUM_DTI: Percent = dec!(43);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtToIncomeInput {
    /// Sum of all recurring monthly debt payments
    pub monthly_debt_payments: Money,
    pub gross_monthly_income: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtiCategory {
    Excellent,
    Good,
    Manageable,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtToIncomeBreakdown {
    /// Additional monthly debt that keeps the ratio at or below 36%
    pub room_to_preferred: Money,
    /// Additional monthly debt that keeps the ratio at or below 43%
    pub room_to_maximum: Money,
    pub annual_debt_payments: Money,
    pub annual_income: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtToIncomeOutput {
    pub debt_to_income_ratio: Percent,
    pub category: DtiCategory,
    pub breakdown: DebtToIncomeBreakdown,
}

pub fn calculate_debt_to_income(
    input: &DebtToIncomeInput,
) -> FinCalcResult<ComputationOutput<DebtToIncomeOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validation::non_negative("monthly_debt_payments", input.monthly_debt_payments)?;
    validation::positive("gross_monthly_income", input.gross_monthly_income)?;

    let ratio = rate_to_pct(input.monthly_debt_payments / input.gross_monthly_income);
    let category = classify(ratio);

    let room = |ceiling: Percent| {
        (input.gross_monthly_income * pct_to_rate(ceiling) - input.monthly_debt_payments)
            .max(Decimal::ZERO)
    };

    let output = DebtToIncomeOutput {
        debt_to_income_ratio: ratio.round_dp(2),
        category,
        breakdown: DebtToIncomeBreakdown {
            room_to_preferred: round_money(room(PREFERRED_DTI)),
            room_to_maximum: round_money(room(MAXIMUM_DTI)),
            annual_debt_payments: round_money(input.monthly_debt_payments * dec!(12)),
            annual_income: round_money(input.gross_monthly_income * dec!(12)),
        },
    };

    let message = format!(
        "Your debt-to-income ratio is {}% ({:?}). You can add {} of monthly debt before reaching 36%.",
        ratio.round_dp(2),
        category,
        format_money(room(PREFERRED_DTI)),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt-to-Income Ratio (monthly debt / gross monthly income)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}

fn classify(ratio: Percent) -> DtiCategory {
    if ratio <= dec!(20) {
        DtiCategory::Excellent
    } else if ratio <= PREFERRED_DTI {
        DtiCategory::Good
    } else if ratio <= MAXIMUM_DTI {
        DtiCategory::Manageable
    } else {
        DtiCategory::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ratio_and_category() {
        let out = calculate_debt_to_income(&DebtToIncomeInput {
            monthly_debt_payments: dec!(1500),
            gross_monthly_income: dec!(6000),
        })
        .unwrap()
        .result;
        assert_eq!(out.debt_to_income_ratio, dec!(25));
        assert_eq!(out.category, DtiCategory::Good);
        assert_eq!(out.breakdown.room_to_preferred, dec!(660.00));
        assert_eq!(out.breakdown.room_to_maximum, dec!(1080.00));
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(classify(dec!(20)), DtiCategory::Excellent);
        assert_eq!(classify(dec!(36)), DtiCategory::Good);
        assert_eq!(classify(dec!(43)), DtiCategory::Manageable);
        assert_eq!(classify(dec!(43.01)), DtiCategory::High);
    }

    #[test]
    fn test_room_floors_at_zero() {
        let out = calculate_debt_to_income(&DebtToIncomeInput {
            monthly_debt_payments: dec!(3000),
            gross_monthly_income: dec!(6000),
        })
        .unwrap()
        .result;
        assert_eq!(out.category, DtiCategory::High);
        assert_eq!(out.breakdown.room_to_maximum, Decimal::ZERO);
    }

    #[test]
    fn test_zero_income_rejected() {
        assert!(calculate_debt_to_income(&DebtToIncomeInput {
            monthly_debt_payments: dec!(100),
            gross_monthly_income: Decimal::ZERO,
        })
        .is_err());
    }
}
