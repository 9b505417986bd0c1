use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::types::{
    format_money, pct_to_rate, round_money, with_metadata, ComputationOutput, Money, Percent,
};
use crate::validation;
use crate::FinCalcResult;

fn default_needs() -> Percent {
    dec!(50)
}

fn default_wants() -> Percent {
    dec!(30)
}

fn default_savings() -> Percent {
    dec!(20)
}

/// Monthly take-home income split into needs, wants and savings.
/// Percentages default to the 50/30/20 rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInput {
    pub monthly_income: Money,
    #[serde(default = "default_needs")]
    pub needs_percentage: Percent,
    #[serde(default = "default_wants")]
    pub wants_percentage: Percent,
    #[serde(default = "default_savings")]
    pub savings_percentage: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetBucket {
    pub percentage: Percent,
    pub monthly: Money,
    pub annual: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub needs: BudgetBucket,
    pub wants: BudgetBucket,
    pub savings: BudgetBucket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetOutput {
    pub needs: Money,
    pub wants: Money,
    pub savings: Money,
    pub annual_income: Money,
    pub breakdown: BudgetBreakdown,
}

pub fn calculate_budget(input: &BudgetInput) -> FinCalcResult<ComputationOutput<BudgetOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::positive("monthly_income", input.monthly_income)?;
    validation::percentage("needs_percentage", input.needs_percentage)?;
    validation::percentage("wants_percentage", input.wants_percentage)?;
    validation::percentage("savings_percentage", input.savings_percentage)?;

    let total = input.needs_percentage + input.wants_percentage + input.savings_percentage;
    if total != dec!(100) {
        return Err(FinCalcError::DomainViolation(format!(
            "budget percentages must sum to 100, got {}",
            total.normalize()
        )));
    }

    if input.savings_percentage < dec!(10) {
        warnings.push("Saving less than 10% of income leaves little room for emergencies".into());
    }

    let bucket = |pct: Percent| {
        let monthly = input.monthly_income * pct_to_rate(pct);
        BudgetBucket {
            percentage: pct,
            monthly: round_money(monthly),
            annual: round_money(monthly * dec!(12)),
        }
    };
    let needs = bucket(input.needs_percentage);
    let wants = bucket(input.wants_percentage);
    let savings = bucket(input.savings_percentage);

    let output = BudgetOutput {
        needs: needs.monthly,
        wants: wants.monthly,
        savings: savings.monthly,
        annual_income: round_money(input.monthly_income * dec!(12)),
        breakdown: BudgetBreakdown {
            needs,
            wants,
            savings,
        },
    };

    let message = format!(
        "Of {} a month: {} for needs, {} for wants and {} for savings.",
        format_money(input.monthly_income),
        format_money(output.needs),
        format_money(output.wants),
        format_money(output.savings),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Budget Allocation (needs / wants / savings)",
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
    fn test_default_fifty_thirty_twenty() {
        let input: BudgetInput =
            serde_json::from_value(serde_json::json!({ "monthly_income": "5000" })).unwrap();
        let out = calculate_budget(&input).unwrap().result;
        assert_eq!(out.needs, dec!(2500.00));
        assert_eq!(out.wants, dec!(1500.00));
        assert_eq!(out.savings, dec!(1000.00));
        assert_eq!(out.annual_income, dec!(60000.00));
        assert_eq!(out.breakdown.savings.annual, dec!(12000.00));
    }

    #[test]
    fn test_custom_split() {
        let input = BudgetInput {
            monthly_income: dec!(4000),
            needs_percentage: dec!(60),
            wants_percentage: dec!(35),
            savings_percentage: dec!(5),
        };
        let result = calculate_budget(&input).unwrap();
        assert_eq!(result.result.savings, dec!(200.00));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_percentages_must_sum_to_hundred() {
        let input = BudgetInput {
            monthly_income: dec!(4000),
            needs_percentage: dec!(60),
            wants_percentage: dec!(30),
            savings_percentage: dec!(20),
        };
        assert!(matches!(
            calculate_budget(&input).unwrap_err(),
            FinCalcError::DomainViolation(_)
        ));
    }
}
