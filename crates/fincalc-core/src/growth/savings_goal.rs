use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::compound;
use crate::types::{
    format_money, pct_to_rate, round_money, with_metadata, ComputationOutput, Money, Percent, Rate,
};
use crate::validation;
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoalInput {
    pub goal_amount: Money,
    #[serde(default)]
    pub current_savings: Money,
    /// Annual return on savings as a percentage
    pub annual_interest_rate: Percent,
    /// Months until the goal date
    pub months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoalBreakdown {
    pub monthly_rate: Rate,
    /// What current savings grow to by the goal date
    pub future_value_of_current_savings: Money,
    /// goal_amount - future_value_of_current_savings, floored at zero
    pub remaining_needed: Money,
    /// ((1 + r)^months - 1) / r, or months at r = 0
    pub annuity_factor: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoalOutput {
    pub monthly_contribution: Money,
    pub total_contributions: Money,
    pub interest_earned: Money,
    pub breakdown: SavingsGoalBreakdown,
}

/// Monthly deposit required to reach a target balance by a deadline.
pub fn calculate_savings_goal(
    input: &SavingsGoalInput,
) -> FinCalcResult<ComputationOutput<SavingsGoalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::positive("goal_amount", input.goal_amount)?;
    validation::non_negative("current_savings", input.current_savings)?;
    validation::percentage("annual_interest_rate", input.annual_interest_rate)?;
    validation::horizon_months("months", input.months)?;

    let r = pct_to_rate(input.annual_interest_rate) / dec!(12);
    let growth = compound(r, input.months)?;
    let fv_current = input
        .current_savings
        .checked_mul(growth)
        .ok_or_else(|| FinCalcError::overflow("savings goal: growth of current savings"))?;
    let annuity_factor = if r.is_zero() {
        Decimal::from(input.months)
    } else {
        (growth - Decimal::ONE) / r
    };

    let remaining = (input.goal_amount - fv_current).max(Decimal::ZERO);
    let monthly = remaining / annuity_factor;
    let total_contributions = monthly * Decimal::from(input.months);
    let final_balance = fv_current + monthly * annuity_factor;
    let interest = final_balance - input.current_savings - total_contributions;

    if remaining.is_zero() {
        warnings.push("Current savings already reach the goal without further deposits".into());
    }

    let output = SavingsGoalOutput {
        monthly_contribution: round_money(monthly),
        total_contributions: round_money(total_contributions),
        interest_earned: round_money(interest),
        breakdown: SavingsGoalBreakdown {
            monthly_rate: r,
            future_value_of_current_savings: round_money(fv_current),
            remaining_needed: round_money(remaining),
            annuity_factor: annuity_factor.round_dp(6),
        },
    };

    let message = if remaining.is_zero() {
        format!(
            "You are on track: current savings grow to {} in {} months.",
            format_money(fv_current),
            input.months
        )
    } else {
        format!(
            "Save {} a month for {} months to reach {}.",
            format_money(monthly),
            input.months,
            format_money(input.goal_amount)
        )
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Savings Goal (sinking-fund payment)",
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

    fn house_deposit() -> SavingsGoalInput {
        SavingsGoalInput {
            goal_amount: dec!(20000),
            current_savings: dec!(0),
            annual_interest_rate: dec!(0),
            months: 40,
        }
    }

    #[test]
    fn test_zero_rate_is_straight_division() {
        let out = calculate_savings_goal(&house_deposit()).unwrap().result;
        assert_eq!(out.monthly_contribution, dec!(500.00));
        assert_eq!(out.interest_earned, Decimal::ZERO);
    }

    #[test]
    fn test_interest_reduces_required_deposit() {
        let input = SavingsGoalInput {
            annual_interest_rate: dec!(4),
            ..house_deposit()
        };
        let out = calculate_savings_goal(&input).unwrap().result;
        assert!(out.monthly_contribution < dec!(500));
        assert!(out.interest_earned > Decimal::ZERO);
        let reached = out.total_contributions + out.interest_earned;
        assert!((reached - dec!(20000)).abs() <= dec!(0.02));
    }

    #[test]
    fn test_current_savings_counted() {
        let input = SavingsGoalInput {
            current_savings: dec!(8000),
            ..house_deposit()
        };
        let out = calculate_savings_goal(&input).unwrap().result;
        assert_eq!(out.monthly_contribution, dec!(300.00));
        assert_eq!(out.breakdown.remaining_needed, dec!(12000.00));
    }

    #[test]
    fn test_goal_already_met() {
        let input = SavingsGoalInput {
            current_savings: dec!(25000),
            ..house_deposit()
        };
        let result = calculate_savings_goal(&input).unwrap();
        assert_eq!(result.result.monthly_contribution, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_months_bounded() {
        let input = SavingsGoalInput {
            months: 1201,
            ..house_deposit()
        };
        assert!(matches!(
            calculate_savings_goal(&input).unwrap_err(),
            FinCalcError::InvalidInput { .. }
        ));

        let input = SavingsGoalInput {
            months: 1200,
            annual_interest_rate: dec!(100),
            ..house_deposit()
        };
        assert!(matches!(
            calculate_savings_goal(&input).unwrap_err(),
            FinCalcError::Overflow { .. }
        ));
    }
}
