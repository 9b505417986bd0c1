use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::compound;
use crate::types::{
    format_money, pct_to_rate, round_money, with_metadata, ComputationOutput, Money, Percent,
};
use crate::validation;
use crate::FinCalcResult;

/// Withdrawal rate used to translate the projected balance into income.
const DEFAULT_WITHDRAWAL_RATE: Decimal = dec!(4);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: Money,
    pub monthly_contribution: Money,
    /// Expected annual return as a percentage
    pub expected_annual_return: Percent,
    /// Annual inflation as a percentage; used for today's-money figures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation_rate: Option<Percent>,
    /// Sustainable withdrawal rate as a percentage (default 4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_rate: Option<Percent>,
}

/// A single year in the accumulation projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementYear {
    pub age: u32,
    pub beginning_balance: Money,
    pub contribution: Money,
    pub investment_return: Money,
    pub ending_balance: Money,
    /// Ending balance deflated to today's money
    pub real_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementBreakdown {
    pub years_to_retirement: u32,
    pub annual_contribution: Money,
    /// current_savings (1 + r)^years
    pub future_value_of_savings: Money,
    /// annual_contribution ((1 + r)^years - 1) / r, or contributions x years at r = 0
    pub future_value_of_contributions: Money,
    pub growth_factor: Decimal,
    pub year_by_year: Vec<RetirementYear>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementOutput {
    pub projected_savings: Money,
    pub total_contributions: Money,
    pub investment_growth: Money,
    /// Projected savings in today's money
    pub real_projected_savings: Money,
    /// projected_savings x withdrawal_rate
    pub annual_retirement_income: Money,
    pub breakdown: RetirementBreakdown,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project savings at retirement: future value of the current balance plus
/// the future value of annual contributions (monthly x 12, end of year).
pub fn calculate_retirement(
    input: &RetirementInput,
) -> FinCalcResult<ComputationOutput<RetirementOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.retirement_age <= input.current_age {
        return Err(FinCalcError::invalid(
            "retirement_age",
            "retirement_age must be greater than current_age",
        ));
    }
    validation::non_negative("current_savings", input.current_savings)?;
    validation::non_negative("monthly_contribution", input.monthly_contribution)?;
    validation::percentage("expected_annual_return", input.expected_annual_return)?;
    if let Some(inflation) = input.inflation_rate {
        validation::percentage("inflation_rate", inflation)?;
    }
    if let Some(rate) = input.withdrawal_rate {
        validation::percentage("withdrawal_rate", rate)?;
    }

    let years = input.retirement_age - input.current_age;
    validation::horizon_years("retirement_age", years)?;
    let r = pct_to_rate(input.expected_annual_return);
    let inflation = pct_to_rate(input.inflation_rate.unwrap_or(Decimal::ZERO));
    let annual_contribution = input.monthly_contribution * dec!(12);

    let factor = compound(r, years)?;
    let fv_savings = input
        .current_savings
        .checked_mul(factor)
        .ok_or_else(|| FinCalcError::overflow("retirement: growth of current savings"))?;
    let fv_contributions = if r.is_zero() {
        annual_contribution * Decimal::from(years)
    } else {
        annual_contribution
            .checked_mul(factor - Decimal::ONE)
            .ok_or_else(|| FinCalcError::overflow("retirement: growth of contributions"))?
            / r
    };
    let projected = fv_savings
        .checked_add(fv_contributions)
        .ok_or_else(|| FinCalcError::overflow("retirement: projected savings"))?;
    let total_contributions = input.current_savings + annual_contribution * Decimal::from(years);
    let real_projected = projected / compound(inflation, years)?;

    let mut year_by_year = Vec::with_capacity(years as usize);
    let mut balance = input.current_savings;
    let mut price_level = Decimal::ONE;
    for yr in 0..years {
        let beginning = balance;
        let investment_return = beginning * r;
        balance = beginning + investment_return + annual_contribution;
        price_level *= Decimal::ONE + inflation;
        year_by_year.push(RetirementYear {
            age: input.current_age + yr + 1,
            beginning_balance: round_money(beginning),
            contribution: round_money(annual_contribution),
            investment_return: round_money(investment_return),
            ending_balance: round_money(balance),
            real_value: round_money(balance / price_level),
        });
    }

    let withdrawal_rate = pct_to_rate(input.withdrawal_rate.unwrap_or(DEFAULT_WITHDRAWAL_RATE));
    let income = projected * withdrawal_rate;

    if years < 5 {
        warnings.push(format!(
            "Only {years} years to retirement: projection is sensitive to short-term returns"
        ));
    }

    let output = RetirementOutput {
        projected_savings: round_money(projected),
        total_contributions: round_money(total_contributions),
        investment_growth: round_money(projected - total_contributions),
        real_projected_savings: round_money(real_projected),
        annual_retirement_income: round_money(income),
        breakdown: RetirementBreakdown {
            years_to_retirement: years,
            annual_contribution: round_money(annual_contribution),
            future_value_of_savings: round_money(fv_savings),
            future_value_of_contributions: round_money(fv_contributions),
            growth_factor: factor.round_dp(8),
            year_by_year,
        },
    };

    let message = format!(
        "By age {} you could have {}, supporting about {} a year in retirement.",
        input.retirement_age,
        format_money(projected),
        format_money(income),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Retirement Projection (lump-sum FV + annuity FV)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
