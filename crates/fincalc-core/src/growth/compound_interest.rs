use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{annuity_future_value, growth_factor};
use crate::types::{
    format_money, pct_to_rate, rate_to_pct, round_money, round_ratio, with_metadata,
    CompoundingFrequency, ComputationOutput, Money, Percent, Rate, Years,
};
use crate::validation;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundInterestInput {
    pub principal: Money,
    /// Nominal annual rate as a percentage
    pub annual_interest_rate: Percent,
    /// Investment horizon in years (fractional years allowed)
    pub time_period: Years,
    #[serde(default)]
    pub compounding_frequency: CompoundingFrequency,
    /// Deposit added at the end of every month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_contribution: Option<Money>,
}

/// Balance at the end of a year of the projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyBalance {
    pub year: Years,
    pub balance: Money,
    pub total_contributions: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundInterestBreakdown {
    pub periods_per_year: u32,
    pub rate_per_period: Rate,
    pub total_periods: Decimal,
    /// Effective annual rate as a percentage
    pub effective_annual_rate: Percent,
    pub principal_future_value: Money,
    pub contributions_future_value: Money,
    pub yearly_balances: Vec<YearlyBalance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundInterestOutput {
    pub future_value: Money,
    pub total_contributions: Money,
    pub total_interest: Money,
    pub breakdown: CompoundInterestBreakdown,
}

/// Compounding parameters derived from a nominal rate and frequency.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Compounding {
    pub periods_per_year: u32,
    pub rate_per_period: Rate,
}

impl Compounding {
    pub(crate) fn new(annual_rate: Rate, frequency: CompoundingFrequency) -> Self {
        let periods_per_year = frequency.periods_per_year();
        Compounding {
            periods_per_year,
            rate_per_period: annual_rate / Decimal::from(periods_per_year),
        }
    }

    /// (1 + r/n)^(n t)
    pub(crate) fn factor(&self, years: Years) -> FinCalcResult<Decimal> {
        growth_factor(
            self.rate_per_period,
            Decimal::from(self.periods_per_year) * years,
        )
    }

    /// (1 + r/n)^n - 1
    pub(crate) fn effective_annual_rate(&self) -> FinCalcResult<Rate> {
        Ok(self.factor(Decimal::ONE)? - Decimal::ONE)
    }

    /// Monthly rate equivalent to this compounding schedule.
    fn effective_monthly_rate(&self) -> FinCalcResult<Rate> {
        let months_per_period = Decimal::from(self.periods_per_year) / dec!(12);
        Ok(growth_factor(self.rate_per_period, months_per_period)? - Decimal::ONE)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// FV = P (1 + r/n)^(n t), plus the future value of optional monthly
/// contributions compounded at the equivalent monthly rate.
pub fn calculate_compound_interest(
    input: &CompoundInterestInput,
) -> FinCalcResult<ComputationOutput<CompoundInterestOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validation::non_negative("principal", input.principal)?;
    validation::percentage("annual_interest_rate", input.annual_interest_rate)?;
    validation::horizon_years_decimal("time_period", input.time_period)?;
    validation::optional_non_negative("monthly_contribution", input.monthly_contribution)?;

    let compounding = Compounding::new(
        pct_to_rate(input.annual_interest_rate),
        input.compounding_frequency,
    );
    let contribution = input.monthly_contribution.unwrap_or(Decimal::ZERO);
    let monthly_rate = compounding.effective_monthly_rate()?;

    let balance_at = |years: Years| -> FinCalcResult<(Money, Money)> {
        let principal_fv = input
            .principal
            .checked_mul(compounding.factor(years)?)
            .ok_or_else(|| FinCalcError::overflow("compound interest: principal growth"))?;
        let contributions_fv = if contribution.is_zero() {
            Decimal::ZERO
        } else {
            annuity_future_value(contribution, monthly_rate, years * dec!(12))?
        };
        Ok((principal_fv, contributions_fv))
    };

    let (principal_fv, contributions_fv) = balance_at(input.time_period)?;
    let future_value = principal_fv + contributions_fv;
    let total_contributions = input.principal + contribution * dec!(12) * input.time_period;

    let mut yearly_balances = Vec::new();
    let whole_years = input.time_period.floor().to_u32().unwrap_or(0);
    let mut marks: Vec<Years> = (1..=whole_years).map(Decimal::from).collect();
    if !input.time_period.fract().is_zero() {
        marks.push(input.time_period);
    }
    for year in marks {
        let (p, c) = balance_at(year)?;
        let contributed = input.principal + contribution * dec!(12) * year;
        yearly_balances.push(YearlyBalance {
            year,
            balance: round_money(p + c),
            total_contributions: round_money(contributed),
            total_interest: round_money(p + c - contributed),
        });
    }

    let output = CompoundInterestOutput {
        future_value: round_money(future_value),
        total_contributions: round_money(total_contributions),
        total_interest: round_money(future_value - total_contributions),
        breakdown: CompoundInterestBreakdown {
            periods_per_year: compounding.periods_per_year,
            rate_per_period: compounding.rate_per_period,
            total_periods: Decimal::from(compounding.periods_per_year) * input.time_period,
            effective_annual_rate: round_ratio(rate_to_pct(compounding.effective_annual_rate()?)),
            principal_future_value: round_money(principal_fv),
            contributions_future_value: round_money(contributions_fv),
            yearly_balances,
        },
    };

    let message = format!(
        "{} grows to {} after {} years compounded {}, earning {} in interest.",
        format_money(total_contributions),
        format_money(future_value),
        input.time_period.normalize(),
        input.compounding_frequency.label(),
        format_money(future_value - total_contributions),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Compound Interest (FV = P(1 + r/n)^(nt) + contribution annuity)",
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
