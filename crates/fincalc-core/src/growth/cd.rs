use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::growth::compound_interest::Compounding;
use crate::types::{
    format_money, pct_to_rate, rate_to_pct, round_money, round_ratio, with_metadata,
    CompoundingFrequency, ComputationOutput, Money, Percent, Rate, Years,
};
use crate::validation;
use crate::FinCalcResult;

/// Certificate of deposit held to maturity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdInput {
    pub initial_deposit: Money,
    /// Nominal annual rate as a percentage
    pub annual_interest_rate: Percent,
    /// Term in years (e.g. 0.5 for a six-month CD)
    pub time_period: Years,
    #[serde(default)]
    pub compounding_frequency: CompoundingFrequency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdBreakdown {
    pub periods_per_year: u32,
    pub rate_per_period: Rate,
    pub total_periods: Decimal,
    /// (1 + r/n)^(n t)
    pub growth_factor: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdOutput {
    pub future_value: Money,
    pub interest_earned: Money,
    /// Annual percentage yield, (1 + r/n)^n - 1, as a percentage
    pub apy: Percent,
    pub breakdown: CdBreakdown,
}

/// Maturity value of a CD: FV = P (1 + r/n)^(n t).
pub fn calculate_cd(input: &CdInput) -> FinCalcResult<ComputationOutput<CdOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validation::positive("initial_deposit", input.initial_deposit)?;
    validation::percentage("annual_interest_rate", input.annual_interest_rate)?;
    validation::horizon_years_decimal("time_period", input.time_period)?;

    let compounding = Compounding::new(
        pct_to_rate(input.annual_interest_rate),
        input.compounding_frequency,
    );
    let factor = compounding.factor(input.time_period)?;
    let future_value = input
        .initial_deposit
        .checked_mul(factor)
        .ok_or_else(|| FinCalcError::overflow("certificate of deposit: maturity value"))?;
    let interest = future_value - input.initial_deposit;
    let apy = rate_to_pct(compounding.effective_annual_rate()?);

    let output = CdOutput {
        future_value: round_money(future_value),
        interest_earned: round_money(interest),
        apy: round_ratio(apy),
        breakdown: CdBreakdown {
            periods_per_year: compounding.periods_per_year,
            rate_per_period: compounding.rate_per_period,
            total_periods: Decimal::from(compounding.periods_per_year) * input.time_period,
            growth_factor: factor.round_dp(8),
        },
    };

    let message = format!(
        "Your CD will be worth {} at maturity, earning {} ({}% APY).",
        format_money(future_value),
        format_money(interest),
        apy.round_dp(2),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Certificate of Deposit (FV = P(1 + r/n)^(nt))",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}
