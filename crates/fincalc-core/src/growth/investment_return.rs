use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::types::{
    format_money, rate_to_pct, round_money, round_ratio, with_metadata, ComputationOutput, Money,
    Percent, Years,
};
use crate::validation;
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentReturnInput {
    pub initial_investment: Money,
    pub final_value: Money,
    /// Holding period in years
    pub years: Years,
    /// Total of any further deposits made during the holding period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_contributions: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentReturnBreakdown {
    pub total_invested: Money,
    /// final_value / total_invested
    pub growth_multiple: Decimal,
    /// 1 / years, the exponent used for annualization
    pub annualization_exponent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentReturnOutput {
    pub total_gain: Money,
    pub total_return: Percent,
    /// Compound annual growth rate as a percentage
    pub annualized_return: Percent,
    pub breakdown: InvestmentReturnBreakdown,
}

/// Total and annualized (CAGR) return on an investment.
///
/// Contributions are treated as invested at the start, so the CAGR is a
/// lower bound when deposits actually arrived later.
pub fn calculate_investment_return(
    input: &InvestmentReturnInput,
) -> FinCalcResult<ComputationOutput<InvestmentReturnOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::positive("initial_investment", input.initial_investment)?;
    validation::non_negative("final_value", input.final_value)?;
    validation::positive("years", input.years)?;
    validation::optional_non_negative("additional_contributions", input.additional_contributions)?;

    let contributions = input.additional_contributions.unwrap_or(Decimal::ZERO);
    let invested = input.initial_investment + contributions;
    let gain = input.final_value - invested;
    let multiple = input
        .final_value
        .checked_div(invested)
        .ok_or_else(|| FinCalcError::overflow("investment return: value multiple"))?;
    let exponent = Decimal::ONE
        .checked_div(input.years)
        .ok_or_else(|| FinCalcError::overflow("investment return: 1 / years"))?;

    let cagr = if multiple.is_zero() {
        dec!(-1)
    } else {
        multiple
            .checked_powd(exponent)
            .ok_or_else(|| FinCalcError::overflow("investment return: annualization"))?
            - Decimal::ONE
    };

    if contributions > Decimal::ZERO {
        warnings.push(
            "Additional contributions are assumed invested at the start of the period".into(),
        );
    }

    let total_return = rate_to_pct(gain / invested);
    let output = InvestmentReturnOutput {
        total_gain: round_money(gain),
        total_return: round_ratio(total_return),
        annualized_return: round_ratio(rate_to_pct(cagr)),
        breakdown: InvestmentReturnBreakdown {
            total_invested: round_money(invested),
            growth_multiple: round_ratio(multiple),
            annualization_exponent: exponent.round_dp(8),
        },
    };

    let verb = if gain >= Decimal::ZERO { "gained" } else { "lost" };
    let message = format!(
        "Your investment {} {} ({}%), an annualized return of {}%.",
        verb,
        format_money(gain.abs()),
        total_return.round_dp(2),
        rate_to_pct(cagr).round_dp(2),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Investment Return (total return and CAGR)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}
