use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::types::{
    ceil_count, format_money, rate_to_pct, round_money, round_ratio, with_metadata,
    ComputationOutput, Money, Percent,
};
use crate::validation;
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenInput {
    pub fixed_costs: Money,
    pub variable_cost_per_unit: Money,
    pub selling_price_per_unit: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenBreakdown {
    /// selling price - variable cost
    pub contribution_margin: Money,
    /// contribution margin / selling price, as a percentage
    pub contribution_margin_ratio: Percent,
    /// fixed costs / contribution margin, before rounding up
    pub exact_units: Decimal,
    pub total_cost_at_break_even: Money,
    pub revenue_at_break_even: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenOutput {
    /// Whole units needed; fractional units cannot be sold
    pub break_even_units: u64,
    pub break_even_revenue: Money,
    pub breakdown: BreakEvenBreakdown,
}

/// Units = ceil(fixed costs / (price - variable cost)).
///
/// Fails with `DomainViolation` when each unit loses money or breaks even on
/// its own, since no sales volume can then cover fixed costs.
pub fn calculate_break_even(
    input: &BreakEvenInput,
) -> FinCalcResult<ComputationOutput<BreakEvenOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validation::non_negative("fixed_costs", input.fixed_costs)?;
    validation::non_negative("variable_cost_per_unit", input.variable_cost_per_unit)?;
    validation::positive("selling_price_per_unit", input.selling_price_per_unit)?;

    let margin = input.selling_price_per_unit - input.variable_cost_per_unit;
    if margin <= Decimal::ZERO {
        return Err(FinCalcError::DomainViolation(format!(
            "selling price {} must exceed variable cost {}",
            format_money(input.selling_price_per_unit),
            format_money(input.variable_cost_per_unit)
        )));
    }

    let exact_units = input
        .fixed_costs
        .checked_div(margin)
        .ok_or_else(|| FinCalcError::overflow("break-even: fixed costs / margin"))?;
    let units = ceil_count(exact_units, "break-even units")?;
    let units_dec = Decimal::from(units);
    let revenue = units_dec
        .checked_mul(input.selling_price_per_unit)
        .ok_or_else(|| FinCalcError::overflow("break-even revenue"))?;
    let total_cost = units_dec
        .checked_mul(input.variable_cost_per_unit)
        .and_then(|variable| variable.checked_add(input.fixed_costs))
        .ok_or_else(|| FinCalcError::overflow("break-even total cost"))?;

    let output = BreakEvenOutput {
        break_even_units: units,
        break_even_revenue: round_money(revenue),
        breakdown: BreakEvenBreakdown {
            contribution_margin: round_money(margin),
            contribution_margin_ratio: round_ratio(rate_to_pct(
                margin / input.selling_price_per_unit,
            )),
            exact_units: exact_units.round_dp(4),
            total_cost_at_break_even: round_money(total_cost),
            revenue_at_break_even: round_money(revenue),
        },
    };

    let message = format!(
        "You need to sell {} units ({} in revenue) to break even.",
        units,
        format_money(revenue),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Break-Even Analysis (fixed costs / contribution margin)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}
