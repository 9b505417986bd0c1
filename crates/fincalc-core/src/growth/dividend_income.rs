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

fn default_years() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendIncomeInput {
    pub investment_amount: Money,
    /// Current dividend yield as a percentage
    pub dividend_yield: Percent,
    /// Projection horizon in years
    #[serde(default = "default_years")]
    pub years: u32,
    /// Reinvest each year's dividends (DRIP)
    #[serde(default)]
    pub reinvest_dividends: bool,
    /// Annual growth of the dividend per share, as a percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_dividend_growth: Option<Percent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendYear {
    pub year: u32,
    pub starting_value: Money,
    pub dividend: Money,
    pub cumulative_dividends: Money,
    pub ending_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendIncomeBreakdown {
    /// Yield as a decimal fraction
    pub yield_rate: Decimal,
    pub growth_rate: Decimal,
    pub projection: Vec<DividendYear>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendIncomeOutput {
    pub annual_income: Money,
    pub quarterly_income: Money,
    pub monthly_income: Money,
    /// Dividends received over the whole horizon
    pub total_dividends: Money,
    pub final_value: Money,
    /// Final year's dividend relative to the original investment, as a percentage
    pub yield_on_cost: Percent,
    pub breakdown: DividendIncomeBreakdown,
}

/// Dividend income from a holding, projected over `years` with optional
/// dividend growth and reinvestment. Share prices are held flat.
pub fn calculate_dividend_income(
    input: &DividendIncomeInput,
) -> FinCalcResult<ComputationOutput<DividendIncomeOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validation::positive("investment_amount", input.investment_amount)?;
    validation::percentage("dividend_yield", input.dividend_yield)?;
    validation::horizon_years("years", input.years)?;
    if let Some(g) = input.annual_dividend_growth {
        validation::percentage("annual_dividend_growth", g)?;
    }

    let yield_rate = pct_to_rate(input.dividend_yield);
    let growth = pct_to_rate(input.annual_dividend_growth.unwrap_or(Decimal::ZERO));

    let annual = input.investment_amount * yield_rate;

    let mut projection = Vec::with_capacity(input.years as usize);
    let mut value = input.investment_amount;
    let mut current_yield = yield_rate;
    let mut cumulative = Decimal::ZERO;
    let mut last_dividend = Decimal::ZERO;

    let overflow_at =
        |year: u32| FinCalcError::overflow(format!("dividend projection, year {year}"));
    for year in 1..=input.years {
        let starting = value;
        let dividend = value
            .checked_mul(current_yield)
            .ok_or_else(|| overflow_at(year))?;
        cumulative = cumulative
            .checked_add(dividend)
            .ok_or_else(|| overflow_at(year))?;
        if input.reinvest_dividends {
            value = value
                .checked_add(dividend)
                .ok_or_else(|| overflow_at(year))?;
        }
        last_dividend = dividend;
        projection.push(DividendYear {
            year,
            starting_value: round_money(starting),
            dividend: round_money(dividend),
            cumulative_dividends: round_money(cumulative),
            ending_value: round_money(value),
        });
        current_yield = current_yield
            .checked_mul(Decimal::ONE + growth)
            .ok_or_else(|| overflow_at(year))?;
    }

    let yield_on_cost = last_dividend / input.investment_amount * dec!(100);

    let output = DividendIncomeOutput {
        annual_income: round_money(annual),
        quarterly_income: round_money(annual / dec!(4)),
        monthly_income: round_money(annual / dec!(12)),
        total_dividends: round_money(cumulative),
        final_value: round_money(value),
        yield_on_cost: yield_on_cost.round_dp(4),
        breakdown: DividendIncomeBreakdown {
            yield_rate,
            growth_rate: growth,
            projection,
        },
    };

    let message = format!(
        "{} at a {}% yield pays {} a year ({} a month); {} in dividends over {} years.",
        format_money(input.investment_amount),
        input.dividend_yield.normalize(),
        format_money(annual),
        format_money(annual / dec!(12)),
        format_money(cumulative),
        input.years,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Dividend Income (yield x holding, optional DRIP)",
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

    fn holding() -> DividendIncomeInput {
        DividendIncomeInput {
            investment_amount: dec!(100000),
            dividend_yield: dec!(4),
            years: 1,
            reinvest_dividends: false,
            annual_dividend_growth: None,
        }
    }

    #[test]
    fn test_income_split() {
        let out = calculate_dividend_income(&holding()).unwrap().result;
        assert_eq!(out.annual_income, dec!(4000.00));
        assert_eq!(out.quarterly_income, dec!(1000.00));
        assert_eq!(out.monthly_income, dec!(333.33));
        assert_eq!(out.total_dividends, dec!(4000.00));
    }

    #[test]
    fn test_without_reinvestment_value_is_flat() {
        let input = DividendIncomeInput {
            years: 10,
            ..holding()
        };
        let out = calculate_dividend_income(&input).unwrap().result;
        assert_eq!(out.final_value, dec!(100000.00));
        assert_eq!(out.total_dividends, dec!(40000.00));
    }

    #[test]
    fn test_drip_compounds() {
        let input = DividendIncomeInput {
            years: 10,
            reinvest_dividends: true,
            ..holding()
        };
        let out = calculate_dividend_income(&input).unwrap().result;
        // 100000 * 1.04^10
        assert_eq!(out.final_value, dec!(148024.43));
        assert!(out.total_dividends > dec!(40000));
    }

    #[test]
    fn test_dividend_growth_raises_yield_on_cost() {
        let input = DividendIncomeInput {
            years: 3,
            annual_dividend_growth: Some(dec!(10)),
            ..holding()
        };
        let out = calculate_dividend_income(&input).unwrap().result;
        // 4% * 1.1^2 = 4.84%
        assert_eq!(out.yield_on_cost, dec!(4.84));
        assert_eq!(out.breakdown.projection.len(), 3);
    }

    #[test]
    fn test_compounding_yield_overflow_is_an_error() {
        let input = DividendIncomeInput {
            dividend_yield: dec!(100),
            years: 100,
            reinvest_dividends: true,
            annual_dividend_growth: Some(dec!(100)),
            ..holding()
        };
        match calculate_dividend_income(&input).unwrap_err() {
            FinCalcError::Overflow { context } => assert!(context.contains("dividend projection")),
            other => panic!("Expected Overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_years_bounded() {
        let input = DividendIncomeInput {
            years: 1000,
            ..holding()
        };
        assert!(calculate_dividend_income(&input).is_err());
    }
}
