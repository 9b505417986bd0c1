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

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_periods_per_year() -> u32 {
    2
}

/// Input parameters for Macaulay / modified duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedDurationInput {
    /// Par / face value of the bond (e.g. 1000)
    pub face_value: Money,
    /// Annual coupon rate as a percentage
    pub coupon_rate: Percent,
    /// Annual yield as a percentage
    pub yield_rate: Percent,
    /// Whole years remaining until maturity
    pub years_to_maturity: u32,
    /// Coupon payments per year: 1 (annual), 2 (semi), 4 (quarterly), 12 (monthly)
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
}

/// One coupon period's contribution to the duration sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationCashFlow {
    pub period: u32,
    pub time_years: Decimal,
    pub cash_flow: Money,
    pub present_value: Money,
    /// time_years x present_value
    pub weighted_time: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationBreakdown {
    pub coupon_per_period: Money,
    pub yield_per_period: Decimal,
    pub total_periods: u32,
    /// Sum of weighted_time over all cash flows
    pub weighted_time_sum: Decimal,
    pub cash_flows: Vec<DurationCashFlow>,
}

/// Estimated price move for a one-percentage-point parallel yield shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSensitivity {
    pub yield_up_1pct: Money,
    pub yield_down_1pct: Money,
}

/// Output of the duration calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedDurationOutput {
    /// Weighted-average time of cash flows (in years)
    pub macaulay_duration: Decimal,
    /// Macaulay duration / (1 + y/freq)
    pub modified_duration: Decimal,
    /// Full present value of the bond at the stated yield
    pub bond_price: Money,
    pub price_sensitivity: PriceSensitivity,
    pub breakdown: DurationBreakdown,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Macaulay and modified duration for a fixed-rate bullet bond.
///
/// Uses iterative discount-factor multiplication (never `powd()`) for full
/// decimal precision. Durations are returned unrounded so that
/// `modified = macaulay / (1 + y/f)` holds exactly.
pub fn calculate_modified_duration(
    input: &ModifiedDurationInput,
) -> FinCalcResult<ComputationOutput<ModifiedDurationOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let freq = Decimal::from(input.periods_per_year);
    let total_periods = input.years_to_maturity * input.periods_per_year;
    let coupon_per_period = input.face_value * pct_to_rate(input.coupon_rate) / freq;
    let yield_per_period = pct_to_rate(input.yield_rate) / freq;
    let one_plus_y = Decimal::ONE + yield_per_period;

    // --- Price and weighted cash-flow times in one pass ---
    let mut price = Decimal::ZERO;
    let mut weighted_sum = Decimal::ZERO;
    let mut df = Decimal::ONE;
    let mut cash_flows = Vec::with_capacity(total_periods as usize);

    for t in 1..=total_periods {
        df = df
            .checked_mul(one_plus_y)
            .ok_or_else(|| FinCalcError::overflow(format!("duration discounting at period {t}")))?;
        let t_years = Decimal::from(t) / freq;
        let cf = if t == total_periods {
            coupon_per_period + input.face_value
        } else {
            coupon_per_period
        };
        let pv_cf = cf / df;
        price += pv_cf;
        weighted_sum += t_years * pv_cf;

        cash_flows.push(DurationCashFlow {
            period: t,
            time_years: t_years.round_dp(4),
            cash_flow: round_money(cf),
            present_value: round_money(pv_cf),
            weighted_time: (t_years * pv_cf).round_dp(4),
        });
    }

    if price.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "Macaulay duration: bond price is zero".to_string(),
        });
    }

    let macaulay_duration = weighted_sum / price;
    let modified_duration = macaulay_duration / one_plus_y;

    // First-order estimate for +/- 100 bp
    let delta_y = dec!(0.01);
    let price_move = modified_duration * delta_y * price;

    let output = ModifiedDurationOutput {
        macaulay_duration,
        modified_duration,
        bond_price: round_money(price),
        price_sensitivity: PriceSensitivity {
            yield_up_1pct: round_money(-price_move),
            yield_down_1pct: round_money(price_move),
        },
        breakdown: DurationBreakdown {
            coupon_per_period: round_money(coupon_per_period),
            yield_per_period,
            total_periods,
            weighted_time_sum: weighted_sum.round_dp(4),
            cash_flows,
        },
    };

    let message = format!(
        "Modified duration is {:.2}: a 1% rise in yield moves the {} price by about {}.",
        modified_duration,
        format_money(price),
        format_money(-price_move),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Macaulay & Modified Duration (PV-weighted cash-flow timing)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &ModifiedDurationInput) -> FinCalcResult<()> {
    validation::positive("face_value", input.face_value)?;
    validation::percentage("coupon_rate", input.coupon_rate)?;
    validation::percentage("yield_rate", input.yield_rate)?;
    validation::horizon_years("years_to_maturity", input.years_to_maturity)?;
    if !matches!(input.periods_per_year, 1 | 2 | 4 | 12) {
        return Err(FinCalcError::invalid(
            "periods_per_year",
            "Coupon frequency must be 1, 2, 4, or 12.",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn par_bond_input() -> ModifiedDurationInput {
        ModifiedDurationInput {
            face_value: dec!(1000),
            coupon_rate: dec!(5),
            yield_rate: dec!(5),
            years_to_maturity: 10,
            periods_per_year: 2,
        }
    }

    fn zero_coupon_input() -> ModifiedDurationInput {
        ModifiedDurationInput {
            coupon_rate: Decimal::ZERO,
            ..par_bond_input()
        }
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal, label: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "{label}: expected ~{expected}, got {actual} (diff {diff} > tolerance {tolerance})"
        );
    }

    #[test]
    fn test_zero_coupon_macaulay_equals_maturity() {
        let out = calculate_modified_duration(&zero_coupon_input()).unwrap().result;
        assert_close(
            out.macaulay_duration,
            dec!(10),
            dec!(0.0001),
            "Zero-coupon Macaulay duration should equal maturity",
        );
    }

    #[test]
    fn test_modified_duration_relationship() {
        let out = calculate_modified_duration(&par_bond_input()).unwrap().result;
        let expected_mod = out.macaulay_duration / (Decimal::ONE + dec!(0.05) / dec!(2));
        assert_eq!(out.modified_duration, expected_mod);
    }

    #[test]
    fn test_par_bond_duration_textbook_value() {
        let out = calculate_modified_duration(&par_bond_input()).unwrap().result;
        // 10y 5% semi-annual par bond: Macaulay ~7.99, modified ~7.79
        assert_close(out.macaulay_duration, dec!(7.99), dec!(0.01), "Macaulay");
        assert_close(out.modified_duration, dec!(7.79), dec!(0.01), "Modified");
        assert_eq!(out.bond_price, dec!(1000.00));
    }

    #[test]
    fn test_coupon_bond_macaulay_less_than_maturity() {
        let out = calculate_modified_duration(&par_bond_input()).unwrap().result;
        assert!(out.macaulay_duration < dec!(10));
        assert!(out.macaulay_duration > Decimal::ZERO);
    }

    #[test]
    fn test_higher_coupon_lower_duration() {
        let low = calculate_modified_duration(&par_bond_input()).unwrap().result;
        let high = calculate_modified_duration(&ModifiedDurationInput {
            coupon_rate: dec!(8),
            ..par_bond_input()
        })
        .unwrap()
        .result;
        assert!(high.macaulay_duration < low.macaulay_duration);
    }

    #[test]
    fn test_price_sensitivity_is_symmetric() {
        let out = calculate_modified_duration(&par_bond_input()).unwrap().result;
        assert_eq!(
            out.price_sensitivity.yield_up_1pct,
            -out.price_sensitivity.yield_down_1pct
        );
        assert!(out.price_sensitivity.yield_up_1pct < Decimal::ZERO);
    }

    #[test]
    fn test_cash_flow_table_length() {
        let out = calculate_modified_duration(&par_bond_input()).unwrap().result;
        assert_eq!(out.breakdown.total_periods, 20);
        assert_eq!(out.breakdown.cash_flows.len(), 20);
        assert_eq!(out.breakdown.cash_flows[19].cash_flow, dec!(1025.00));
    }

    #[test]
    fn test_invalid_periods_per_year_error() {
        let input = ModifiedDurationInput {
            periods_per_year: 3,
            ..par_bond_input()
        };
        match calculate_modified_duration(&input).unwrap_err() {
            FinCalcError::InvalidInput { field, .. } => assert_eq!(field, "periods_per_year"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_periods_per_year_defaults_to_semiannual() {
        let input: ModifiedDurationInput = serde_json::from_value(serde_json::json!({
            "face_value": "1000",
            "coupon_rate": "5",
            "yield_rate": "5",
            "years_to_maturity": 10
        }))
        .unwrap();
        assert_eq!(input.periods_per_year, 2);
    }

    #[test]
    fn test_huge_maturity_rejected_before_period_count() {
        // u32::MAX years * 12 would wrap the period count
        let input = ModifiedDurationInput {
            years_to_maturity: u32::MAX,
            periods_per_year: 12,
            ..par_bond_input()
        };
        match calculate_modified_duration(&input).unwrap_err() {
            FinCalcError::InvalidInput { field, .. } => assert_eq!(field, "years_to_maturity"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_discount_overflow_is_an_error() {
        let input = ModifiedDurationInput {
            yield_rate: dec!(100),
            years_to_maturity: 100,
            periods_per_year: 1,
            ..par_bond_input()
        };
        assert!(matches!(
            calculate_modified_duration(&input).unwrap_err(),
            FinCalcError::Overflow { .. }
        ));
    }
}
