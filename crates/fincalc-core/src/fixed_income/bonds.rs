//! Plain-vanilla bond pricing and the textbook yield-to-maturity approximation.
//!
//! Coupons are paid annually and settlement is assumed on a coupon date, so
//! there is no accrued interest.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::types::{
    format_money, pct_to_rate, rate_to_pct, round_money, round_ratio, with_metadata,
    ComputationOutput, Money, Percent,
};
use crate::validation;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for bond pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceInput {
    /// Par / face value (typically 1000)
    pub face_value: Money,
    /// Annual coupon rate as a percentage (5 = 5%)
    pub coupon_rate: Percent,
    /// Market yield used for discounting, as a percentage
    pub yield_rate: Percent,
    /// Whole years remaining until maturity
    pub years_to_maturity: u32,
}

/// Where the bond trades relative to par.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceStatus {
    Premium,
    Par,
    Discount,
}

/// One discounted annual cash flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondCashFlow {
    pub year: u32,
    pub cash_flow: Money,
    pub discount_factor: Decimal,
    pub present_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceBreakdown {
    /// couponRate x faceValue
    pub coupon_payment: Money,
    pub present_value_of_coupons: Money,
    pub present_value_of_face: Money,
    /// Yield as a decimal fraction
    pub discount_rate: Decimal,
    pub cash_flows: Vec<BondCashFlow>,
}

/// Output of bond pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceOutput {
    pub bond_price: Money,
    /// Annual coupon / price, as a percentage
    pub current_yield: Percent,
    pub price_status: PriceStatus,
    pub breakdown: BondPriceBreakdown,
}

/// Input parameters for the yield-to-maturity approximation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondYtmInput {
    pub face_value: Money,
    /// Annual coupon rate as a percentage
    pub coupon_rate: Percent,
    /// Current market price of the bond
    pub price: Money,
    /// Whole years remaining until maturity
    pub years_to_maturity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondYtmBreakdown {
    pub coupon_payment: Money,
    /// faceValue - price, pulled to par over the remaining life
    pub price_difference: Money,
    pub annual_amortization: Money,
    /// (price + faceValue) / 2
    pub average_price: Money,
}

/// Output of the yield-to-maturity approximation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondYtmOutput {
    /// Approximate YTM as a percentage
    pub yield_to_maturity: Percent,
    pub current_yield: Percent,
    pub price_status: PriceStatus,
    pub breakdown: BondYtmBreakdown,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price an annual-coupon bond as the sum of discounted coupons plus the
/// discounted face value: sum C(1+y)^-t + F(1+y)^-N.
pub fn calculate_bond_price(
    input: &BondPriceInput,
) -> FinCalcResult<ComputationOutput<BondPriceOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validation::positive("face_value", input.face_value)?;
    validation::percentage("coupon_rate", input.coupon_rate)?;
    validation::percentage("yield_rate", input.yield_rate)?;
    validation::horizon_years("years_to_maturity", input.years_to_maturity)?;

    let coupon_payment = pct_to_rate(input.coupon_rate) * input.face_value;
    let y = pct_to_rate(input.yield_rate);
    let one_plus_y = Decimal::ONE + y;

    let mut pv_coupons = Decimal::ZERO;
    let mut pv_face = Decimal::ZERO;
    let mut df = Decimal::ONE;
    let mut cash_flows = Vec::with_capacity(input.years_to_maturity as usize);

    for year in 1..=input.years_to_maturity {
        df = df
            .checked_mul(one_plus_y)
            .ok_or_else(|| FinCalcError::overflow(format!("bond discounting at year {year}")))?;
        let discount_factor = Decimal::ONE / df;
        let coupon_pv = coupon_payment * discount_factor;
        pv_coupons += coupon_pv;

        let mut cash_flow = coupon_payment;
        let mut present_value = coupon_pv;
        if year == input.years_to_maturity {
            pv_face = input.face_value * discount_factor;
            cash_flow += input.face_value;
            present_value += pv_face;
        }

        cash_flows.push(BondCashFlow {
            year,
            cash_flow: round_money(cash_flow),
            discount_factor: discount_factor.round_dp(6),
            present_value: round_money(present_value),
        });
    }

    let price = pv_coupons + pv_face;
    let current_yield = current_yield_pct(coupon_payment, price)?;
    let status = price_status(price, input.face_value);

    let output = BondPriceOutput {
        bond_price: round_money(price),
        current_yield: round_ratio(current_yield),
        price_status: status,
        breakdown: BondPriceBreakdown {
            coupon_payment: round_money(coupon_payment),
            present_value_of_coupons: round_money(pv_coupons),
            present_value_of_face: round_money(pv_face),
            discount_rate: y,
            cash_flows,
        },
    };

    let message = format!(
        "The bond is worth {} at a {}% yield ({} to its {} face value).",
        format_money(price),
        input.yield_rate.normalize(),
        status_label(status),
        format_money(input.face_value),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bond Price (discounted annual coupons + face value)",
        input,
        message,
        warnings,
        elapsed,
        output,
    ))
}

/// Approximate yield to maturity:
///
/// YTM ~ (C + (F - P) / N) / ((P + F) / 2)
///
/// This is the closed-form approximation, not the IRR of the bond's cash
/// flows; it drifts from the exact yield as price moves away from par.
pub fn calculate_bond_ytm(input: &BondYtmInput) -> FinCalcResult<ComputationOutput<BondYtmOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::positive("face_value", input.face_value)?;
    validation::percentage("coupon_rate", input.coupon_rate)?;
    validation::positive("price", input.price)?;
    validation::horizon_years("years_to_maturity", input.years_to_maturity)?;

    let coupon_payment = pct_to_rate(input.coupon_rate) * input.face_value;
    let periods = Decimal::from(input.years_to_maturity);
    let price_difference = input.face_value - input.price;
    let annual_amortization = price_difference / periods;
    let average_price = (input.price + input.face_value) / dec!(2);

    let ytm = (coupon_payment + annual_amortization) / average_price;
    let current_yield = current_yield_pct(coupon_payment, input.price)?;
    let status = price_status(input.price, input.face_value);

    let deviation = (input.price - input.face_value).abs() / input.face_value;
    if deviation > dec!(0.20) {
        warnings.push(format!(
            "Price is {}% away from par; the approximation may differ materially from the exact yield",
            round_ratio(rate_to_pct(deviation)).normalize()
        ));
    }

    let output = BondYtmOutput {
        yield_to_maturity: round_ratio(rate_to_pct(ytm)),
        current_yield: round_ratio(current_yield),
        price_status: status,
        breakdown: BondYtmBreakdown {
            coupon_payment: round_money(coupon_payment),
            price_difference: round_money(price_difference),
            annual_amortization: round_money(annual_amortization),
            average_price: round_money(average_price),
        },
    };

    let message = format!(
        "Approximate yield to maturity is {}% for a bond priced at {}.",
        rate_to_pct(ytm).round_dp(2),
        format_money(input.price),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Yield to Maturity (approximation formula, not exact IRR)",
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

fn current_yield_pct(annual_coupon: Money, price: Money) -> FinCalcResult<Percent> {
    if price.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "current yield: bond price is zero".into(),
        });
    }
    Ok(rate_to_pct(annual_coupon / price))
}

fn price_status(price: Money, face_value: Money) -> PriceStatus {
    let rounded = round_money(price);
    if rounded > face_value {
        PriceStatus::Premium
    } else if rounded < face_value {
        PriceStatus::Discount
    } else {
        PriceStatus::Par
    }
}

fn status_label(status: PriceStatus) -> &'static str {
    match status {
        PriceStatus::Premium => "a premium",
        PriceStatus::Par => "par",
        PriceStatus::Discount => "a discount",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn price_input() -> BondPriceInput {
        BondPriceInput {
            face_value: dec!(1000),
            coupon_rate: dec!(5),
            yield_rate: dec!(6),
            years_to_maturity: 10,
        }
    }

    #[test]
    fn test_discount_bond_price() {
        let out = calculate_bond_price(&price_input()).unwrap().result;
        // 50 * annuity(6%, 10) + 1000 / 1.06^10 = 368.00 + 558.39
        assert_eq!(out.bond_price, dec!(926.40));
        assert_eq!(out.price_status, PriceStatus::Discount);
        assert_eq!(out.breakdown.coupon_payment, dec!(50.00));
        assert_eq!(out.breakdown.cash_flows.len(), 10);
        assert_eq!(out.breakdown.cash_flows[9].cash_flow, dec!(1050.00));
    }

    #[test]
    fn test_par_bond_when_coupon_equals_yield() {
        let input = BondPriceInput {
            yield_rate: dec!(5),
            ..price_input()
        };
        let out = calculate_bond_price(&input).unwrap().result;
        assert_eq!(out.bond_price, dec!(1000.00));
        assert_eq!(out.price_status, PriceStatus::Par);
    }

    #[test]
    fn test_zero_yield_is_undiscounted_sum() {
        let input = BondPriceInput {
            yield_rate: Decimal::ZERO,
            ..price_input()
        };
        let out = calculate_bond_price(&input).unwrap().result;
        // couponPayment * years + faceValue
        assert_eq!(out.bond_price, dec!(1500.00));
    }

    #[test]
    fn test_components_add_up_to_price() {
        let out = calculate_bond_price(&price_input()).unwrap().result;
        let sum = out.breakdown.present_value_of_coupons + out.breakdown.present_value_of_face;
        assert!((sum - out.bond_price).abs() <= dec!(0.01));
    }

    #[test]
    fn test_price_rejects_zero_face_value() {
        let input = BondPriceInput {
            face_value: Decimal::ZERO,
            ..price_input()
        };
        match calculate_bond_price(&input).unwrap_err() {
            FinCalcError::InvalidInput { field, .. } => assert_eq!(field, "face_value"),
            other => panic!("Expected InvalidInput for face_value, got {other:?}"),
        }
    }

    fn ytm_input() -> BondYtmInput {
        BondYtmInput {
            face_value: dec!(1000),
            coupon_rate: dec!(5),
            price: dec!(950),
            years_to_maturity: 10,
        }
    }

    #[test]
    fn test_ytm_approximation_formula() {
        let out = calculate_bond_ytm(&ytm_input()).unwrap().result;
        // (50 + 5) / 975 = 5.6410%
        assert_eq!(out.yield_to_maturity, dec!(5.6410));
        assert_eq!(out.breakdown.annual_amortization, dec!(5.00));
        assert_eq!(out.breakdown.average_price, dec!(975.00));
    }

    #[test]
    fn test_ytm_at_par_equals_coupon_rate() {
        let input = BondYtmInput {
            price: dec!(1000),
            ..ytm_input()
        };
        let out = calculate_bond_ytm(&input).unwrap().result;
        assert_eq!(out.yield_to_maturity, dec!(5.0000));
        assert_eq!(out.current_yield, dec!(5.0000));
    }

    #[test]
    fn test_ytm_premium_bond_below_coupon() {
        let input = BondYtmInput {
            price: dec!(1080),
            ..ytm_input()
        };
        let out = calculate_bond_ytm(&input).unwrap().result;
        assert!(out.yield_to_maturity < dec!(5));
        assert_eq!(out.price_status, PriceStatus::Premium);
    }

    #[test]
    fn test_ytm_warns_far_from_par() {
        let input = BondYtmInput {
            price: dec!(600),
            ..ytm_input()
        };
        let result = calculate_bond_ytm(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.methodology.contains("approximation"));
    }

    #[test]
    fn test_century_bond_at_full_yield_overflows_cleanly() {
        let input = BondPriceInput {
            yield_rate: dec!(100),
            years_to_maturity: 100,
            ..price_input()
        };
        // 2^96 is one past the largest Decimal
        match calculate_bond_price(&input).unwrap_err() {
            FinCalcError::Overflow { context } => assert!(context.contains("year 96")),
            other => panic!("Expected Overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_maturity_beyond_a_century_rejected() {
        let input = BondPriceInput {
            years_to_maturity: 101,
            ..price_input()
        };
        assert!(matches!(
            calculate_bond_price(&input).unwrap_err(),
            FinCalcError::InvalidInput { .. }
        ));
    }
}
