use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::FinCalcResult;

/// Monetary amounts.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Only used internally.
pub type Rate = Decimal;

/// Rates as they cross the interface: plain percentages (5 = 5%).
pub type Percent = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// How often interest is credited within a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundingFrequency {
    Daily,
    #[default]
    Monthly,
    Quarterly,
    #[serde(alias = "semi-annually", alias = "semiannual")]
    Semiannually,
    #[serde(alias = "annual", alias = "yearly")]
    Annually,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Daily => 365,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Semiannually => 2,
            CompoundingFrequency::Annually => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompoundingFrequency::Daily => "daily",
            CompoundingFrequency::Monthly => "monthly",
            CompoundingFrequency::Quarterly => "quarterly",
            CompoundingFrequency::Semiannually => "semiannually",
            CompoundingFrequency::Annually => "annually",
        }
    }
}

/// Unit a loan term is quoted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermUnit {
    #[default]
    Years,
    Months,
}

impl TermUnit {
    /// Number of monthly payments in a term of `term` units, or None when it
    /// does not fit a u32.
    pub fn months(self, term: u32) -> Option<u32> {
        match self {
            TermUnit::Years => term.checked_mul(12),
            TermUnit::Months => Some(term),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    /// Human-readable summary of the headline result
    pub message: String,
    pub methodology: String,
    /// Echo of the validated input record
    pub inputs: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    inputs: &impl Serialize,
    message: String,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        message,
        methodology: methodology.to_string(),
        inputs: serde_json::to_value(inputs).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Round a currency amount to cents. Applied once, at the point of return.
pub fn round_money(value: Money) -> Money {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Round a ratio or percentage for display (4 dp).
pub fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an interface percentage (5 = 5%) into a decimal fraction.
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / dec!(100)
}

/// Convert a decimal fraction back into a percentage.
pub fn rate_to_pct(rate: Rate) -> Percent {
    rate * dec!(100)
}

/// Ceiling of a non-negative decimal as a whole count.
pub fn ceil_count(value: Decimal, context: &str) -> FinCalcResult<u64> {
    value.ceil().to_u64().ok_or_else(|| {
        FinCalcError::overflow(format!("{context}: {value} is not a whole count"))
    })
}

/// Format a money amount with thousands separators for summary messages.
pub fn format_money(value: Money) -> String {
    let rounded = round_money(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${grouped}.{frac}")
    } else {
        format!("${grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(1798.6515754)), dec!(1798.65));
        assert_eq!(round_money(dec!(1500)).to_string(), "1500.00");
    }

    #[test]
    fn test_periods_per_year() {
        assert_eq!(CompoundingFrequency::Daily.periods_per_year(), 365);
        assert_eq!(CompoundingFrequency::Monthly.periods_per_year(), 12);
        assert_eq!(CompoundingFrequency::Quarterly.periods_per_year(), 4);
        assert_eq!(CompoundingFrequency::Semiannually.periods_per_year(), 2);
        assert_eq!(CompoundingFrequency::Annually.periods_per_year(), 1);
    }

    #[test]
    fn test_frequency_deserializes_from_label() {
        let f: CompoundingFrequency = serde_json::from_str("\"quarterly\"").unwrap();
        assert_eq!(f, CompoundingFrequency::Quarterly);
        let f: CompoundingFrequency = serde_json::from_str("\"semi-annually\"").unwrap();
        assert_eq!(f, CompoundingFrequency::Semiannually);
    }

    #[test]
    fn test_term_unit_months() {
        assert_eq!(TermUnit::Years.months(30), Some(360));
        assert_eq!(TermUnit::Months.months(18), Some(18));
        assert_eq!(TermUnit::Years.months(u32::MAX), None);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_money(dec!(12)), "$12.00");
        assert_eq!(format_money(dec!(-950.5)), "-$950.50");
        assert_eq!(format_money(dec!(999)), "$999.00");
    }

    #[test]
    fn test_ceil_count() {
        assert_eq!(ceil_count(dec!(99.01), "units").unwrap(), 100);
        assert_eq!(ceil_count(dec!(100), "units").unwrap(), 100);
        // past u32 range the count is still exact
        assert_eq!(
            ceil_count(dec!(10000000000.2), "units").unwrap(),
            10_000_000_001
        );
        assert!(matches!(
            ceil_count(dec!(-1.5), "units"),
            Err(FinCalcError::Overflow { .. })
        ));
    }
}
