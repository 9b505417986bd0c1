use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::types::{pct_to_rate, round_money, with_metadata, ComputationOutput, Money, Percent};
use crate::validation;
use crate::FinCalcResult;

/// Convert an amount at a quoted rate (units of `to_currency` per one unit of
/// `from_currency`), optionally net of a percentage fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConversionInput {
    pub amount: Money,
    pub from_currency: String,
    pub to_currency: String,
    pub exchange_rate: Decimal,
    /// Conversion fee as a percentage of `amount`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_percent: Option<Percent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConversionBreakdown {
    /// Fee charged, in the source currency
    pub fee_amount: Money,
    /// amount - fee, in the source currency
    pub amount_after_fee: Money,
    /// Rate actually achieved after the fee
    pub effective_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConversionOutput {
    pub converted_amount: Money,
    pub from_currency: String,
    pub to_currency: String,
    pub exchange_rate: Decimal,
    /// Units of `from_currency` per one unit of `to_currency`
    pub inverse_rate: Decimal,
    pub breakdown: CurrencyConversionBreakdown,
}

pub fn calculate_currency_conversion(
    input: &CurrencyConversionInput,
) -> FinCalcResult<ComputationOutput<CurrencyConversionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let from = currency_code("from_currency", &input.from_currency)?;
    let to = currency_code("to_currency", &input.to_currency)?;
    validation::non_negative("amount", input.amount)?;
    validation::positive("exchange_rate", input.exchange_rate)?;
    if let Some(fee) = input.fee_percent {
        validation::percentage("fee_percent", fee)?;
    }

    if from == to {
        warnings.push(format!("Converting {from} to itself"));
    }

    let fee = input.amount * pct_to_rate(input.fee_percent.unwrap_or(Decimal::ZERO));
    let net = input.amount - fee;
    let converted = net * input.exchange_rate;
    let effective_rate = if input.amount.is_zero() {
        input.exchange_rate
    } else {
        converted / input.amount
    };

    let echo = CurrencyConversionInput {
        from_currency: from.clone(),
        to_currency: to.clone(),
        ..input.clone()
    };

    let output = CurrencyConversionOutput {
        converted_amount: round_money(converted),
        from_currency: from.clone(),
        to_currency: to.clone(),
        exchange_rate: input.exchange_rate,
        inverse_rate: (Decimal::ONE / input.exchange_rate).round_dp(6),
        breakdown: CurrencyConversionBreakdown {
            fee_amount: round_money(fee),
            amount_after_fee: round_money(net),
            effective_rate: effective_rate.round_dp(6),
        },
    };

    let message = format!(
        "{} {} = {} {}",
        round_money(input.amount),
        from,
        round_money(converted),
        to
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Currency Conversion (amount x quoted rate, net of fees)",
        &echo,
        message,
        warnings,
        elapsed,
        output,
    ))
}

/// Validate and upper-case a three-letter ISO 4217 code.
fn currency_code(field: &str, code: &str) -> FinCalcResult<String> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FinCalcError::invalid(
            field,
            format!("'{code}' is not a three-letter currency code"),
        ));
    }
    Ok(code.to_ascii_uppercase())
}
