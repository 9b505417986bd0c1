use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::lending::amortization::{amortization_schedule, schedule_totals, AmortizationRow};
use crate::time_value::annuity_payment;
use crate::types::{
    format_money, pct_to_rate, round_money, with_metadata, ComputationOutput, Money, Percent,
    TermUnit,
};
use crate::validation;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a fixed-rate mortgage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    /// Purchase amount being financed before any down payment
    pub loan_amount: Money,
    /// Annual interest rate as a percentage
    pub interest_rate: Percent,
    pub loan_term: u32,
    /// Unit of `loan_term`
    #[serde(default)]
    pub payment_type: TermUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_property_tax: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_insurance: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageBreakdown {
    /// loan_amount - down_payment
    pub principal: Money,
    pub down_payment: Money,
    pub monthly_rate: Decimal,
    pub number_of_payments: u32,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub schedule: Vec<AmortizationRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    /// Principal and interest only
    pub monthly_payment: Money,
    /// Principal, interest, property tax and insurance
    pub total_monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub breakdown: MortgageBreakdown,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly mortgage payment by the standard annuity formula
/// M = P r (1+r)^n / ((1+r)^n - 1), plus the amortization schedule.
pub fn calculate_mortgage(
    input: &MortgageInput,
) -> FinCalcResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::positive("loan_amount", input.loan_amount)?;
    validation::percentage("interest_rate", input.interest_rate)?;
    let n = validation::term_months("loan_term", input.loan_term, input.payment_type)?;
    validation::optional_non_negative("down_payment", input.down_payment)?;
    validation::optional_non_negative("annual_property_tax", input.annual_property_tax)?;
    validation::optional_non_negative("annual_insurance", input.annual_insurance)?;

    let down_payment = input.down_payment.unwrap_or(Decimal::ZERO);
    if down_payment >= input.loan_amount {
        return Err(FinCalcError::DomainViolation(
            "down payment must be less than the loan amount".into(),
        ));
    }
    let principal = input.loan_amount - down_payment;

    let monthly_rate = pct_to_rate(input.interest_rate) / dec!(12);
    let payment = annuity_payment(principal, monthly_rate, n)?;

    let rows = amortization_schedule(principal, monthly_rate, payment, Decimal::ZERO, n);
    let totals = schedule_totals(&rows);

    let monthly_tax = input.annual_property_tax.unwrap_or(Decimal::ZERO) / dec!(12);
    let monthly_insurance = input.annual_insurance.unwrap_or(Decimal::ZERO) / dec!(12);
    let total_monthly = payment + monthly_tax + monthly_insurance;

    if down_payment > Decimal::ZERO && down_payment / input.loan_amount < dec!(0.20) {
        warnings.push(
            "Down payment below 20%: lenders typically require mortgage insurance".into(),
        );
    }

    let output = MortgageOutput {
        monthly_payment: round_money(payment),
        total_monthly_payment: round_money(total_monthly),
        total_payment: round_money(totals.total_paid),
        total_interest: round_money(totals.total_interest),
        breakdown: MortgageBreakdown {
            principal: round_money(principal),
            down_payment: round_money(down_payment),
            monthly_rate,
            number_of_payments: n,
            monthly_property_tax: round_money(monthly_tax),
            monthly_insurance: round_money(monthly_insurance),
            schedule: rows.iter().map(AmortizationRow::rounded).collect(),
        },
    };

    let message = format!(
        "Your monthly mortgage payment is {} ({} including taxes and insurance); \
         total interest over {} payments is {}.",
        format_money(payment),
        format_money(total_monthly),
        n,
        format_money(totals.total_interest),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Mortgage (standard annuity formula)",
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
