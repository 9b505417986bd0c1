use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::lending::amortization::{amortization_schedule, schedule_totals, AmortizationRow};
use crate::types::{
    ceil_count, format_money, pct_to_rate, round_money, with_metadata, ComputationOutput, Money,
    Percent,
};
use crate::validation;
use crate::FinCalcResult;

/// Slack applied before taking the ceiling so that a closed-form result of
/// e.g. 24.0000000001 months is not pushed to 25.
const MONTHS_EPSILON: Decimal = dec!(0.000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPayoffInput {
    pub balance: Money,
    /// APR as a percentage
    pub annual_interest_rate: Percent,
    /// Fixed amount paid every month
    pub monthly_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPayoffBreakdown {
    pub monthly_rate: Decimal,
    /// Interest charged on the opening balance in month one
    pub first_month_interest: Money,
    /// Unrounded closed-form month count before the ceiling
    pub exact_months: Decimal,
    pub final_payment: Money,
    pub schedule: Vec<AmortizationRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPayoffOutput {
    pub months_to_payoff: u32,
    pub years_to_payoff: Decimal,
    pub total_interest: Money,
    pub total_paid: Money,
    pub breakdown: CreditPayoffBreakdown,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Months needed to clear a revolving balance with a fixed monthly payment:
///
/// n = ln(p / (p - B r)) / ln(1 + r), rounded up
///
/// Fails with `DomainViolation` when the payment does not exceed the first
/// month's interest, because the balance would never shrink.
pub fn calculate_credit_payoff(
    input: &CreditPayoffInput,
) -> FinCalcResult<ComputationOutput<CreditPayoffOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validation::positive("balance", input.balance)?;
    validation::percentage("annual_interest_rate", input.annual_interest_rate)?;
    validation::positive("monthly_payment", input.monthly_payment)?;

    let r = pct_to_rate(input.annual_interest_rate) / dec!(12);
    let p = input.monthly_payment;
    let first_interest = input.balance * r;

    if p <= first_interest {
        return Err(FinCalcError::DomainViolation(format!(
            "monthly payment {} does not exceed the monthly interest {}; the balance never decreases",
            format_money(p),
            format_money(first_interest)
        )));
    }

    let exact_months = if r.is_zero() {
        input
            .balance
            .checked_div(p)
            .ok_or_else(|| FinCalcError::overflow("credit payoff: balance / payment"))?
    } else {
        let ratio = p
            .checked_div(p - first_interest)
            .ok_or_else(|| FinCalcError::overflow("credit payoff: payment ratio"))?;
        let numerator = ratio.checked_ln().ok_or_else(|| FinCalcError::DivisionByZero {
            context: "credit payoff: ln of payment ratio".into(),
        })?;
        let denominator = (Decimal::ONE + r)
            .checked_ln()
            .ok_or_else(|| FinCalcError::DivisionByZero {
                context: "credit payoff: ln(1 + r)".into(),
            })?;
        if denominator.is_zero() {
            return Err(FinCalcError::DivisionByZero {
                context: "credit payoff: ln(1 + r) is zero".into(),
            });
        }
        numerator
            .checked_div(denominator)
            .ok_or_else(|| FinCalcError::overflow("credit payoff: months to payoff"))?
    };
    let months = ceil_count(exact_months - MONTHS_EPSILON, "months to payoff")?.max(1);
    let months = u32::try_from(months)
        .ok()
        .filter(|m| *m <= validation::MAX_MONTHS)
        .ok_or_else(|| {
            FinCalcError::DomainViolation(format!(
                "payoff would take more than {} years at this payment",
                validation::MAX_YEARS
            ))
        })?;

    let rows = amortization_schedule(input.balance, r, p, Decimal::ZERO, months);
    let totals = schedule_totals(&rows);
    let final_payment = rows.last().map(|row| row.payment).unwrap_or(Decimal::ZERO);

    let output = CreditPayoffOutput {
        months_to_payoff: months,
        years_to_payoff: (Decimal::from(months) / dec!(12)).round_dp(2),
        total_interest: round_money(totals.total_interest),
        total_paid: round_money(totals.total_paid),
        breakdown: CreditPayoffBreakdown {
            monthly_rate: r,
            first_month_interest: round_money(first_interest),
            exact_months: exact_months.round_dp(4),
            final_payment: round_money(final_payment),
            schedule: rows.iter().map(AmortizationRow::rounded).collect(),
        },
    };

    let message = format!(
        "Paying {} a month clears the balance in {} months, costing {} in interest.",
        format_money(p),
        months,
        format_money(totals.total_interest),
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Credit Card Payoff (closed-form months to payoff)",
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
