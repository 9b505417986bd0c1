use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

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

/// Input for an amortizing instalment loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub loan_amount: Money,
    /// Annual interest rate as a percentage
    pub annual_interest_rate: Percent,
    pub loan_term: u32,
    #[serde(default)]
    pub term_unit: TermUnit,
    /// Additional principal paid every month on top of the scheduled payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_monthly_payment: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanBreakdown {
    pub principal: Money,
    pub monthly_rate: Decimal,
    /// Contractual number of payments
    pub scheduled_payments: u32,
    pub extra_monthly_payment: Money,
    /// Interest avoided versus paying only the scheduled amount
    pub interest_saved: Money,
    pub months_saved: u32,
    pub schedule: Vec<AmortizationRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    /// Payments actually made (fewer than scheduled with extra payments)
    pub number_of_payments: u32,
    pub breakdown: LoanBreakdown,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly payment and full amortization schedule for a loan, with
/// optional extra monthly principal.
pub fn calculate_loan(input: &LoanInput) -> FinCalcResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::positive("loan_amount", input.loan_amount)?;
    validation::percentage("annual_interest_rate", input.annual_interest_rate)?;
    let n = validation::term_months("loan_term", input.loan_term, input.term_unit)?;
    validation::optional_non_negative("extra_monthly_payment", input.extra_monthly_payment)?;

    let monthly_rate = pct_to_rate(input.annual_interest_rate) / dec!(12);
    let extra = input.extra_monthly_payment.unwrap_or(Decimal::ZERO);

    let payment = annuity_payment(input.loan_amount, monthly_rate, n)?;
    let rows = amortization_schedule(input.loan_amount, monthly_rate, payment, extra, n);
    let totals = schedule_totals(&rows);

    let (interest_saved, months_saved) = if extra > Decimal::ZERO {
        let baseline = amortization_schedule(
            input.loan_amount,
            monthly_rate,
            payment,
            Decimal::ZERO,
            n,
        );
        let base_totals = schedule_totals(&baseline);
        (
            base_totals.total_interest - totals.total_interest,
            base_totals.periods.saturating_sub(totals.periods),
        )
    } else {
        (Decimal::ZERO, 0)
    };

    if input.annual_interest_rate.is_zero() {
        warnings.push("Zero interest rate: payments are principal only".into());
    }

    let output = LoanOutput {
        monthly_payment: round_money(payment),
        total_payment: round_money(totals.total_paid),
        total_interest: round_money(totals.total_interest),
        number_of_payments: totals.periods,
        breakdown: LoanBreakdown {
            principal: round_money(input.loan_amount),
            monthly_rate,
            scheduled_payments: n,
            extra_monthly_payment: round_money(extra),
            interest_saved: round_money(interest_saved),
            months_saved,
            schedule: rows.iter().map(AmortizationRow::rounded).collect(),
        },
    };

    let mut message = format!(
        "Monthly payment of {} over {} payments; total interest {}.",
        format_money(payment),
        totals.periods,
        format_money(totals.total_interest),
    );
    if months_saved > 0 {
        message.push_str(&format!(
            " Extra payments save {} and {} months.",
            format_money(interest_saved),
            months_saved
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan Amortization (level annuity payment, monthly schedule)",
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
