//! Period-by-period amortization shared by the loan, mortgage and credit-card
//! calculators.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{round_money, Money, Rate};

/// A single payment period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    /// Interest + principal actually paid this period
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

impl AmortizationRow {
    /// Copy of the row with every amount rounded to cents.
    pub fn rounded(&self) -> AmortizationRow {
        AmortizationRow {
            period: self.period,
            payment: round_money(self.payment),
            principal_portion: round_money(self.principal_portion),
            interest_portion: round_money(self.interest_portion),
            remaining_balance: round_money(self.remaining_balance),
        }
    }
}

/// Totals over a schedule, computed from the unrounded rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleTotals {
    pub periods: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_principal: Money,
}

/// Build an amortization schedule.
///
/// Each period accrues `balance * periodic_rate` of interest and applies the
/// rest of `base_payment + extra_payment` to principal. The loop ends the
/// first time the balance reaches zero or after `max_periods`, whichever
/// comes first. The final row never overpays: its principal is capped at the
/// balance owed and the balance is clamped to zero.
///
/// Rows are unrounded; callers round once when building their output.
pub fn amortization_schedule(
    principal: Money,
    periodic_rate: Rate,
    base_payment: Money,
    extra_payment: Money,
    max_periods: u32,
) -> Vec<AmortizationRow> {
    let mut rows = Vec::with_capacity(max_periods as usize);
    let mut balance = principal;
    let payment = base_payment + extra_payment;

    for period in 1..=max_periods {
        if balance <= Decimal::ZERO {
            break;
        }

        let interest = balance * periodic_rate;
        let mut principal_portion = payment - interest;

        // Cap at the balance owed; also sweep sub-cent dust left by the
        // annuity formula on the last scheduled period.
        if principal_portion > balance
            || (period == max_periods && balance - principal_portion < dec!(0.01))
        {
            principal_portion = balance;
        }

        balance -= principal_portion;
        if balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }

        rows.push(AmortizationRow {
            period,
            payment: interest + principal_portion,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance,
        });
    }

    rows
}

/// Sum the payment, interest and principal columns of a schedule.
pub fn schedule_totals(rows: &[AmortizationRow]) -> ScheduleTotals {
    let mut totals = ScheduleTotals {
        periods: rows.len() as u32,
        total_paid: Decimal::ZERO,
        total_interest: Decimal::ZERO,
        total_principal: Decimal::ZERO,
    };
    for row in rows {
        totals.total_paid += row.payment;
        totals.total_interest += row.interest_portion;
        totals.total_principal += row.principal_portion;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::annuity_payment;
    use rust_decimal_macros::dec;

    #[test]
    fn test_principal_portions_sum_to_principal() {
        let rate = dec!(0.06) / dec!(12);
        let pmt = annuity_payment(dec!(25000), rate, 60).unwrap();
        let rows = amortization_schedule(dec!(25000), rate, pmt, Decimal::ZERO, 60);

        assert_eq!(rows.len(), 60);
        let totals = schedule_totals(&rows);
        assert!((totals.total_principal - dec!(25000)).abs() < dec!(0.0000001));
        assert_eq!(rows.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_extra_payment_terminates_early() {
        let rate = dec!(0.05) / dec!(12);
        let pmt = annuity_payment(dec!(10000), rate, 36).unwrap();
        let rows = amortization_schedule(dec!(10000), rate, pmt, dec!(200), 36);

        assert!(rows.len() < 36, "expected early payoff, got {} rows", rows.len());
        let last = rows.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        // Final payment is truncated to what was owed
        assert!(last.payment < pmt + dec!(200));
    }

    #[test]
    fn test_balance_never_negative() {
        let rows = amortization_schedule(dec!(1000), dec!(0.01), dec!(400), Decimal::ZERO, 12);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.remaining_balance >= Decimal::ZERO));
    }

    #[test]
    fn test_term_exhausted_leaves_balance() {
        // Payment too small to clear the loan inside the term
        let rows = amortization_schedule(dec!(1000), dec!(0.01), dec!(50), Decimal::ZERO, 6);
        assert_eq!(rows.len(), 6);
        assert!(rows.last().unwrap().remaining_balance > Decimal::ZERO);
    }

    #[test]
    fn test_rounded_row() {
        let row = AmortizationRow {
            period: 1,
            payment: dec!(100.005),
            principal_portion: dec!(80.004),
            interest_portion: dec!(20.001),
            remaining_balance: dec!(919.996),
        };
        let r = row.rounded();
        assert_eq!(r.payment, dec!(100.01));
        assert_eq!(r.principal_portion, dec!(80.00));
        assert_eq!(r.remaining_balance, dec!(920.00));
    }
}
