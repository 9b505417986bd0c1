pub mod amortization;
pub mod credit_payoff;
pub mod loan;
pub mod mortgage;
