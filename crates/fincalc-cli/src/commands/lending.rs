use fincalc_core::lending::credit_payoff::{self, CreditPayoffInput};
use fincalc_core::lending::loan::{self, LoanInput};
use fincalc_core::lending::mortgage::{self, MortgageInput};

use super::{CommandResult, InputArgs};
use crate::input;

pub fn run_loan(args: InputArgs) -> CommandResult {
    let loan_input: LoanInput = input::load(args.input.as_deref(), "loan")?;
    let result = loan::calculate_loan(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_mortgage(args: InputArgs) -> CommandResult {
    let mortgage_input: MortgageInput = input::load(args.input.as_deref(), "mortgage")?;
    let result = mortgage::calculate_mortgage(&mortgage_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_credit_payoff(args: InputArgs) -> CommandResult {
    let payoff_input: CreditPayoffInput = input::load(args.input.as_deref(), "credit payoff")?;
    let result = credit_payoff::calculate_credit_payoff(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}
