use fincalc_core::growth::cd::{self, CdInput};
use fincalc_core::growth::compound_interest::{self, CompoundInterestInput};
use fincalc_core::growth::dividend_income::{self, DividendIncomeInput};
use fincalc_core::growth::investment_return::{self, InvestmentReturnInput};
use fincalc_core::growth::retirement::{self, RetirementInput};
use fincalc_core::growth::rule_of_72::{self, RuleOf72Input};
use fincalc_core::growth::savings_goal::{self, SavingsGoalInput};

use super::{CommandResult, InputArgs};
use crate::input;

pub fn run_compound_interest(args: InputArgs) -> CommandResult {
    let ci_input: CompoundInterestInput =
        input::load(args.input.as_deref(), "compound interest")?;
    let result = compound_interest::calculate_compound_interest(&ci_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_cd(args: InputArgs) -> CommandResult {
    let cd_input: CdInput = input::load(args.input.as_deref(), "CD")?;
    let result = cd::calculate_cd(&cd_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_retirement(args: InputArgs) -> CommandResult {
    let retirement_input: RetirementInput = input::load(args.input.as_deref(), "retirement")?;
    let result = retirement::calculate_retirement(&retirement_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_savings_goal(args: InputArgs) -> CommandResult {
    let goal_input: SavingsGoalInput = input::load(args.input.as_deref(), "savings goal")?;
    let result = savings_goal::calculate_savings_goal(&goal_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rule_of_72(args: InputArgs) -> CommandResult {
    let rule_input: RuleOf72Input = input::load(args.input.as_deref(), "rule of 72")?;
    let result = rule_of_72::calculate_rule_of_72(&rule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_investment_return(args: InputArgs) -> CommandResult {
    let return_input: InvestmentReturnInput =
        input::load(args.input.as_deref(), "investment return")?;
    let result = investment_return::calculate_investment_return(&return_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_dividend_income(args: InputArgs) -> CommandResult {
    let dividend_input: DividendIncomeInput =
        input::load(args.input.as_deref(), "dividend income")?;
    let result = dividend_income::calculate_dividend_income(&dividend_input)?;
    Ok(serde_json::to_value(result)?)
}
