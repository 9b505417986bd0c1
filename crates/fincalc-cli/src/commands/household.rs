use fincalc_core::household::budget::{self, BudgetInput};
use fincalc_core::household::currency::{self, CurrencyConversionInput};
use fincalc_core::household::debt_to_income::{self, DebtToIncomeInput};
use fincalc_core::household::net_worth::{self, NetWorthInput};

use super::{CommandResult, InputArgs};
use crate::input;

pub fn run_budget(args: InputArgs) -> CommandResult {
    let budget_input: BudgetInput = input::load(args.input.as_deref(), "budget")?;
    let result = budget::calculate_budget(&budget_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_debt_to_income(args: InputArgs) -> CommandResult {
    let dti_input: DebtToIncomeInput = input::load(args.input.as_deref(), "debt-to-income")?;
    let result = debt_to_income::calculate_debt_to_income(&dti_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_net_worth(args: InputArgs) -> CommandResult {
    let nw_input: NetWorthInput = input::load(args.input.as_deref(), "net worth")?;
    let result = net_worth::calculate_net_worth(&nw_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_currency_conversion(args: InputArgs) -> CommandResult {
    let fx_input: CurrencyConversionInput =
        input::load(args.input.as_deref(), "currency conversion")?;
    let result = currency::calculate_currency_conversion(&fx_input)?;
    Ok(serde_json::to_value(result)?)
}
