use fincalc_core::fixed_income::bonds::{self, BondPriceInput, BondYtmInput};
use fincalc_core::fixed_income::duration::{self, ModifiedDurationInput};

use super::{CommandResult, InputArgs};
use crate::input;

pub fn run_bond_price(args: InputArgs) -> CommandResult {
    let bond_input: BondPriceInput = input::load(args.input.as_deref(), "bond pricing")?;
    let result = bonds::calculate_bond_price(&bond_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_bond_ytm(args: InputArgs) -> CommandResult {
    let ytm_input: BondYtmInput = input::load(args.input.as_deref(), "bond yield to maturity")?;
    let result = bonds::calculate_bond_ytm(&ytm_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_modified_duration(args: InputArgs) -> CommandResult {
    let dur_input: ModifiedDurationInput = input::load(args.input.as_deref(), "duration")?;
    let result = duration::calculate_modified_duration(&dur_input)?;
    Ok(serde_json::to_value(result)?)
}
