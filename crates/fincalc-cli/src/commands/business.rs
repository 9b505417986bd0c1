use fincalc_core::business::break_even::{self, BreakEvenInput};

use super::{CommandResult, InputArgs};
use crate::input;

pub fn run_break_even(args: InputArgs) -> CommandResult {
    let be_input: BreakEvenInput = input::load(args.input.as_deref(), "break-even")?;
    let result = break_even::calculate_break_even(&be_input)?;
    Ok(serde_json::to_value(result)?)
}
