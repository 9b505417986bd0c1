use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use fincalc_core::market::portfolio::PortfolioInput;
use fincalc_core::market::stock_analysis::StockAnalysisInput;
use fincalc_core::market::StaticMarketData;
use fincalc_core::FinCalcResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON input, run the calculator and serialise its envelope.
fn run_json<I, O>(
    input_json: &str,
    calculate: impl FnOnce(&I) -> FinCalcResult<O>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = calculate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

fn market_data(market_data_json: &str) -> NapiResult<StaticMarketData> {
    StaticMarketData::from_json(market_data_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Fixed income
// ---------------------------------------------------------------------------

#[napi]
pub fn bond_price(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::fixed_income::bonds::calculate_bond_price)
}

#[napi]
pub fn bond_ytm(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::fixed_income::bonds::calculate_bond_ytm)
}

#[napi]
pub fn modified_duration(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        fincalc_core::fixed_income::duration::calculate_modified_duration,
    )
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[napi]
pub fn loan(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::lending::loan::calculate_loan)
}

#[napi]
pub fn mortgage(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::lending::mortgage::calculate_mortgage)
}

#[napi]
pub fn credit_payoff(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        fincalc_core::lending::credit_payoff::calculate_credit_payoff,
    )
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

#[napi]
pub fn compound_interest(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        fincalc_core::growth::compound_interest::calculate_compound_interest,
    )
}

#[napi]
pub fn cd(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::growth::cd::calculate_cd)
}

#[napi]
pub fn retirement(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::growth::retirement::calculate_retirement)
}

#[napi]
pub fn savings_goal(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        fincalc_core::growth::savings_goal::calculate_savings_goal,
    )
}

#[napi]
pub fn rule_of_72(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::growth::rule_of_72::calculate_rule_of_72)
}

#[napi]
pub fn investment_return(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        fincalc_core::growth::investment_return::calculate_investment_return,
    )
}

#[napi]
pub fn dividend_income(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        fincalc_core::growth::dividend_income::calculate_dividend_income,
    )
}

// ---------------------------------------------------------------------------
// Household
// ---------------------------------------------------------------------------

#[napi]
pub fn budget(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::household::budget::calculate_budget)
}

#[napi]
pub fn debt_to_income(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        fincalc_core::household::debt_to_income::calculate_debt_to_income,
    )
}

#[napi]
pub fn net_worth(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::household::net_worth::calculate_net_worth)
}

#[napi]
pub fn currency_conversion(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        fincalc_core::household::currency::calculate_currency_conversion,
    )
}

// ---------------------------------------------------------------------------
// Business
// ---------------------------------------------------------------------------

#[napi]
pub fn break_even(input_json: String) -> NapiResult<String> {
    run_json(&input_json, fincalc_core::business::break_even::calculate_break_even)
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[napi]
pub fn stock_analysis(input_json: String, market_data_json: String) -> NapiResult<String> {
    let provider = market_data(&market_data_json)?;
    run_json(&input_json, |input: &StockAnalysisInput| {
        fincalc_core::market::stock_analysis::analyze_stock(&provider, input)
    })
}

#[napi]
pub fn portfolio_optimization(input_json: String, market_data_json: String) -> NapiResult<String> {
    let provider = market_data(&market_data_json)?;
    run_json(&input_json, |input: &PortfolioInput| {
        fincalc_core::market::portfolio::optimize_portfolio(&provider, input)
    })
}
