use serde_json::Value;

use super::format_scalar;

/// Headline field of each calculator, in lookup order.
const PRIORITY_KEYS: &[&str] = &[
    "bond_price",
    "yield_to_maturity",
    "modified_duration",
    "monthly_payment",
    "months_to_payoff",
    "future_value",
    "projected_savings",
    "monthly_contribution",
    "years_to_double",
    "annualized_return",
    "annual_income",
    "net_worth",
    "debt_to_income_ratio",
    "converted_amount",
    "break_even_units",
    "recommendation",
    "expected_return",
    "total_return",
    "value_at_risk",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for &key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", format_scalar(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
