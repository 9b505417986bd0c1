pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;
pub mod yaml;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Yaml => yaml::print_yaml(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields of a result object with nested objects flattened to dotted
/// keys (`breakdown.monthly_rate`). Arrays of objects are returned separately
/// so they can be rendered as their own tables.
pub(crate) fn flatten_result(
    result: &Map<String, Value>,
) -> (Vec<(String, String)>, Vec<(String, Vec<Value>)>) {
    let mut fields = Vec::new();
    let mut tables = Vec::new();
    flatten_into("", result, &mut fields, &mut tables);
    (fields, tables)
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    fields: &mut Vec<(String, String)>,
    tables: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, fields, tables),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                tables.push((name, items.clone()));
            }
            other => fields.push((name, format_scalar(other))),
        }
    }
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nests_breakdown_and_splits_row_sets() {
        let result = json!({
            "monthly_payment": "386.66",
            "breakdown": {
                "monthly_rate": "0.005",
                "schedule": [
                    {"period": 1, "payment": "386.66"},
                    {"period": 2, "payment": "386.66"}
                ]
            },
            "warnings_seen": ["a", "b"]
        });
        let (fields, tables) = flatten_result(result.as_object().unwrap());

        assert!(fields.contains(&("monthly_payment".into(), "386.66".into())));
        assert!(fields.contains(&("breakdown.monthly_rate".into(), "0.005".into())));
        assert!(fields.contains(&("warnings_seen".into(), "a, b".into())));
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].0, "breakdown.schedule");
        assert_eq!(tables[0].1.len(), 2);
    }

    #[test]
    fn test_format_scalar_null_is_blank() {
        assert_eq!(format_scalar(&Value::Null), "");
        assert_eq!(format_scalar(&json!(true)), "true");
        assert_eq!(format_scalar(&json!(21)), "21");
    }
}
