use colored::Colorize;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_result, format_scalar};

/// Format output as tables: headline fields first, then one table per
/// nested row set (schedules, cash flows, allocations).
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", value);
        return;
    };
    let Some(Value::Object(result)) = envelope.get("result") else {
        print_rows(&Value::Object(envelope.clone()));
        return;
    };

    if let Some(Value::String(message)) = envelope.get("message") {
        println!("{}\n", message.as_str().bold());
    }

    let (fields, tables) = flatten_result(result);
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.as_str(), val.as_str()]);
    }
    println!("{}", Table::from(builder));

    for (name, rows) in &tables {
        println!("\n{}", name.as_str().cyan());
        print_array_table(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_rows(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_scalar(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
