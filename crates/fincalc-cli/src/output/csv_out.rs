use serde_json::Value;
use std::io;

use super::{flatten_result, format_scalar};

/// Write output as CSV to stdout.
///
/// Results with a row set (an amortization schedule, cash flows, an
/// allocation) print that set; otherwise a two-column field/value listing of
/// the flattened result.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .and_then(Value::as_object);

    match result {
        Some(result) => {
            let (fields, tables) = flatten_result(result);
            if let Some((_, rows)) = tables.first() {
                write_rows(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in &fields {
                    let _ = wtr.write_record([key.as_str(), val.as_str()]);
                }
            }
        }
        None => {
            let _ = wtr.write_record([format_scalar(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
