use serde_json::Value;
use std::io::{self, Read};

/// Read piped input from stdin. Returns None when stdin is a terminal or the
/// pipe is empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Ok(Some(parse_document(trimmed)?))
}

/// Parse a piped document as JSON, falling back to YAML.
///
/// Text that opens like a JSON object or array keeps the JSON parser's error
/// so line and column point at the real problem.
fn parse_document(text: &str) -> Result<Value, String> {
    let json_err = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    if text.starts_with('{') || text.starts_with('[') {
        return Err(format!("Failed to parse stdin as JSON: {}", json_err));
    }
    serde_yaml::from_str(text).map_err(|e| format!("Failed to parse stdin as YAML: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_document() {
        let value = parse_document(r#"{"loan_amount": "20000", "loan_term": 5}"#).unwrap();
        assert_eq!(value, json!({"loan_amount": "20000", "loan_term": 5}));
    }

    #[test]
    fn test_yaml_fallback() {
        let value = parse_document("loan_amount: \"20000\"\nloan_term: 5").unwrap();
        assert_eq!(value, json!({"loan_amount": "20000", "loan_term": 5}));
    }

    #[test]
    fn test_malformed_json_reports_json_position() {
        let err = parse_document("{\"loan_amount\": \"20000\",\n \"loan_term\": }").unwrap_err();
        assert!(err.starts_with("Failed to parse stdin as JSON"), "{err}");
        assert!(err.contains("line 2"), "{err}");
    }
}
