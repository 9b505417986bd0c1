use serde_json::Value;

pub fn print_yaml(value: &Value) {
    match serde_yaml::to_string(value) {
        Ok(s) => print!("{}", s),
        Err(e) => eprintln!("YAML serialization error: {}", e),
    }
}
