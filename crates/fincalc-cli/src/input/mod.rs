pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed calculator input from `--input <file>`, falling back to piped stdin.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
    calculator: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_input(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json> or stdin required for {calculator}").into())
    }
}
