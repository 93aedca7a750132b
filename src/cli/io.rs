//! JSON I/O handling for CLI
//!
//! - Input: one JSON request on stdin
//! - Output: one JSON object on stdout, `{"status": "ok", "data": ...}` or
//!   `{"status": "error", "code": ..., "message": ...}`

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

/// Parse a JSON request; the input may span several lines
pub fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    }))
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiline_request() {
        let value = parse_request("{\n  \"north\": 32.8,\n  \"south\": 32.5\n}\n").unwrap();
        assert_eq!(value["north"], serde_json::json!(32.8));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(parse_request("  \n").is_err());
        assert!(parse_request("{not json").is_err());
    }
}
