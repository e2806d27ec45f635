use super::{read_input, write_output};
use crate::config::load_optional;
use crate::error::{CliError, CliResult};
use csv_async::StringifyOptions;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

pub async fn execute(
    input: Option<PathBuf>,
    options: Option<PathBuf>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let options: Option<StringifyOptions> = load_optional(options.as_deref())?;
    let rows = read_rows(&read_input(input.as_deref())?)?;
    info!("Stringifying {} rows", rows.len());

    let text = csv_async::stringify(rows, options).await?;
    write_output(output.as_deref(), text.as_bytes())
}

/// Rows are a JSON array of arrays or objects
fn read_rows(content: &[u8]) -> CliResult<Vec<Value>> {
    match serde_json::from_slice(content)? {
        Value::Array(rows) => Ok(rows),
        other => Err(CliError::InvalidInput(format!(
            "expected a JSON array of rows, found {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
