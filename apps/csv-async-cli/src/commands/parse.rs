use super::{read_input, write_output};
use crate::config::load_optional;
use crate::error::CliResult;
use csv_async::ParseOptions;
use std::path::PathBuf;
use tracing::info;

pub async fn execute(
    input: Option<PathBuf>,
    options: Option<PathBuf>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let options: Option<ParseOptions> = load_optional(options.as_deref())?;
    let text = read_input(input.as_deref())?;

    let records = csv_async::parse(text, options).await?;
    if let Some(records) = records.as_array() {
        info!("Parsed {} records", records.len());
    }

    let mut json = serde_json::to_vec_pretty(&records)?;
    json.push(b'\n');
    write_output(output.as_deref(), &json)
}
