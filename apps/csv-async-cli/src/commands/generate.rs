use super::write_output;
use crate::config::load_optional;
use crate::error::CliResult;
use csv_async::{GenerateOptions, GenerateOutput};
use std::path::PathBuf;
use tracing::info;

pub async fn execute(options: Option<PathBuf>, output: Option<PathBuf>) -> CliResult<()> {
    let options: Option<GenerateOptions> = load_optional(options.as_deref())?;
    let generated = csv_async::generate(options).await?;

    let content = match generated {
        GenerateOutput::Bytes(bytes) => bytes,
        GenerateOutput::Text(text) => text.into_bytes(),
        GenerateOutput::Records(records) => {
            info!("Generated {} records", records.len());
            let mut json = serde_json::to_vec_pretty(&records)?;
            json.push(b'\n');
            json
        }
    };
    write_output(output.as_deref(), &content)
}
