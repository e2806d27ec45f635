pub mod generate;
pub mod parse;
pub mod stringify;

use crate::error::CliResult;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

/// Read a file, or stdin when no path is given
pub(crate) fn read_input(path: Option<&Path>) -> CliResult<Vec<u8>> {
    match path {
        Some(path) => {
            debug!("Reading input from {}", path.display());
            Ok(fs::read(path)?)
        }
        None => {
            let mut buffer = Vec::new();
            io::stdin().lock().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Write to a file, or stdout when no path is given
pub(crate) fn write_output(path: Option<&Path>, content: &[u8]) -> CliResult<()> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            debug!("Wrote {} bytes to {}", content.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
