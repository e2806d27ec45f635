use crate::error::{CliError, CliResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load operation options from a YAML (`.yaml`/`.yml`) or JSON file
pub fn load_options<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::InvalidConfig(format!(
            "Failed to read options file {}: {}",
            path.display(),
            e
        ))
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    debug!("Loading options from {}", path.display());

    match extension.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(CliError::InvalidConfig(format!(
            "Unsupported options file {}: expected .yaml, .yml or .json",
            path.display()
        ))),
    }
}

/// Load options only when a file was given, keeping "no options" distinct
pub fn load_optional<T: DeserializeOwned>(path: Option<&Path>) -> CliResult<Option<T>> {
    path.map(load_options).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv_async::{GenerateOptions, ParseColumns, ParseOptions, StringifyOptions};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn options_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_options() {
        let file = options_file(".yaml", "length: 3\nseed: 7\nobject_mode: true\n");
        let options: GenerateOptions = load_options(file.path()).unwrap();
        assert_eq!(options.length, Some(3));
        assert_eq!(options.seed, Some(7));
        assert!(options.object_mode);
        assert_eq!(options.delimiter, ",");
    }

    #[test]
    fn test_load_json_options() {
        let file = options_file(".json", r#"{"columns": true, "delimiter": ";"}"#);
        let options: ParseOptions = load_options(file.path()).unwrap();
        assert_eq!(options.columns, Some(ParseColumns::Discover(true)));
        assert_eq!(options.delimiter, ';');
    }

    #[test]
    fn test_load_stringify_options_from_yml() {
        let file = options_file(".yml", "header: true\nquoted: true\n");
        let options: StringifyOptions = load_options(file.path()).unwrap();
        assert!(options.header);
        assert!(options.quoted);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let file = options_file(".toml", "length = 3\n");
        let err = load_options::<GenerateOptions>(file.path()).unwrap_err();
        assert!(matches!(err, CliError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_yaml_is_reported() {
        let file = options_file(".yaml", "length: [unclosed\n");
        let err = load_options::<GenerateOptions>(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Yaml(_)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_options::<ParseOptions>(Path::new("/nonexistent/options.yaml"))
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidConfig(_)));
    }

    #[test]
    fn test_absent_path_means_no_options() {
        let options: Option<ParseOptions> = load_optional(None).unwrap();
        assert!(options.is_none());

        let file = options_file(".json", "{}");
        let options: Option<ParseOptions> = load_optional(Some(file.path())).unwrap();
        assert_eq!(options, Some(ParseOptions::default()));
    }
}
